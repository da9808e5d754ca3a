//! Loader behavior against real workbook bytes, including numeric cells.

mod support;

use rust_xlsxwriter::{Workbook, Worksheet};

use address_to_gps::loader::load_table;
use support::workbook_bytes;

#[test]
fn reads_all_cells_as_text() {
    let bytes = workbook_bytes(&[
        &["Street", "City"],
        &["742 Evergreen Terrace", "Springfield"],
    ]);
    let table = load_table(&bytes).unwrap();
    assert_eq!(table.columns(), &["Street", "City"]);
    assert_eq!(table.cell(0, "Street"), Some("742 Evergreen Terrace"));
    assert_eq!(table.row_count(), 1);
}

#[test]
fn numeric_cells_lose_the_trailing_point_zero() {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.write_string(0, 0, "Zip").unwrap();
    worksheet.write_string(0, 1, "Lat").unwrap();
    worksheet.write_number(1, 0, 62704.0).unwrap();
    worksheet.write_number(1, 1, 39.7817).unwrap();
    workbook.push_worksheet(worksheet);
    let bytes = workbook.save_to_buffer().unwrap();

    let table = load_table(&bytes).unwrap();
    assert_eq!(table.cell(0, "Zip"), Some("62704"));
    assert_eq!(table.cell(0, "Lat"), Some("39.7817"));
}

#[test]
fn zero_placeholders_and_blanks_normalize_to_empty() {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.write_string(0, 0, "House").unwrap();
    worksheet.write_string(0, 1, "City").unwrap();
    worksheet.write_number(1, 0, 0.0).unwrap();
    worksheet.write_string(1, 1, "Springfield").unwrap();
    // Row 2 leaves the House cell missing entirely.
    worksheet.write_string(2, 1, "Portland").unwrap();
    workbook.push_worksheet(worksheet);
    let bytes = workbook.save_to_buffer().unwrap();

    let table = load_table(&bytes).unwrap();
    assert_eq!(table.cell(0, "House"), Some(""));
    assert_eq!(table.cell(1, "House"), Some(""));
    assert_eq!(table.cell(1, "City"), Some("Portland"));
}

#[test]
fn single_character_values_are_treated_as_noise() {
    let bytes = workbook_bytes(&[&["Apt", "City"], &["B", "Salem"], &["B2", "Salem"]]);
    let table = load_table(&bytes).unwrap();
    assert_eq!(table.cell(0, "Apt"), Some(""));
    // Boundary: two characters survive.
    assert_eq!(table.cell(1, "Apt"), Some("B2"));
}

#[test]
fn quote_characters_are_stripped_from_cells() {
    let bytes = workbook_bytes(&[&["Name"], &["\"The Dakota\""], &["O'Hare"]]);
    let table = load_table(&bytes).unwrap();
    assert_eq!(table.cell(0, "Name"), Some("The Dakota"));
    assert_eq!(table.cell(1, "Name"), Some("OHare"));
}

#[test]
fn loads_workbook_saved_to_disk() {
    let tempdir = tempfile::tempdir().unwrap();
    let path = tempdir.path().join("upload.xlsx");
    let bytes = workbook_bytes(&[&["City"], &["Springfield"]]);
    std::fs::write(&path, &bytes).unwrap();

    let table = load_table(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(table.cell(0, "City"), Some("Springfield"));
}

#[test]
fn unparseable_bytes_are_a_load_error() {
    assert!(load_table(b"").is_err());
    assert!(load_table(b"<html>not a workbook</html>").is_err());
}

#[test]
fn header_only_workbook_yields_empty_table() {
    let bytes = workbook_bytes(&[&["City", "State"]]);
    let table = load_table(&bytes).unwrap();
    assert_eq!(table.row_count(), 0);
    assert_eq!(table.columns(), &["City", "State"]);
}
