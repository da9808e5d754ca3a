use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::debug;

use crate::error::AppError;
use crate::geocode::{LATITUDE_COLUMN, LONGITUDE_COLUMN};
use crate::table::Table;

pub const MAPS_LINK_COLUMN: &str = "Google_Maps_Link";

/// File name offered for the converted spreadsheet download.
pub const OUTPUT_FILE_NAME: &str = "converted_addresses.xlsx";
/// MIME type of the download response.
pub const OUTPUT_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Derive the `Google_Maps_Link` column from the coordinate columns.
///
/// A row gets `https://www.google.com/maps?q={lat},{lon}` when both its
/// `Latitude` and `Longitude` cells are non-empty, and an empty string
/// otherwise — a link is never built from half a coordinate pair.
pub fn add_maps_links(table: &mut Table) -> Result<(), AppError> {
    let lat = table
        .column_index(LATITUDE_COLUMN)
        .ok_or_else(|| anyhow::anyhow!("table has no {LATITUDE_COLUMN} column"))?;
    let lon = table
        .column_index(LONGITUDE_COLUMN)
        .ok_or_else(|| anyhow::anyhow!("table has no {LONGITUDE_COLUMN} column"))?;

    let links: Vec<String> = table
        .rows()
        .iter()
        .map(|row| maps_link(&row[lat], &row[lon]))
        .collect();
    table.add_column(MAPS_LINK_COLUMN, links);
    Ok(())
}

fn maps_link(latitude: &str, longitude: &str) -> String {
    if latitude.is_empty() || longitude.is_empty() {
        String::new()
    } else {
        format!("https://www.google.com/maps?q={latitude},{longitude}")
    }
}

/// Serialize the table to an in-memory `.xlsx` byte buffer.
///
/// The first worksheet row carries the column names; every cell is written
/// as a string and no index column is added, so the download contains all
/// original columns plus the derived ones, in order.
///
/// # Arguments
/// * `table` - The fully processed table
///
/// # Returns
/// * `Result<Vec<u8>, AppError>` - XLSX file content suitable for direct
///   download, or an `Export` error from the writer
pub fn to_xlsx(table: &Table) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    for (col, name) in table.columns().iter().enumerate() {
        worksheet.write_string(0, col as u16, name)?;
    }
    for (row, cells) in table.rows().iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            worksheet.write_string((row + 1) as u32, col as u16, cell)?;
        }
    }

    workbook.push_worksheet(worksheet);
    let buffer = workbook.save_to_buffer()?;

    debug!(bytes = buffer.len(), "serialized result workbook");
    Ok(buffer)
}
