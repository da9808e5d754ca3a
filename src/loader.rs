use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use tracing::debug;

use crate::error::AppError;
use crate::table::Table;

/// Parse uploaded spreadsheet bytes into a [`Table`].
///
/// The first worksheet is used; its first row provides the column names and
/// every following row becomes one record. All cells are read as text — no
/// numeric or date coercion survives into the table. Cell values are
/// normalized on the way in:
/// - missing cells and numeric zero placeholders become `""`,
/// - any value whose length is exactly 1 becomes `""` (stray single
///   characters are treated as noise),
/// - literal `"` and `'` characters are stripped.
///
/// # Arguments
/// * `bytes` - Raw `.xls`/`.xlsx` file content as received from the upload
///
/// # Returns
/// * `Result<Table, AppError>` - The normalized table, or `AppError::Load`
///   if the bytes are not a parseable spreadsheet
///
/// # Examples
/// ```
/// use address_to_gps::loader::load_table;
///
/// assert!(load_table(b"definitely not a workbook").is_err());
/// ```
pub fn load_table(bytes: &[u8]) -> Result<Table, AppError> {
    let cursor = Cursor::new(bytes);
    let mut workbook =
        open_workbook_auto_from_rs(cursor).map_err(|e| AppError::Load(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AppError::Load("no sheets found in workbook".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| AppError::Load(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| AppError::Load("spreadsheet is empty".to_string()))?;

    let mut table = Table::new(header_names(header));
    for row in rows {
        table.push_row(row.iter().map(normalize_cell).collect());
    }

    debug!(
        sheet = %sheet_name,
        columns = table.columns().len(),
        rows = table.row_count(),
        "loaded spreadsheet"
    );
    Ok(table)
}

/// Column names from the header row, with empty headers given positional
/// `Unnamed_{i}` names and duplicates suffixed so names stay unique.
fn header_names(header: &[Data]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(header.len());
    for (i, cell) in header.iter().enumerate() {
        let mut name = render_cell(cell).trim().to_string();
        if name.is_empty() {
            name = format!("Unnamed_{i}");
        }
        if names.contains(&name) {
            name = format!("{name}_{i}");
        }
        names.push(name);
    }
    names
}

/// Render one cell as text, mapping missing values and numeric zeros to the
/// empty string and dropping the trailing `.0` Excel gives whole numbers.
fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(0) => String::new(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if *f == 0.0 => String::new(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        other => other.to_string(),
    }
}

fn normalize_cell(cell: &Data) -> String {
    let text = render_cell(cell);
    // Length-1 values are nulled before quote stripping, so a quoted single
    // character like "A" survives as a three-character value.
    let text = if text.chars().count() == 1 {
        String::new()
    } else {
        text
    };
    text.replace('"', "").replace('\'', "")
}
