use tracing::debug;

use crate::error::AppError;
use crate::table::Table;

/// Name of the derived column holding the joined address string.
pub const FULL_ADDRESS_COLUMN: &str = "Full_Address";

/// Build one address string per row from the user-selected columns.
///
/// The selected columns' values are joined in selection order with `", "`,
/// trimmed, and stored in a new `Full_Address` column. Empty source fields
/// leave comma artifacts behind, so a cleanup pass afterwards collapses
/// `",,"` and `", ,"` to `","` in every text cell of the table, and the
/// address itself additionally loses leading and trailing comma debris.
///
/// # Arguments
/// * `table` - The loaded table, mutated in place
/// * `selection` - Ordered, user-chosen column names forming the address
///
/// # Returns
/// * `Result<(), AppError>` - `EmptySelection` if no columns were chosen,
///   `UnknownColumn` if a name is not in the table; the table is untouched
///   on either error
pub fn build_full_address(table: &mut Table, selection: &[String]) -> Result<(), AppError> {
    if selection.is_empty() {
        return Err(AppError::EmptySelection);
    }
    let mut indices = Vec::with_capacity(selection.len());
    for name in selection {
        match table.column_index(name) {
            Some(idx) => indices.push(idx),
            None => return Err(AppError::UnknownColumn(name.clone())),
        }
    }

    let addresses: Vec<String> = table
        .rows()
        .iter()
        .map(|row| {
            let joined = indices
                .iter()
                .map(|&i| row[i].as_str())
                .collect::<Vec<_>>()
                .join(", ");
            clean_address(&joined)
        })
        .collect();
    table.add_column(FULL_ADDRESS_COLUMN, addresses);

    // Column-wise artifact cleanup over the whole table, not just the new
    // address column.
    table.for_each_cell_mut(|cell| {
        let cleaned = collapse_commas(cell);
        if cleaned != *cell {
            *cell = cleaned;
        }
    });

    debug!(columns = selection.len(), rows = table.row_count(), "built full addresses");
    Ok(())
}

/// Collapse the comma artifacts left by empty fields: `",,"` and `", ,"`
/// both become `","`.
pub fn collapse_commas(text: &str) -> String {
    text.replace(",,", ",").replace(", ,", ",")
}

/// Cleanup applied to one joined address: whitespace trim, comma collapse,
/// then strip of leading/trailing comma debris from empty leading or
/// trailing fields.
fn clean_address(joined: &str) -> String {
    let mut text = collapse_commas(joined.trim());
    while text.starts_with(',') || text.starts_with(' ') {
        text.remove(0);
    }
    while text.ends_with(',') || text.ends_with(' ') {
        text.pop();
    }
    text
}
