use serde::Serialize;

/// In-memory tabular structure backing one conversion run.
///
/// A table is an ordered list of column names plus rows of text cells.
/// Every cell is kept as a string (the loader performs no numeric or date
/// coercion), all rows share the same column set, and derived columns are
/// only ever appended at the end.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given column names.
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the current column count.
    pub fn push_row(&mut self, mut cells: Vec<String>) {
        cells.resize(self.columns.len(), String::new());
        self.rows.push(cells);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name, or `None` if the table has no such column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// One cell by row index and column name.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    /// Write a derived column, appending it at the end of the column order.
    ///
    /// `values` must hold exactly one cell per existing row. If the column
    /// already exists its cells are overwritten in place and its position is
    /// kept, so re-running a stage replaces that stage's output instead of
    /// leaving the previous run's values behind.
    pub fn add_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        if let Some(idx) = self.column_index(name) {
            for (row, value) in self.rows.iter_mut().zip(values) {
                row[idx] = value;
            }
            return;
        }
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// Apply `f` to every cell in the table, column-wise.
    pub fn for_each_cell_mut<F: FnMut(&mut String)>(&mut self, mut f: F) {
        for row in &mut self.rows {
            for cell in row {
                f(cell);
            }
        }
    }
}
