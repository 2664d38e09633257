use serde_json::Value;

/// A minimal in-memory rectangular table: named columns plus rows of
/// index-aligned values. Represents the boundary shape a tabular reader
/// (CSV/XLSX, out of this crate's scope) would hand to the vectorizer.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Adds a new column, filling every existing row with the matching
    /// value from `values` (index-aligned with `self.rows`).
    pub fn push_column(&mut self, name: String, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.columns.push(name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    fn value_as_text(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Extracts the stringified values of `columns` from row `row_idx`, in
    /// the order given.
    pub fn row_values(&self, row_idx: usize, columns: &[usize]) -> Vec<String> {
        columns
            .iter()
            .map(|&col_idx| Self::value_as_text(&self.rows[row_idx][col_idx]))
            .collect()
    }
}
