// Two-column result table shared by every analysis.
//
// Association, analogy and bias results all render as (label, value) rows
// under a pair of column headers.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub columns: [String; 2],
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn new(label_column: impl Into<String>, value_column: impl Into<String>) -> Self {
        Self {
            columns: [label_column.into(), value_column.into()],
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, value: f64) {
        self.rows.push(TableRow {
            label: label.into(),
            value,
        });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
