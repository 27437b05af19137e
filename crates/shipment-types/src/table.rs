//! Named-column tables handed to whatever renders results
//!
//! Rows are plain structs; the `TableRow` trait exposes their ordered
//! column names and display cells so a renderer never needs to know the
//! concrete row type.

use serde::Serialize;

/// A row with a fixed, ordered set of named columns
pub trait TableRow: Serialize {
    /// Column headers, in display order
    fn columns() -> &'static [&'static str];

    /// Display cells, same length and order as `columns()`
    fn cells(&self) -> Vec<String>;
}

#[derive(Debug, Clone, Serialize)]
pub struct Table<R> {
    pub title: String,
    pub rows: Vec<R>,
}

impl<R: TableRow> Table<R> {
    pub fn new(title: impl Into<String>, rows: Vec<R>) -> Self {
        Self {
            title: title.into(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &'static [&'static str] {
        R::columns()
    }

    /// Render as a left-aligned plain text grid
    pub fn to_text(&self) -> String {
        let headers = R::columns();
        let cells: Vec<Vec<String>> = self.rows.iter().map(TableRow::cells).collect();

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in &cells {
            for (idx, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(idx) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let mut output = String::new();
        output.push_str(&self.title);
        output.push('\n');

        let header_line: Vec<String> = headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| format!("{:<width$}", h, width = *w))
            .collect();
        output.push_str(header_line.join(" | ").trim_end());
        output.push('\n');

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        output.push_str(&rule.join("-+-"));
        output.push('\n');

        for row in &cells {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<width$}", c, width = *w))
                .collect();
            output.push_str(line.join(" | ").trim_end());
            output.push('\n');
        }

        output
    }

    /// Rows as a JSON array of objects keyed by field name
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(&self.rows)
    }
}
