//! Tabular result of a generated query

use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Columns shown to the operator when a question returns rows
pub const DISPLAY_COLUMNS: &[&str] = &["nuop", "statusop", "statusmsg", "ts_inclusao", "codmsg"];

/// Column carrying the operation identifier
pub const OPERATION_COLUMN: &str = "nuop";

/// Rows returned by a generated query, every cell rendered as text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl QueryResult {
    /// Build a result. Rows shorter than the header are padded.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// A result with no rows
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column, case-insensitive
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Whether the operator can drill into an operation from these rows
    pub fn has_operation_column(&self) -> bool {
        self.column_index(OPERATION_COLUMN).is_some()
    }

    /// Distinct trimmed operation ids, in row order
    pub fn operation_ids(&self) -> Vec<String> {
        let Some(idx) = self.column_index(OPERATION_COLUMN) else {
            return Vec::new();
        };
        let mut ids: Vec<String> = Vec::new();
        for row in &self.rows {
            let id = row[idx].trim();
            if !id.is_empty() && !ids.iter().any(|known| known == id) {
                ids.push(id.to_string());
            }
        }
        ids
    }

    /// Restrict to the display columns that are present, in display order.
    /// Falls back to every column when none of them is present.
    pub fn display_view(&self) -> QueryResult {
        let picked: Vec<usize> = DISPLAY_COLUMNS
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect();
        if picked.is_empty() {
            return self.clone();
        }

        QueryResult {
            columns: picked.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| picked.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// Render as a markdown table
    pub fn to_markdown(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.columns.iter().cloned());
        for row in &self.rows {
            builder.push_record(row.iter().cloned());
        }
        builder.build().with(Style::markdown()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QueryResult {
        QueryResult::new(
            vec![
                "msgid".into(),
                "nuop".into(),
                "statusop".into(),
                "statusmsg".into(),
                "ts_inclusao".into(),
                "codmsg".into(),
            ],
            vec![
                vec!["M1".into(), "N1".into(), "313".into(), "320".into(), "2024-05-02 10:00:00".into(), "STR0008".into()],
                vec!["M2".into(), " N2 ".into(), "302".into(), "".into(), "2024-05-02 10:01:00".into(), "STR0008".into()],
                vec!["M3".into(), "N1".into(), "302".into(), "".into(), "2024-05-02 10:02:00".into(), "STR0008".into()],
            ],
        )
    }

    #[test]
    fn test_operation_ids_distinct_trimmed() {
        assert_eq!(sample().operation_ids(), vec!["N1".to_string(), "N2".to_string()]);
    }

    #[test]
    fn test_display_view_drops_msgid() {
        let view = sample().display_view();
        assert_eq!(view.columns(), &["nuop", "statusop", "statusmsg", "ts_inclusao", "codmsg"]);
        assert_eq!(view.len(), 3);
        assert_eq!(view.rows()[0][0], "N1");
    }

    #[test]
    fn test_display_view_without_known_columns() {
        let result = QueryResult::new(vec!["count".into()], vec![vec!["42".into()]]);
        assert_eq!(result.display_view(), result);
        assert!(!result.has_operation_column());
        assert!(result.operation_ids().is_empty());
    }

    #[test]
    fn test_short_rows_padded() {
        let result = QueryResult::new(vec!["a".into(), "b".into()], vec![vec!["1".into()]]);
        assert_eq!(result.rows()[0], vec!["1".to_string(), String::new()]);
    }

    #[test]
    fn test_column_lookup_case_insensitive() {
        let result = QueryResult::new(vec!["NUOP".into()], vec![vec!["N9".into()]]);
        assert!(result.has_operation_column());
        assert_eq!(result.operation_ids(), vec!["N9".to_string()]);
    }

    #[test]
    fn test_markdown_has_header_and_rows() {
        let table = sample().display_view().to_markdown();
        assert!(table.starts_with("| nuop"));
        assert_eq!(table.lines().count(), 5);
    }
}
