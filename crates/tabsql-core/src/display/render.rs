//! Result renderer
//!
//! Turns a [`QueryResult`] into a display-ready [`RenderedView`]. The view is
//! plain data: the terminal front ends decide how to draw it. Every render
//! produces a complete new view that replaces the previous one.

use crate::engine::{QueryResult, Value};
use crate::utils::text::elapsed_millis;
use std::time::Duration;

pub const NO_RESULTS_PLACEHOLDER: &str = "No results returned";
pub const NULL_MARKER: &str = "NULL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// A page of the selected table; pagination controls are shown.
    Paginated,
    /// A manual query; pagination controls are hidden.
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub label: String,
    /// `name (data_type)`
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    pub text: String,
    pub is_null: bool,
}

impl CellView {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self {
                text: NULL_MARKER.to_string(),
                is_null: true,
            },
            other => Self {
                text: other.to_string(),
                is_null: false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    pub mode: RenderMode,
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<Vec<CellView>>,
    /// Set instead of a table when the result has no rows.
    pub placeholder: Option<String>,
    pub count_line: String,
    pub show_pagination: bool,
}

impl RenderedView {
    pub fn is_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }
}

pub struct ResultRenderer;

impl ResultRenderer {
    pub fn render(result: &QueryResult, mode: RenderMode, elapsed: Duration) -> RenderedView {
        let show_pagination = mode == RenderMode::Paginated;

        if result.is_empty() {
            return RenderedView {
                mode,
                headers: Vec::new(),
                rows: Vec::new(),
                placeholder: Some(NO_RESULTS_PLACEHOLDER.to_string()),
                count_line: "0 rows".to_string(),
                show_pagination,
            };
        }

        let headers = result
            .columns
            .iter()
            .map(|column| HeaderCell {
                label: column.name.clone(),
                tooltip: format!("{} ({})", column.name, column.data_type),
            })
            .collect();

        let rows = result
            .rows
            .iter()
            .map(|row| row.values.iter().map(CellView::from_value).collect())
            .collect();

        RenderedView {
            mode,
            headers,
            rows,
            placeholder: None,
            count_line: Self::count_line(result.num_rows(), mode, elapsed),
            show_pagination,
        }
    }

    pub fn count_line(rows: usize, mode: RenderMode, elapsed: Duration) -> String {
        let verb = match mode {
            RenderMode::Paginated => "displayed",
            RenderMode::Direct => "returned",
        };
        format!("{} rows {} in {}ms", rows, verb, elapsed_millis(elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Column, Row};

    fn people() -> QueryResult {
        QueryResult::new(
            vec![Column::new("id", "Int64"), Column::new("name", "Utf8")],
            vec![
                Row::new(vec![Value::Integer(1), Value::from("alice")]),
                Row::new(vec![Value::Integer(2), Value::Null]),
                Row::new(vec![Value::Integer(3), Value::from("")]),
            ],
        )
    }

    #[test]
    fn test_direct_render() {
        let view = ResultRenderer::render(&people(), RenderMode::Direct, Duration::from_millis(12));

        assert_eq!(view.count_line, "3 rows returned in 12ms");
        assert!(!view.show_pagination);
        assert!(!view.is_placeholder());
        assert_eq!(view.headers.len(), 2);
        assert_eq!(view.headers[1].label, "name");
        assert_eq!(view.headers[1].tooltip, "name (Utf8)");
        assert_eq!(view.rows.len(), 3);
    }

    #[test]
    fn test_paginated_render() {
        let view =
            ResultRenderer::render(&people(), RenderMode::Paginated, Duration::from_millis(4));
        assert_eq!(view.count_line, "3 rows displayed in 4ms");
        assert!(view.show_pagination);
    }

    #[test]
    fn test_null_is_distinguishable_from_empty_string() {
        let view = ResultRenderer::render(&people(), RenderMode::Direct, Duration::ZERO);

        let null_cell = &view.rows[1][1];
        assert_eq!(null_cell.text, "NULL");
        assert!(null_cell.is_null);

        let empty_cell = &view.rows[2][1];
        assert_eq!(empty_cell.text, "");
        assert!(!empty_cell.is_null);
    }

    #[test]
    fn test_empty_result_shows_placeholder_in_both_modes() {
        let empty = QueryResult::new(vec![Column::new("id", "Int64")], Vec::new());
        for mode in [RenderMode::Direct, RenderMode::Paginated] {
            let view = ResultRenderer::render(&empty, mode, Duration::from_millis(3));
            assert_eq!(view.placeholder.as_deref(), Some("No results returned"));
            assert_eq!(view.count_line, "0 rows");
            assert!(view.headers.is_empty());
            assert_eq!(view.show_pagination, mode == RenderMode::Paginated);
        }
    }
}
