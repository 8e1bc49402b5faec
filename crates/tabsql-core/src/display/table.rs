use crate::core::export::write_csv;
use crate::core::pagination::NavigationWidget;
use crate::display::render::RenderedView;
use crate::engine::QueryResult;
use crate::error::{AppError, DisplayError};
use crate::utils::text::fit_cell;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets};
use crossterm::terminal;

const MAX_CELL_WIDTH: usize = 100;

pub struct TableDisplay {
    max_width: Option<usize>,
    use_colors: bool,
}

impl TableDisplay {
    pub fn new() -> Self {
        Self {
            max_width: Self::detect_terminal_width(),
            use_colors: true,
        }
    }

    fn detect_terminal_width() -> Option<usize> {
        match terminal::size() {
            Ok((cols, _)) => Some((cols as usize).clamp(40, 200)),
            Err(_) => Some(80),
        }
    }

    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn bold_header(&self, text: &str, color: Color) -> Cell {
        if self.use_colors {
            Cell::new(text).add_attribute(Attribute::Bold).fg(color)
        } else {
            Cell::new(text).add_attribute(Attribute::Bold)
        }
    }

    fn null_cell(&self, text: &str) -> Cell {
        if self.use_colors {
            Cell::new(text)
                .fg(Color::DarkGrey)
                .add_attribute(Attribute::Italic)
        } else {
            Cell::new(text)
        }
    }

    fn configure_table_width(&self, table: &mut Table) {
        let width = self
            .max_width
            .map(|w| if w > 20 { w - 6 } else { w.max(40) })
            .unwrap_or(80);
        table.set_width(width as u16);
    }

    /// Draw a rendered view: the table (or placeholder) followed by its count line.
    pub fn render_view(&self, view: &RenderedView) -> Result<String, AppError> {
        if let Some(placeholder) = &view.placeholder {
            return Ok(format!("{}\n{}", placeholder, view.count_line));
        }

        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        self.configure_table_width(&mut table);

        let headers: Vec<Cell> = view
            .headers
            .iter()
            .map(|h| self.bold_header(&h.label, Color::Green))
            .collect();
        table.set_header(headers);

        for row in &view.rows {
            if row.len() != view.headers.len() {
                return Err(DisplayError::TableFormat(format!(
                    "row has {} cells, expected {}",
                    row.len(),
                    view.headers.len()
                ))
                .into());
            }
            let cells: Vec<Cell> = row
                .iter()
                .map(|cell| {
                    if cell.is_null {
                        self.null_cell(&cell.text)
                    } else {
                        Cell::new(fit_cell(&cell.text, MAX_CELL_WIDTH))
                    }
                })
                .collect();
            table.add_row(cells);
        }

        Ok(format!("{}\n{}", table, view.count_line))
    }

    /// One-line navigation bar; disabled controls are shown in brackets.
    pub fn render_navigation(&self, nav: &NavigationWidget) -> String {
        let control = |label: &str, disabled: bool| {
            if disabled {
                format!("[{}]", label)
            } else {
                label.to_string()
            }
        };

        format!(
            "{} | {} | {} {} {} {}",
            nav.range_label(),
            nav.page_label(),
            control("first", nav.first_disabled),
            control("prev", nav.prev_disabled),
            control("next", nav.next_disabled),
            control("last", nav.last_disabled),
        )
    }

    pub fn render_json(&self, result: &QueryResult) -> Result<String, AppError> {
        serde_json::to_string_pretty(result)
            .map_err(|e| DisplayError::TableFormat(format!("JSON serialization failed: {}", e)).into())
    }

    pub fn render_csv(&self, result: &QueryResult) -> Result<String, AppError> {
        let mut buffer = Vec::new();
        write_csv(result, &mut buffer)
            .map_err(|e| DisplayError::TerminalOutput(e.to_string()))?;
        String::from_utf8(buffer)
            .map_err(|e| DisplayError::TableFormat(format!("CSV output is not UTF-8: {}", e)).into())
    }

    /// Render a simple table with custom headers and rows
    pub fn render_simple_table(&self, headers: &[&str], rows: &[Vec<String>]) -> String {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        self.configure_table_width(&mut table);

        let header_cells: Vec<Cell> = headers
            .iter()
            .map(|h| self.bold_header(h, Color::Cyan))
            .collect();
        table.set_header(header_cells);

        for row in rows {
            let cells: Vec<Cell> = row.iter().map(Cell::new).collect();
            table.add_row(cells);
        }

        table.to_string()
    }
}

impl Default for TableDisplay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pagination::{Command, PageSize, PaginationController};
    use crate::display::render::{RenderMode, ResultRenderer};
    use crate::engine::{Column, Row, Value};
    use std::time::Duration;

    fn display() -> TableDisplay {
        TableDisplay::new().with_max_width(120).with_colors(false)
    }

    fn people() -> QueryResult {
        QueryResult::new(
            vec![Column::new("id", "Int64"), Column::new("name", "Utf8")],
            vec![
                Row::new(vec![Value::Integer(1), Value::from("Alice")]),
                Row::new(vec![Value::Integer(2), Value::Null]),
            ],
        )
    }

    #[test]
    fn test_table_display_creation() {
        let display = TableDisplay::new();
        assert!(display.use_colors);

        let display = TableDisplay::new().with_max_width(80).with_colors(false);
        assert_eq!(display.max_width, Some(80));
        assert!(!display.use_colors);
    }

    #[test]
    fn test_render_view_contains_cells_and_count_line() {
        let view = ResultRenderer::render(&people(), RenderMode::Direct, Duration::from_millis(5));
        let output = display().render_view(&view).expect("render should succeed");

        assert!(output.contains("id"));
        assert!(output.contains("Alice"));
        assert!(output.contains("NULL"));
        assert!(output.ends_with("2 rows returned in 5ms"));
    }

    #[test]
    fn test_render_placeholder() {
        let empty = QueryResult::new(vec![Column::new("id", "Int64")], Vec::new());
        let view = ResultRenderer::render(&empty, RenderMode::Paginated, Duration::ZERO);
        let output = display().render_view(&view).expect("render should succeed");
        assert_eq!(output, "No results returned\n0 rows");
    }

    #[test]
    fn test_render_navigation_marks_disabled_controls() {
        let mut controller = PaginationController::new(PageSize::DEFAULT);
        controller.handle(Command::SelectTable("orders".to_string()));
        controller.apply_total_rows(Ok(237));
        controller.handle(Command::LastPage);

        let bar = display().render_navigation(&controller.navigation());
        assert_eq!(
            bar,
            "Showing 226-237 of 237 rows | Page 10 of 10 | first prev [next] [last]"
        );
    }

    #[test]
    fn test_render_json() {
        let output = display().render_json(&people()).expect("json should render");
        let parsed: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
        assert_eq!(parsed["rows"][0]["name"], "Alice");
        assert!(parsed["rows"][1]["name"].is_null());
    }

    #[test]
    fn test_render_csv() {
        let output = display().render_csv(&people()).expect("csv should render");
        assert_eq!(output, "id,name\n1,Alice\n2,\n");
    }

    #[test]
    fn test_render_simple_table() {
        let output = display().render_simple_table(
            &["Table"],
            &[vec!["orders".to_string()], vec!["customers".to_string()]],
        );
        assert!(output.contains("Table"));
        assert!(output.contains("orders"));
        assert!(output.contains("customers"));
    }
}
