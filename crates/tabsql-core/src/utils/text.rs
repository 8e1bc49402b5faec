//! Cell text shaping for terminal tables.

use std::time::Duration;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";

/// Fit a cell into `max_width` display columns on a single line. Line breaks
/// become `↵` so a multi-line value cannot stretch its row.
///
/// # Examples
/// ```
/// use tabsql_core::utils::text::fit_cell;
/// assert_eq!(fit_cell("Hello World!", 8), "Hello...");
/// assert_eq!(fit_cell("a\nb", 10), "a↵b");
/// ```
pub fn fit_cell(text: &str, max_width: usize) -> String {
    let flat: String = if text.contains(['\n', '\r']) {
        text.replace("\r\n", "↵").replace(['\n', '\r'], "↵")
    } else {
        text.to_string()
    };

    if flat.width() <= max_width {
        return flat;
    }
    if max_width <= ELLIPSIS.len() {
        return ELLIPSIS[..max_width].to_string();
    }

    let budget = max_width - ELLIPSIS.len();
    let mut used = 0;
    let mut fitted: String = flat
        .chars()
        .take_while(|ch| {
            used += ch.width().unwrap_or(0);
            used <= budget
        })
        .collect();
    fitted.push_str(ELLIPSIS);
    fitted
}

/// Elapsed time in whole milliseconds, as shown in count lines.
pub fn elapsed_millis(elapsed: Duration) -> u128 {
    elapsed.as_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_cell_short_and_long() {
        assert_eq!(fit_cell("Hello", 10), "Hello");
        assert_eq!(fit_cell("Hello World!", 8), "Hello...");
        assert_eq!(fit_cell("", 5), "");
        assert_eq!(fit_cell("abcdef", 2), "..");
    }

    #[test]
    fn test_fit_cell_wide_characters() {
        // Each CJK character is two columns wide.
        assert_eq!(fit_cell("日本語テキスト", 7), "日本...");
    }

    #[test]
    fn test_fit_cell_flattens_line_breaks() {
        assert_eq!(fit_cell("Paris\r\nFR", 20), "Paris↵FR");
        assert_eq!(fit_cell("one\ntwo\nthree", 9), "one↵tw...");
    }

    #[test]
    fn test_elapsed_millis() {
        assert_eq!(elapsed_millis(Duration::from_micros(12_900)), 12);
    }
}
