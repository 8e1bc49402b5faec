//! CSV export of the last successful result

use crate::engine::{QueryResult, Value};
use crate::error::ExportError;
use chrono::{DateTime, Local};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// `tabsql_results_<YYYY-MM-DDTHH-MM-SS>.csv`
pub fn default_file_name(now: DateTime<Local>) -> String {
    format!("tabsql_results_{}.csv", now.format("%Y-%m-%dT%H-%M-%S"))
}

fn csv_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => escape(&other.to_string()),
    }
}

fn escape(text: &str) -> String {
    if text.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

/// Header line of column names, then one line per row. Nulls are empty fields.
pub fn write_csv<W: Write>(result: &QueryResult, mut writer: W) -> io::Result<()> {
    let header: Vec<String> = result.columns.iter().map(|c| escape(&c.name)).collect();
    writeln!(writer, "{}", header.join(","))?;

    for row in &result.rows {
        let fields: Vec<String> = row.values.iter().map(csv_field).collect();
        writeln!(writer, "{}", fields.join(","))?;
    }
    writer.flush()
}

/// Write `result` to `path`, or to a timestamped file in `dir` when `path` is a
/// directory.
pub fn export_csv(result: Option<&QueryResult>, path: &Path) -> Result<PathBuf, ExportError> {
    let result = result.ok_or(ExportError::NoResults)?;

    let target = if path.is_dir() {
        path.join(default_file_name(Local::now()))
    } else {
        path.to_path_buf()
    };

    let write_error = |source: io::Error| ExportError::Write {
        path: target.display().to_string(),
        source,
    };

    let file = File::create(&target).map_err(write_error)?;
    write_csv(result, BufWriter::new(file)).map_err(write_error)?;

    log::debug!("Exported {} rows to {}", result.num_rows(), target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Column, Row};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn sample() -> QueryResult {
        QueryResult::new(
            vec![Column::new("id", "Int64"), Column::new("note", "Utf8")],
            vec![
                Row::new(vec![Value::Integer(1), Value::from("plain")]),
                Row::new(vec![Value::Integer(2), Value::from("a,b")]),
                Row::new(vec![Value::Integer(3), Value::from("say \"hi\"")]),
                Row::new(vec![Value::Integer(4), Value::Null]),
                Row::new(vec![Value::Integer(5), Value::from("two\nlines")]),
            ],
        )
    }

    #[test]
    fn test_write_csv_quotes_and_nulls() {
        let mut buffer = Vec::new();
        write_csv(&sample(), &mut buffer).expect("write should succeed");
        let text = String::from_utf8(buffer).expect("utf8");

        assert_eq!(
            text,
            "id,note\n1,plain\n2,\"a,b\"\n3,\"say \"\"hi\"\"\"\n4,\n5,\"two\nlines\"\n"
        );
    }

    #[test]
    fn test_default_file_name() {
        let now = Local
            .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
            .single()
            .expect("valid local time");
        assert_eq!(
            default_file_name(now),
            "tabsql_results_2024-03-09T14-05-07.csv"
        );
    }

    #[test]
    fn test_export_without_result_fails() {
        let dir = TempDir::new().expect("tempdir");
        let err = export_csv(None, dir.path()).expect_err("nothing to export");
        assert!(matches!(err, ExportError::NoResults));
    }

    #[test]
    fn test_export_into_directory_uses_default_name() {
        let dir = TempDir::new().expect("tempdir");
        let path = export_csv(Some(&sample()), dir.path()).expect("export should succeed");

        assert_eq!(path.parent(), Some(dir.path()));
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .expect("file name");
        assert!(name.starts_with("tabsql_results_"));
        assert!(name.ends_with(".csv"));

        let content = std::fs::read_to_string(&path).expect("read back");
        assert!(content.starts_with("id,note\n1,plain\n"));
    }

    #[test]
    fn test_export_to_explicit_file() {
        let dir = TempDir::new().expect("tempdir");
        let target = dir.path().join("out.csv");
        let path = export_csv(Some(&sample()), &target).expect("export should succeed");
        assert_eq!(path, target);
        assert!(target.exists());
    }

    #[test]
    fn test_export_to_missing_directory_is_write_error() {
        let dir = TempDir::new().expect("tempdir");
        let target = dir.path().join("missing").join("out.csv");
        let err = export_csv(Some(&sample()), &target).expect_err("should fail");
        assert!(matches!(err, ExportError::Write { .. }));
    }
}
