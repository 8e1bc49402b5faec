//! File upload: register a file's bytes with the engine and materialize it as
//! a table named after the file.

use crate::engine::Engine;
use crate::error::UploadError;
use crate::utils::sql::{quote_identifier, quote_literal};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Json,
    Parquet,
}

impl FileFormat {
    /// Pick the format from the lowercased last extension of `file_name`.
    pub fn detect(file_name: &str) -> Result<Self, UploadError> {
        let extension = file_name
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase();

        match extension.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "json" => Ok(FileFormat::Json),
            "parquet" => Ok(FileFormat::Parquet),
            _ => Err(UploadError::UnsupportedFileType {
                file: file_name.to_string(),
                extension,
            }),
        }
    }

    /// Engine table function that reads this format.
    pub fn reader(&self) -> &'static str {
        match self {
            FileFormat::Csv => "read_csv_auto",
            FileFormat::Json => "read_json_auto",
            FileFormat::Parquet => "read_parquet",
        }
    }
}

/// Base name without its last extension, with anything outside
/// `[A-Za-z0-9_]` replaced by `_`.
///
/// # Examples
/// ```
/// use tabsql_core::core::upload::table_name_for;
/// assert_eq!(table_name_for("sales.CSV"), "sales");
/// assert_eq!(table_name_for("2024 q1-report.csv"), "2024_q1_report");
/// ```
pub fn table_name_for(file_name: &str) -> String {
    let stem = match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    };
    stem.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

pub fn create_table_sql(table: &str, format: FileFormat, file_name: &str) -> String {
    format!(
        "CREATE OR REPLACE TABLE {} AS SELECT * FROM {}({})",
        quote_identifier(table),
        format.reader(),
        quote_literal(file_name)
    )
}

/// A file's name and contents, as handed over by the user.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub async fn read(path: &Path) -> Result<Self, UploadError> {
        let name = display_name(path);
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| UploadError::Read {
                file: name.clone(),
                source,
            })?;
        Ok(Self { name, bytes })
    }
}

/// Final path component, used as the virtual file name and table source.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub file: String,
    pub table: String,
}

impl UploadOutcome {
    pub fn message(&self) -> String {
        format!("Table '{}' created from {}", self.table, self.file)
    }
}

/// Register `file` with the engine and create its table.
pub async fn ingest(engine: &dyn Engine, file: UploadFile) -> Result<UploadOutcome, UploadError> {
    let format = FileFormat::detect(&file.name)?;
    let table = table_name_for(&file.name);
    let name = file.name;

    engine
        .register_file_buffer(&name, file.bytes)
        .await
        .map_err(|e| UploadError::Register {
            file: name.clone(),
            message: e.0,
        })?;

    let sql = create_table_sql(&table, format, &name);
    log::debug!("Ingesting {}: {}", name, sql);
    engine
        .query(&sql)
        .await
        .map_err(|e| UploadError::Ingest {
            file: name.clone(),
            message: e.0,
        })?;

    Ok(UploadOutcome { file: name, table })
}
