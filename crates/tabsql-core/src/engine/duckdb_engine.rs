//! DuckDB-backed engine
//!
//! The connection lives behind a mutex and every call runs on tokio's blocking
//! pool, so callers stay async while statements execute one at a time.
//! Registered file buffers are written into a session-scoped temporary
//! directory that DuckDB searches when resolving relative file names.

use super::{Column, Engine, EngineConfig, EngineError, QueryResult, Row, Value};
use crate::error::ConnectionError;
use async_trait::async_trait;
use duckdb::Connection;
use duckdb::arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int8Array, Int16Array, Int32Array,
    Int64Array, LargeStringArray, StringArray, UInt8Array, UInt16Array, UInt32Array, UInt64Array,
};
use duckdb::arrow::datatypes::DataType;
use duckdb::arrow::util::display::array_value_to_string;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const BUFFER_DIR_PREFIX: &str = "tabsql-buffers-";

pub struct DuckDbEngine {
    conn: Arc<Mutex<Connection>>,
    buffer_dir: TempDir,
}

impl DuckDbEngine {
    /// Open the database described by `config`.
    pub async fn connect(config: &EngineConfig) -> Result<Self, ConnectionError> {
        let database = config.database.clone();
        tokio::task::spawn_blocking(move || Self::open(database.as_deref()))
            .await
            .map_err(|e| ConnectionError::EngineInit {
                message: format!("engine startup task failed: {}", e),
            })?
    }

    fn open(database: Option<&Path>) -> Result<Self, ConnectionError> {
        let conn = match database {
            Some(path) => {
                log::debug!("Opening DuckDB database at {}", path.display());
                Connection::open(path)
            }
            None => {
                log::debug!("Opening in-memory DuckDB database");
                Connection::open_in_memory()
            }
        }
        .map_err(init_error)?;

        let buffer_dir = tempfile::Builder::new()
            .prefix(BUFFER_DIR_PREFIX)
            .tempdir()
            .map_err(|e| ConnectionError::EngineInit {
                message: format!("failed to create file buffer directory: {}", e),
            })?;

        let search_path = buffer_dir.path().to_string_lossy().replace('\'', "''");
        conn.execute_batch(&format!("SET file_search_path = '{}'", search_path))
            .map_err(init_error)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            buffer_dir,
        })
    }

    /// Directory holding registered file buffers.
    pub fn buffer_dir(&self) -> &Path {
        self.buffer_dir.path()
    }
}

fn init_error(err: duckdb::Error) -> ConnectionError {
    ConnectionError::EngineInit {
        message: err.to_string(),
    }
}

#[async_trait]
impl Engine for DuckDbEngine {
    async fn register_file_buffer(&self, name: &str, bytes: Vec<u8>) -> Result<(), EngineError> {
        let file_name = Path::new(name)
            .file_name()
            .ok_or_else(|| EngineError::new(format!("invalid file name: {}", name)))?;
        let target = self.buffer_dir.path().join(file_name);

        log::debug!("Registering {} bytes as {}", bytes.len(), target.display());
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| EngineError::new(format!("{}: {}", target.display(), e)))
    }

    async fn query(&self, sql: &str) -> Result<QueryResult, EngineError> {
        let conn = Arc::clone(&self.conn);
        let sql = sql.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| EngineError::new("engine connection lock poisoned"))?;
            run_statement(&conn, &sql).map_err(|e| EngineError::new(e.to_string()))
        })
        .await
        .map_err(|e| EngineError::new(format!("engine task failed: {}", e)))?
    }
}

fn run_statement(conn: &Connection, sql: &str) -> duckdb::Result<QueryResult> {
    let mut stmt = conn.prepare(sql)?;
    let arrow = stmt.query_arrow([])?;
    let schema = arrow.get_schema();

    let columns: Vec<Column> = schema
        .fields()
        .iter()
        .map(|field| Column::new(field.name().as_str(), field.data_type().to_string()))
        .collect();

    let mut rows = Vec::new();
    for batch in arrow {
        for row in 0..batch.num_rows() {
            let values = batch
                .columns()
                .iter()
                .map(|array| cell_value(array, row))
                .collect();
            rows.push(Row::new(values));
        }
    }

    Ok(QueryResult::new(columns, rows))
}

fn downcast<T: 'static>(array: &ArrayRef) -> Option<&T> {
    array.as_any().downcast_ref::<T>()
}

fn cell_value(array: &ArrayRef, row: usize) -> Value {
    if array.is_null(row) {
        return Value::Null;
    }

    let typed = match array.data_type() {
        DataType::Boolean => downcast::<BooleanArray>(array).map(|a| Value::Bool(a.value(row))),
        DataType::Int8 => downcast::<Int8Array>(array).map(|a| Value::Integer(a.value(row).into())),
        DataType::Int16 => {
            downcast::<Int16Array>(array).map(|a| Value::Integer(a.value(row).into()))
        }
        DataType::Int32 => {
            downcast::<Int32Array>(array).map(|a| Value::Integer(a.value(row).into()))
        }
        DataType::Int64 => downcast::<Int64Array>(array).map(|a| Value::Integer(a.value(row))),
        DataType::UInt8 => {
            downcast::<UInt8Array>(array).map(|a| Value::Integer(a.value(row).into()))
        }
        DataType::UInt16 => {
            downcast::<UInt16Array>(array).map(|a| Value::Integer(a.value(row).into()))
        }
        DataType::UInt32 => {
            downcast::<UInt32Array>(array).map(|a| Value::Integer(a.value(row).into()))
        }
        DataType::UInt64 => downcast::<UInt64Array>(array)
            .and_then(|a| i64::try_from(a.value(row)).ok())
            .map(Value::Integer),
        DataType::Float32 => {
            downcast::<Float32Array>(array).map(|a| Value::Float(a.value(row).into()))
        }
        DataType::Float64 => downcast::<Float64Array>(array).map(|a| Value::Float(a.value(row))),
        DataType::Utf8 => {
            downcast::<StringArray>(array).map(|a| Value::Text(a.value(row).to_string()))
        }
        DataType::LargeUtf8 => {
            downcast::<LargeStringArray>(array).map(|a| Value::Text(a.value(row).to_string()))
        }
        _ => None,
    };

    typed.unwrap_or_else(|| match array_value_to_string(array, row) {
        Ok(text) => Value::Text(text),
        Err(e) => {
            log::warn!("Could not format {} value: {}", array.data_type(), e);
            Value::Text(String::new())
        }
    })
}
