//! Embedded SQL engine seam.
//!
//! Everything above this module talks to the engine through [`Engine`], so
//! the executor, catalog and pagination logic can run against DuckDB in
//! production and against a scripted fake in tests.

pub mod duckdb_engine;
pub mod models;

#[cfg(test)]
pub(crate) mod scripted;

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

pub use duckdb_engine::DuckDbEngine;
pub use models::{Column, QueryResult, Row, Value};

/// Error message reported by the engine, kept verbatim.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct EngineError(pub String);

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

#[async_trait]
pub trait Engine: Send + Sync {
    /// Make `bytes` addressable by `name` in later ingestion statements.
    async fn register_file_buffer(&self, name: &str, bytes: Vec<u8>) -> Result<(), EngineError>;

    /// Run a single SQL statement.
    async fn query(&self, sql: &str) -> Result<QueryResult, EngineError>;
}

/// Shared handle to the session's engine connection.
pub type EngineHandle = Arc<dyn Engine>;

/// Options used when opening the engine.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Database file; in-memory when `None`.
    pub database: Option<PathBuf>,
}

impl EngineConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn with_database(path: impl Into<PathBuf>) -> Self {
        Self {
            database: Some(path.into()),
        }
    }
}
