//! Query execution against the session's engine connection

use crate::core::pagination::{PageRequest, PageResponse};
use crate::engine::{EngineHandle, QueryResult};
use crate::error::QueryError;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A successful execution with its wall-clock duration.
#[derive(Debug, Clone)]
pub struct Execution {
    pub result: QueryResult,
    pub elapsed: Duration,
}

/// Issues SQL to the engine and times it. Cheap to clone, so a request can be
/// handed to a spawned task.
#[derive(Clone)]
pub struct QueryExecutor {
    engine: EngineHandle,
}

impl QueryExecutor {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> EngineHandle {
        Arc::clone(&self.engine)
    }

    /// Execute one statement. Engine failures come back verbatim; no retry.
    pub async fn execute(&self, sql: &str) -> Result<Execution, QueryError> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(QueryError::EmptyStatement);
        }

        log::debug!("Executing query: {}", sql);
        let started = Instant::now();
        let result = self
            .engine
            .query(sql)
            .await
            .map_err(|e| QueryError::Engine { message: e.0 })?;
        let elapsed = started.elapsed();

        log::debug!("{} rows in {:?}", result.num_rows(), elapsed);
        Ok(Execution { result, elapsed })
    }

    /// Run `COUNT(*)`-style SQL and read the first cell as a row count.
    pub async fn count(&self, sql: &str) -> Result<u64, QueryError> {
        let execution = self.execute(sql).await?;
        execution
            .result
            .rows
            .first()
            .and_then(|row| row.values.first())
            .and_then(|value| value.as_count())
            .ok_or_else(|| QueryError::Engine {
                message: format!("count query returned no usable value: {}", sql),
            })
    }

    /// Run a controller request: the optional count first, then the main query.
    pub async fn run(&self, request: PageRequest) -> PageResponse {
        let total_rows = match &request.count_sql {
            Some(sql) => Some(self.count(sql).await),
            None => None,
        };
        let outcome = self.execute(&request.sql).await;

        PageResponse {
            token: request.token,
            total_rows,
            outcome,
        }
    }
}
