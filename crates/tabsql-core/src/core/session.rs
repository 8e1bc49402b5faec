//! Query session
//!
//! One `Session` per process: the engine handle, the table catalog, the
//! pagination controller and whatever is currently on screen. Front ends
//! either call [`Session::dispatch`] and await it, or split the work with
//! [`Session::begin`], [`QueryExecutor::run`] on a spawned task and
//! [`Session::complete`] when the response arrives.

use crate::core::catalog::TableCatalog;
use crate::core::executor::QueryExecutor;
use crate::core::export;
use crate::core::pagination::{
    Command, NavigationWidget, PageRequest, PageResponse, PageSize, PaginationController,
    PaginationState, RequestKind,
};
use crate::core::upload::{self, FileFormat, UploadFile, UploadOutcome};
use crate::display::notice::{Notice, Notices};
use crate::display::render::{RenderedView, ResultRenderer};
use crate::engine::{DuckDbEngine, EngineConfig, EngineHandle, QueryResult};
use crate::error::{ConnectionError, ExportError, QueryError, UploadError};
use crate::utils::sql::{is_schema_changing, quote_identifier};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const PREVIEW_ROWS: usize = 10;

/// What became of a response handed to [`Session::complete`].
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// A newer request was issued; the response was dropped.
    Stale,
    /// The view was replaced.
    Rendered,
    /// The query failed; the previous view stays.
    Failed(QueryError),
}

pub struct Session {
    executor: QueryExecutor,
    catalog: TableCatalog,
    controller: PaginationController,
    view: Option<RenderedView>,
    last_result: Option<QueryResult>,
    latest_request: Option<PageRequest>,
    catalog_stale: bool,
    notices: Notices,
}

impl Session {
    /// Open the engine and load the table list.
    pub async fn connect(config: &EngineConfig, page_size: PageSize) -> Result<Self, ConnectionError> {
        let engine = DuckDbEngine::connect(config).await?;
        let mut session = Self::with_engine(Arc::new(engine), page_size);
        session.refresh_catalog().await;
        Ok(session)
    }

    pub fn with_engine(engine: EngineHandle, page_size: PageSize) -> Self {
        Self {
            executor: QueryExecutor::new(engine),
            catalog: TableCatalog::new(),
            controller: PaginationController::new(page_size),
            view: None,
            last_result: None,
            latest_request: None,
            catalog_stale: false,
            notices: Notices::new(),
        }
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    pub fn state(&self) -> &PaginationState {
        self.controller.state()
    }

    pub fn navigation(&self) -> NavigationWidget {
        self.controller.navigation()
    }

    pub fn view(&self) -> Option<&RenderedView> {
        self.view.as_ref()
    }

    pub fn last_result(&self) -> Option<&QueryResult> {
        self.last_result.as_ref()
    }

    pub fn tables(&self) -> &BTreeSet<String> {
        self.catalog.tables()
    }

    pub fn notices(&mut self) -> &mut Notices {
        &mut self.notices
    }

    /// Apply `command` to the controller and return the work it needs.
    pub fn begin(&mut self, command: Command) -> Option<PageRequest> {
        let request = self.controller.handle(command)?;
        self.latest_request = Some(request.clone());
        Some(request)
    }

    /// Apply a response if it belongs to the most recent request.
    pub fn complete(&mut self, response: PageResponse) -> Completion {
        if !self.controller.is_current(response.token) {
            log::debug!(
                "Discarding stale response #{} (current #{})",
                response.token,
                self.controller.token()
            );
            return Completion::Stale;
        }

        if let Some(total) = response.total_rows {
            self.controller.apply_total_rows(total);
        }

        match response.outcome {
            Ok(execution) => {
                let mode = self.controller.render_mode();
                self.view = Some(ResultRenderer::render(
                    &execution.result,
                    mode,
                    execution.elapsed,
                ));
                self.last_result = Some(execution.result);

                if let Some(request) = &self.latest_request {
                    if request.kind == RequestKind::Manual && is_schema_changing(&request.sql) {
                        self.catalog_stale = true;
                    }
                }
                Completion::Rendered
            }
            Err(e) => {
                log::debug!("Query failed: {}", e);
                self.notices.push(Notice::error(format!("Query failed: {}", e)));
                Completion::Failed(e)
            }
        }
    }

    /// Run `command` to completion. `None` when the controller rejected it.
    pub async fn dispatch(&mut self, command: Command) -> Option<Completion> {
        let request = self.begin(command)?;
        let response = self.executor.run(request).await;
        let completion = self.complete(response);
        self.refresh_catalog_if_stale().await;
        Some(completion)
    }

    pub async fn execute(&mut self, sql: &str) -> Option<Completion> {
        self.dispatch(Command::Execute(sql.to_string())).await
    }

    /// Refresh the catalog if a completed statement changed the schema.
    pub async fn refresh_catalog_if_stale(&mut self) {
        if self.catalog_stale {
            self.catalog_stale = false;
            self.refresh_catalog().await;
        }
    }

    /// Reload the table list. Failures are logged and the old list is kept.
    pub async fn refresh_catalog(&mut self) -> &BTreeSet<String> {
        let engine = self.executor.engine();
        if let Err(e) = self.catalog.refresh(engine.as_ref()).await {
            log::warn!("{}", e);
        }
        self.catalog.tables()
    }

    /// Column names of `table`; empty when it cannot be described.
    pub async fn columns_of(&self, table: &str) -> Vec<String> {
        let engine = self.executor.engine();
        match self.catalog.columns_of(engine.as_ref(), table).await {
            Ok(columns) => columns,
            Err(e) => {
                log::warn!("{}", e);
                Vec::new()
            }
        }
    }

    /// Upload a batch of files, one table each. A failing file never stops
    /// the rest of the batch.
    pub async fn upload(&mut self, files: Vec<UploadFile>) -> Vec<Result<UploadOutcome, UploadError>> {
        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            let outcome = self.upload_one(file).await;
            outcomes.push(self.report_upload(outcome));
        }
        outcomes
    }

    /// Like [`Session::upload`], reading each file from disk first.
    pub async fn upload_paths(&mut self, paths: &[PathBuf]) -> Vec<Result<UploadOutcome, UploadError>> {
        let mut outcomes = Vec::with_capacity(paths.len());
        for path in paths {
            let outcome = match Self::read_upload(path).await {
                Ok(file) => self.upload_one(file).await,
                Err(e) => Err(e),
            };
            outcomes.push(self.report_upload(outcome));
        }
        outcomes
    }

    async fn read_upload(path: &Path) -> Result<UploadFile, UploadError> {
        FileFormat::detect(&upload::display_name(path))?;
        UploadFile::read(path).await
    }

    async fn upload_one(&mut self, file: UploadFile) -> Result<UploadOutcome, UploadError> {
        let engine = self.executor.engine();
        let outcome = upload::ingest(engine.as_ref(), file).await?;

        self.notices.push(Notice::success(outcome.message()));
        let preview = format!(
            "SELECT * FROM {} LIMIT {}",
            quote_identifier(&outcome.table),
            PREVIEW_ROWS
        );
        self.execute(&preview).await;
        self.refresh_catalog().await;

        Ok(outcome)
    }

    fn report_upload(
        &mut self,
        outcome: Result<UploadOutcome, UploadError>,
    ) -> Result<UploadOutcome, UploadError> {
        if let Err(e) = &outcome {
            log::warn!("Upload of {} failed: {}", e.file(), e);
            self.notices
                .push(Notice::error(format!("Failed to upload {}: {}", e.file(), e)));
        }
        outcome
    }

    /// Write the last successful result as CSV.
    pub fn export_csv(&mut self, path: &Path) -> Result<PathBuf, ExportError> {
        let written = export::export_csv(self.last_result.as_ref(), path)?;
        self.notices.push(Notice::success(format!(
            "Exported {} rows to {}",
            self.last_result.as_ref().map_or(0, QueryResult::num_rows),
            written.display()
        )));
        Ok(written)
    }

    pub async fn engine_version(&self) -> Option<String> {
        match self.executor.execute("SELECT version() AS version").await {
            Ok(execution) => execution
                .result
                .value(0, "version")
                .map(|v| v.to_string()),
            Err(e) => {
                log::debug!("Could not read engine version: {}", e);
                None
            }
        }
    }
}
