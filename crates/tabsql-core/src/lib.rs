//! # tabsql-core
//!
//! Core library for loading tabular files into an embedded DuckDB engine,
//! running SQL against them and paging through the results.
//!
//! The crate is headless: front ends (the `tabsql` CLI and its pager) drive a
//! [`core::session::Session`] with typed commands and draw the views it
//! produces.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tabsql_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> tabsql_core::Result<()> {
//!     let mut session = Session::connect(&EngineConfig::in_memory(), PageSize::DEFAULT).await?;
//!     session.upload_paths(&["orders.csv".into()]).await;
//!
//!     session.dispatch(Command::SelectTable("orders".to_string())).await;
//!     session.dispatch(Command::NextPage).await;
//!
//!     if let Some(view) = session.view() {
//!         println!("{}", TableDisplay::new().render_view(view)?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │          Core Layer                 │  Session, pagination, catalog, upload
//! ├─────────────────────────────────────┤
//! │         Engine Layer                │  Engine trait, DuckDB connection
//! ├─────────────────────────────────────┤
//! │        Storage Layer                │  Configuration persistence
//! ├─────────────────────────────────────┤
//! │         Utils Layer                 │  SQL quoting, text helpers
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Session, executor, pagination controller, catalog, upload, export
//! - [`engine`]: The engine seam and its DuckDB implementation
//! - [`display`]: Result rendering, tables, notices and progress output
//! - [`storage`]: Configuration file handling
//! - [`utils`]: Shared helpers
//! - [`error`]: Hierarchical error system with troubleshooting hints

pub use error::AppError;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use tabsql_core::prelude::*;
/// ```
pub mod prelude {
    // Error handling
    pub use crate::Result;
    pub use crate::error::AppError;

    // Engine
    pub use crate::engine::{Engine, EngineConfig, EngineHandle, QueryResult, Value};

    // Session and pagination
    pub use crate::core::pagination::{Command, NavigationWidget, PageSize};
    pub use crate::core::session::{Completion, Session};

    // Storage
    pub use crate::storage::config::Config;

    // Display utilities
    pub use crate::display::{RenderMode, RenderedView, TableDisplay};
}

/// Business logic layer.
///
/// - [`core::session`]: The per-process session object
/// - [`core::pagination`]: Pagination state machine and navigation widget
/// - [`core::executor`]: Timed statement execution
/// - [`core::catalog`]: Known-table cache
/// - [`core::upload`], [`core::export`], [`core::aggregation`]
pub mod core;

/// Engine layer - the embedded SQL engine behind a trait.
pub mod engine;

/// Storage layer - configuration persistence.
pub mod storage;

/// Utilities layer - shared helpers and common functionality.
pub mod utils;

/// Display layer - result views and terminal output.
pub mod display;

/// Error handling - hierarchical error system.
///
/// - Domain-specific error variants (Query, Upload, Catalog, Config, etc.)
/// - Severity levels (Critical, High, Medium, Low)
/// - Troubleshooting hints for common issues
pub mod error;

/// Convenient Result type alias using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
