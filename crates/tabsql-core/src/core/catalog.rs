//! Known-table cache
//!
//! Only names are cached; the engine owns the tables. A failed refresh keeps
//! the previous set, so listings may be stale but never block anything.

use crate::engine::Engine;
use crate::error::CatalogError;
use crate::utils::sql::quote_identifier;
use std::collections::BTreeSet;

#[derive(Debug, Default, Clone)]
pub struct TableCatalog {
    tables: BTreeSet<String>,
}

impl TableCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> &BTreeSet<String> {
        &self.tables
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains(table)
    }

    /// Reload the table set from `SHOW TABLES`.
    pub async fn refresh(&mut self, engine: &dyn Engine) -> Result<&BTreeSet<String>, CatalogError> {
        let result = engine
            .query("SHOW TABLES")
            .await
            .map_err(|e| CatalogError::Refresh { message: e.0 })?;

        self.tables = result.column_strings("name").into_iter().collect();
        log::debug!("Catalog refreshed: {} tables", self.tables.len());
        Ok(&self.tables)
    }

    /// Column names of `table`, in declaration order.
    pub async fn columns_of(&self, engine: &dyn Engine, table: &str) -> Result<Vec<String>, CatalogError> {
        let result = engine
            .query(&format!("DESCRIBE {}", quote_identifier(table)))
            .await
            .map_err(|e| CatalogError::Describe {
                table: table.to_string(),
                message: e.0,
            })?;
        Ok(result.column_strings("column_name"))
    }
}
