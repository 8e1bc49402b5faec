//! Configuration management
//!
//! Settings live in `~/.config/tabsql/config.toml`.
//! Priority: CLI argument > TABSQL_* environment variable > config.toml > default

use super::Result;
use crate::core::pagination::PageSize;
use crate::error::{ConfigError, StorageError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const PAGE_SIZE_ENV: &str = "TABSQL_PAGE_SIZE";
pub const DATABASE_ENV: &str = "TABSQL_DATABASE";

const CONFIG_FILE: &str = "config.toml";

/// Application configuration
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Rows per page; validated when resolved
    pub page_size: Option<u64>,
    /// DuckDB database file; in-memory when unset
    pub database: Option<PathBuf>,
    /// Directory for exports without an explicit path
    pub export_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if !config_path.exists() {
            log::debug!("No config at {}, using defaults", config_path.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|e| StorageError::ConfigParseError {
                message: format!("Failed to parse config file: {}", e),
            })?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: Option<PathBuf>) -> Result<()> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::FileIo {
                path: parent.to_string_lossy().to_string(),
                source,
            })?;
        }

        let toml_content = toml::to_string(self).map_err(|e| StorageError::ConfigParseError {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(&config_path, toml_content).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().ok_or(StorageError::ConfigDirNotFound)?;
        Ok(home_dir.join(".config").join("tabsql").join(CONFIG_FILE))
    }

    /// Config file inside an explicitly chosen directory.
    pub fn file_in(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE)
    }

    /// Check stored values without resolving overrides.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if let Some(size) = self.page_size {
            PageSize::try_from(size)?;
        }
        Ok(())
    }

    /// Page size from the CLI, then the environment, then this file.
    pub fn resolve_page_size(
        &self,
        cli: Option<PageSize>,
    ) -> std::result::Result<PageSize, ConfigError> {
        if let Some(size) = cli {
            return Ok(size);
        }
        if let Some(raw) = env_value(PAGE_SIZE_ENV) {
            return raw.parse();
        }
        match self.page_size {
            Some(size) => PageSize::try_from(size),
            None => Ok(PageSize::default()),
        }
    }

    /// Database path from the CLI, then the environment, then this file.
    pub fn resolve_database(&self, cli: Option<PathBuf>) -> Option<PathBuf> {
        cli.or_else(|| env_value(DATABASE_ENV).map(PathBuf::from))
            .or_else(|| self.database.clone())
    }

    pub fn set_page_size(&mut self, size: PageSize) {
        self.page_size = Some(size.get());
    }

    pub fn set_database(&mut self, path: PathBuf) {
        self.database = Some(path);
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
