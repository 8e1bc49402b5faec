use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("CliError: {0}")]
    Cli(#[from] CliError),
    #[error("Connection failed: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Query failed: {0}")]
    Query(#[from] QueryError),
    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),
    #[error("CatalogError: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
    #[error("QueryBuildError: {0}")]
    QueryBuild(#[from] QueryBuildError),
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
    #[error("DisplayError: {0}")]
    Display(#[from] DisplayError),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("Unknown shell command: {command}")]
    UnknownCommand { command: String },
}

/// Engine failed to start, or an operation ran without a live session.
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Engine initialization failed: {message}")]
    EngineInit { message: String },
    #[error("Not connected to the database")]
    NotConnected,
}

/// The engine rejected a statement. The message is the engine's, verbatim.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Empty SQL statement")]
    EmptyStatement,
    #[error("{message}")]
    Engine { message: String },
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Unsupported file type: {extension} ({file})")]
    UnsupportedFileType { file: String, extension: String },
    #[error("Failed to read {file}: {source}")]
    Read {
        file: String,
        source: std::io::Error,
    },
    #[error("Failed to register {file}: {message}")]
    Register { file: String, message: String },
    #[error("Failed to load {file}: {message}")]
    Ingest { file: String, message: String },
}

impl UploadError {
    pub fn file(&self) -> &str {
        match self {
            UploadError::UnsupportedFileType { file, .. }
            | UploadError::Read { file, .. }
            | UploadError::Register { file, .. }
            | UploadError::Ingest { file, .. } => file,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Failed to refresh tables: {message}")]
    Refresh { message: String },
    #[error("Failed to describe {table}: {message}")]
    Describe { table: String, message: String },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No results to export")]
    NoResults,
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryBuildError {
    #[error("Please select table and group by column")]
    MissingSelection,
    #[error("Please select a column for the aggregation function {function}")]
    MissingValueColumn { function: String },
    #[error("Unknown aggregation function: {name}")]
    UnknownFunction { name: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File I/O error at {path}: {source}")]
    FileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Configuration parse error: {message}")]
    ConfigParseError { message: String },
    #[error("Configuration directory not found")]
    ConfigDirNotFound,
}

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Table formatting failed: {0}")]
    TableFormat(String),
    #[error("Terminal output error: {0}")]
    TerminalOutput(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value for '{field}': {value}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl ErrorSeverity {
    pub fn emoji(&self) -> &'static str {
        match self {
            ErrorSeverity::Critical => "🚨",
            ErrorSeverity::High => "❌",
            ErrorSeverity::Medium => "⚠️",
            ErrorSeverity::Low => "ℹ️",
        }
    }
}

impl AppError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Cli(_) => ErrorSeverity::Medium,
            AppError::Connection(ConnectionError::EngineInit { .. }) => ErrorSeverity::Critical,
            AppError::Connection(ConnectionError::NotConnected) => ErrorSeverity::High,
            AppError::Query(_) => ErrorSeverity::Medium,
            AppError::Upload(_) => ErrorSeverity::Medium,
            AppError::Catalog(_) => ErrorSeverity::Low,
            AppError::Export(ExportError::NoResults) => ErrorSeverity::Low,
            AppError::Export(ExportError::Write { .. }) => ErrorSeverity::Medium,
            AppError::QueryBuild(_) => ErrorSeverity::Low,
            AppError::Config(_) => ErrorSeverity::High,
            AppError::Storage(_) => ErrorSeverity::Medium,
            AppError::Display(_) => ErrorSeverity::Low,
        }
    }

    pub fn display_friendly(&self) -> String {
        match self {
            AppError::Connection(ConnectionError::NotConnected) => {
                "Please connect to the database first".to_string()
            }
            AppError::Upload(err) => format!("Failed to upload {}: {}", err.file(), err),
            AppError::QueryBuild(err) => err.to_string(),
            _ => format!("{}", self),
        }
    }

    pub fn troubleshooting_hint(&self) -> Option<String> {
        match self {
            AppError::Connection(ConnectionError::EngineInit { .. }) => Some(
                "Check that the database path is writable, then retry ('.connect' in the shell)"
                    .to_string(),
            ),
            AppError::Connection(ConnectionError::NotConnected) => {
                Some("Run '.connect' to open a session".to_string())
            }
            AppError::Upload(UploadError::UnsupportedFileType { .. }) => {
                Some("Supported file types are .csv, .json and .parquet".to_string())
            }
            AppError::Export(ExportError::NoResults) => {
                Some("Run a query before exporting".to_string())
            }
            AppError::Config(ConfigError::InvalidValue { .. }) => Some(
                "'tabsql config set --page-size <10|25|50|100>' to fix the stored value"
                    .to_string(),
            ),
            _ => None,
        }
    }
}
