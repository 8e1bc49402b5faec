use crate::cli::command_handlers::{
    AggregateHandler, BrowseHandler, CatalogHandler, ConfigHandler, ExportHandler, LoadHandler,
    QueryHandler,
};
use crate::cli::main_types::Commands;
use crate::cli::shell::Shell;
use std::path::PathBuf;
use tabsql_core::core::pagination::PageSize;
use tabsql_core::core::session::Session;
use tabsql_core::display::ProgressSpinner;
use tabsql_core::engine::EngineConfig;
use tabsql_core::error::{AppError, CliError};
use tabsql_core::storage::config::Config;
use tabsql_core::utils::logging::print_verbose;

/// Global flags that shape how the session is opened.
#[derive(Debug, Default, Clone)]
pub struct SessionOptions {
    pub database: Option<PathBuf>,
    pub load: Vec<PathBuf>,
    pub page_size: Option<PageSize>,
}

pub struct Dispatcher {
    config: Config,
    config_path: Option<PathBuf>,
    verbose: bool,
    options: SessionOptions,
}

impl Dispatcher {
    fn log_verbose(&self, msg: &str) {
        print_verbose(self.verbose, msg);
    }

    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        verbose: bool,
        options: SessionOptions,
    ) -> Self {
        Self {
            config,
            config_path,
            verbose,
            options,
        }
    }

    fn engine_config(&self) -> EngineConfig {
        match self.config.resolve_database(self.options.database.clone()) {
            Some(path) => EngineConfig::with_database(path),
            None => EngineConfig::in_memory(),
        }
    }

    /// Explicit path, else the configured export directory, else the current one.
    pub fn export_target(&self, output: Option<PathBuf>) -> PathBuf {
        output
            .or_else(|| self.config.export_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    // Open the engine, then load any --load files into it
    pub async fn open_session(&self) -> Result<Session, AppError> {
        let page_size = self.config.resolve_page_size(self.options.page_size)?;
        let engine_config = self.engine_config();
        self.log_verbose(&format!(
            "Opening {} with page size {}",
            engine_config
                .database
                .as_ref()
                .map_or("in-memory database".to_string(), |p| p.display().to_string()),
            page_size
        ));

        let mut spinner = ProgressSpinner::new("Starting engine...".to_string());
        spinner.start();
        let session = Session::connect(&engine_config, page_size).await;
        spinner.stop(None);
        let mut session = session?;

        if !self.options.load.is_empty() {
            LoadHandler::new()
                .load(&mut session, &self.options.load, self.verbose)
                .await;
        }

        log::debug!("Session ready with {} table(s)", session.tables().len());
        Ok(session)
    }

    pub async fn dispatch(&self, command: Commands) -> Result<(), AppError> {
        match command {
            Commands::Config { command } => {
                let handler = ConfigHandler::new();
                handler.handle(
                    command,
                    self.config.clone(),
                    self.config_path.clone(),
                    self.verbose,
                )
            }
            Commands::Query(args) => {
                let mut session = self.open_session().await?;
                QueryHandler::new()
                    .handle(args, &mut session, self.verbose)
                    .await
            }
            Commands::Load { files } => {
                let mut session = self.open_session().await?;
                let failed = LoadHandler::new()
                    .load(&mut session, &files, self.verbose)
                    .await;
                if failed == files.len() {
                    return Err(AppError::Cli(CliError::InvalidArguments(
                        "None of the files could be loaded".to_string(),
                    )));
                }
                Ok(())
            }
            Commands::Tables { format } => {
                let session = self.open_session().await?;
                CatalogHandler::new().handle_tables(&session, format)
            }
            Commands::Describe { table } => {
                let mut session = self.open_session().await?;
                CatalogHandler::new()
                    .handle_describe(&mut session, &table, self.verbose)
                    .await
            }
            Commands::Browse(args) => {
                let mut session = self.open_session().await?;
                BrowseHandler::new()
                    .handle(args, &mut session, self.verbose)
                    .await
            }
            Commands::Aggregate(args) => {
                let mut session = self.open_session().await?;
                AggregateHandler::new()
                    .handle(args, &mut session, self.verbose)
                    .await
            }
            Commands::Export { sql, output } => {
                let mut session = self.open_session().await?;
                let target = self.export_target(output);
                ExportHandler::new()
                    .handle(&sql, &target, &mut session, self.verbose)
                    .await
            }
            Commands::Shell => {
                self.log_verbose("Starting interactive shell");
                let session = match self.open_session().await {
                    Ok(session) => Some(session),
                    Err(e) => {
                        report_error(&e);
                        None
                    }
                };
                Shell::new(self, session).run().await
            }
        }
    }
}

/// Print an error with its severity marker and troubleshooting hint.
pub fn report_error(error: &AppError) {
    eprintln!(
        "{} Error: {}",
        error.severity().emoji(),
        error.display_friendly()
    );
    if let Some(hint) = error.troubleshooting_hint() {
        eprintln!("   Hint: {}", hint);
    }
}

