use crate::cli::interactive_display::InteractiveDisplay;
use crate::cli::main_types::{AggregateArgs, BrowseArgs, ConfigCommands, OutputFormat, QueryArgs};
use std::path::{Path, PathBuf};
use tabsql_core::core::aggregation::{
    AggregateFunction, AggregationQuery, OrderDirection, OrderTarget, order_options,
};
use tabsql_core::core::pagination::{Command, PageSize};
use tabsql_core::core::session::{Completion, Session};
use tabsql_core::display::{
    NoticeKind, OperationStatus, ProgressSpinner, TableDisplay, display_status, format_status,
};
use tabsql_core::error::{AppError, CliError, QueryBuildError, QueryError};
use tabsql_core::storage::config::{Config, DATABASE_ENV, PAGE_SIZE_ENV};
use tabsql_core::utils::logging::print_verbose;
use tabsql_core::utils::sql::quote_identifier;

/// Turn a finished dispatch into a command result. `rejected` builds the
/// error for a command the controller refused to plan.
pub fn finish(
    completion: Option<Completion>,
    rejected: impl FnOnce() -> AppError,
) -> Result<(), AppError> {
    match completion {
        None => Err(rejected()),
        Some(Completion::Failed(e)) => Err(e.into()),
        Some(Completion::Rendered) | Some(Completion::Stale) => Ok(()),
    }
}

pub fn notice_status(kind: NoticeKind) -> OperationStatus {
    match kind {
        NoticeKind::Success => OperationStatus::Success,
        NoticeKind::Error => OperationStatus::Error,
    }
}

/// Print queued notices on stderr so stdout stays machine readable.
pub fn report_notices(session: &mut Session) {
    for notice in session.notices().drain() {
        eprintln!("{}", format_status(&notice.text, notice_status(notice.kind)));
    }
}

/// Print the current view, plus the navigation bar while paging.
pub fn print_page(session: &Session, display: &TableDisplay) -> Result<(), AppError> {
    if let Some(view) = session.view() {
        println!("{}", display.render_view(view)?);
        let nav = session.navigation();
        if view.show_pagination && nav.visible {
            println!("{}", display.render_navigation(&nav));
        }
    }
    Ok(())
}

fn print_result(session: &Session, format: OutputFormat) -> Result<(), AppError> {
    let display = TableDisplay::new();
    match format {
        OutputFormat::Json => {
            if let Some(result) = session.last_result() {
                println!("{}", display.render_json(result)?);
            }
        }
        OutputFormat::Csv => {
            if let Some(result) = session.last_result() {
                print!("{}", display.render_csv(result)?);
            }
        }
        OutputFormat::Table => print_page(session, &display)?,
    }
    Ok(())
}

async fn run_statement(session: &mut Session, sql: &str, message: &str) -> Result<(), AppError> {
    let mut spinner = ProgressSpinner::new(message.to_string());
    spinner.start();
    let completion = session.execute(sql).await;
    spinner.stop(None);
    finish(completion, || QueryError::EmptyStatement.into())
}

#[derive(Default)]
pub struct ConfigHandler;

impl ConfigHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(
        &self,
        command: ConfigCommands,
        mut config: Config,
        config_path: Option<PathBuf>,
        verbose: bool,
    ) -> Result<(), AppError> {
        match command {
            ConfigCommands::Show => {
                print_verbose(verbose, "Showing configuration");

                println!("Current Configuration:");
                println!("=====================");

                match &config_path {
                    Some(path) => println!("Config File: {}", path.display()),
                    None => match Config::config_file_path() {
                        Ok(path) => println!("Config File: {}", path.display()),
                        Err(_) => println!("Config File: (home directory not found)"),
                    },
                }

                match config.page_size {
                    Some(size) => println!("Page Size: {}", size),
                    None => println!("Page Size: {} (default)", PageSize::DEFAULT),
                }
                match &config.database {
                    Some(path) => println!("Database: {}", path.display()),
                    None => println!("Database: in-memory"),
                }
                match &config.export_dir {
                    Some(dir) => println!("Export Directory: {}", dir.display()),
                    None => println!("Export Directory: current directory"),
                }

                println!("\nEnvironment:");
                for name in [PAGE_SIZE_ENV, DATABASE_ENV] {
                    match std::env::var(name) {
                        Ok(value) if !value.is_empty() => println!("  {}: {}", name, value),
                        _ => println!("  {}: not set", name),
                    }
                }

                if let Err(e) = config.validate() {
                    display_status(&e.to_string(), OperationStatus::Warning);
                }
                Ok(())
            }
            ConfigCommands::Set {
                page_size,
                database,
                export_dir,
            } => {
                print_verbose(
                    verbose,
                    &format!(
                        "Setting configuration - page size: {:?}, database: {:?}, export dir: {:?}",
                        page_size, database, export_dir
                    ),
                );

                let mut updated_fields = Vec::new();

                if let Some(size) = page_size {
                    config.set_page_size(size);
                    updated_fields.push(format!("page size to: {}", size));
                }

                if let Some(path) = database {
                    updated_fields.push(format!("database to: {}", path.display()));
                    config.set_database(path);
                }

                if let Some(dir) = export_dir {
                    updated_fields.push(format!("export directory to: {}", dir.display()));
                    config.export_dir = Some(dir);
                }

                if updated_fields.is_empty() {
                    return Err(AppError::Cli(CliError::InvalidArguments(
                        "No configuration values provided. Use --page-size, --database and/or --export-dir".to_string(),
                    )));
                }

                config.save(config_path)?;
                println!("✅ Set {}", updated_fields.join(", "));
                println!("Configuration saved successfully.");
                Ok(())
            }
        }
    }
}

#[derive(Default)]
pub struct LoadHandler;

impl LoadHandler {
    pub fn new() -> Self {
        Self
    }

    /// Load every file into the session. Returns how many failed.
    pub async fn load(&self, session: &mut Session, files: &[PathBuf], verbose: bool) -> usize {
        print_verbose(verbose, &format!("Loading {} file(s)", files.len()));

        let mut spinner = ProgressSpinner::new(format!("Loading {} file(s)...", files.len()));
        spinner.start();
        let outcomes = session.upload_paths(files).await;
        spinner.stop(None);

        report_notices(session);
        outcomes.iter().filter(|outcome| outcome.is_err()).count()
    }
}

#[derive(Default)]
pub struct QueryHandler;

impl QueryHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        args: QueryArgs,
        session: &mut Session,
        verbose: bool,
    ) -> Result<(), AppError> {
        print_verbose(
            verbose,
            &format!(
                "Executing query - Format: {:?}, Export: {:?}",
                args.format, args.export
            ),
        );

        run_statement(session, &args.sql, "Executing query...").await?;
        print_result(session, args.format)?;

        if let Some(path) = args.export {
            session.export_csv(&path)?;
            report_notices(session);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct CatalogHandler;

impl CatalogHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_tables(&self, session: &Session, format: OutputFormat) -> Result<(), AppError> {
        let tables: Vec<&String> = session.tables().iter().collect();

        match format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&tables).map_err(|e| {
                    AppError::Cli(CliError::InvalidArguments(format!(
                        "Failed to serialize tables to JSON: {}",
                        e
                    )))
                })?;
                println!("{}", json);
            }
            OutputFormat::Csv => {
                println!("name");
                for table in tables {
                    println!("{}", table);
                }
            }
            OutputFormat::Table => {
                if tables.is_empty() {
                    display_status("No tables loaded", OperationStatus::Info);
                    println!("Load files with 'tabsql --load <FILE> tables' or run CREATE TABLE.");
                    return Ok(());
                }
                let rows: Vec<Vec<String>> = tables.iter().map(|t| vec![t.to_string()]).collect();
                println!("{}", TableDisplay::new().render_simple_table(&["Table"], &rows));
                println!("{} tables", rows.len());
            }
        }
        Ok(())
    }

    pub async fn handle_describe(
        &self,
        session: &mut Session,
        table: &str,
        verbose: bool,
    ) -> Result<(), AppError> {
        print_verbose(verbose, &format!("Describing table {}", table));
        let sql = format!("DESCRIBE {}", quote_identifier(table));
        run_statement(session, &sql, "Reading schema...").await?;
        print_page(session, &TableDisplay::new())
    }
}

#[derive(Default)]
pub struct BrowseHandler;

impl BrowseHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        args: BrowseArgs,
        session: &mut Session,
        verbose: bool,
    ) -> Result<(), AppError> {
        print_verbose(
            verbose,
            &format!(
                "Browsing table {} - Page: {}, Page size: {}",
                args.table,
                args.page,
                session.state().page_size
            ),
        );

        let mut spinner = ProgressSpinner::new(format!("Loading {}...", args.table));
        spinner.start();
        let completion = session
            .dispatch(Command::SelectTable(args.table.clone()))
            .await;
        spinner.stop(None);
        finish(completion, || {
            CliError::InvalidArguments("A table name is required".to_string()).into()
        })?;

        if args.page > 1 {
            let total_pages = session.navigation().total_pages;
            let completion = session.dispatch(Command::GoToPage(args.page)).await;
            finish(completion, || {
                CliError::InvalidArguments(format!(
                    "Page {} is out of range (1-{})",
                    args.page,
                    total_pages.max(1)
                ))
                .into()
            })?;
        }

        let interactive = !args.no_interactive
            && atty::is(atty::Stream::Stdout)
            && atty::is(atty::Stream::Stdin);

        if interactive {
            print_verbose(verbose, "Using full interactive mode with crossterm");
            InteractiveDisplay::new().browse(session, &args.table).await
        } else {
            print_verbose(verbose, "Printing a single page");
            print_page(session, &TableDisplay::new())
        }
    }
}

#[derive(Default)]
pub struct AggregateHandler;

impl AggregateHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        args: AggregateArgs,
        session: &mut Session,
        verbose: bool,
    ) -> Result<(), AppError> {
        let function: AggregateFunction = args.function.parse()?;
        let table = args.table.unwrap_or_default();
        let group_by = args.group_by.unwrap_or_default();

        if args.options {
            if table.is_empty() {
                return Err(QueryBuildError::MissingSelection.into());
            }
            let columns = session.columns_of(&table).await;
            let group = Some(group_by.as_str()).filter(|g| !g.is_empty());
            println!("Order by options:");
            for option in order_options(&columns, function, group, args.value.as_deref()) {
                println!("  {}", option.label);
            }
            return Ok(());
        }

        let mut query = AggregationQuery::new(table, group_by).function(function, args.value);
        if let Some(order) = args.order_by {
            let target = if order.eq_ignore_ascii_case("aggregated") {
                OrderTarget::Aggregated
            } else {
                OrderTarget::Column(order)
            };
            let direction = if args.desc {
                OrderDirection::Desc
            } else {
                OrderDirection::Asc
            };
            query = query.order_by(target, direction);
        }

        let sql = query.build()?;
        if !args.run {
            println!("{}", sql);
            return Ok(());
        }

        print_verbose(verbose, &format!("Running aggregation:\n{}", sql));
        run_statement(session, &sql, "Running aggregation...").await?;
        print_page(session, &TableDisplay::new())
    }
}

#[derive(Default)]
pub struct ExportHandler;

impl ExportHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        sql: &str,
        target: &Path,
        session: &mut Session,
        verbose: bool,
    ) -> Result<(), AppError> {
        print_verbose(verbose, &format!("Exporting to {}", target.display()));
        run_statement(session, sql, "Executing query...").await?;

        let written = session.export_csv(target)?;
        print_verbose(verbose, &format!("Wrote {}", written.display()));
        for notice in session.notices().drain() {
            display_status(&notice.text, notice_status(notice.kind));
        }
        Ok(())
    }
}
