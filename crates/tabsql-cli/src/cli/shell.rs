//! Line-oriented SQL shell.
//!
//! Statements end with `;` and may span lines. Lines starting with `.` are
//! shell commands, mostly thin wrappers over pagination commands.

use crate::cli::command_handlers::{notice_status, print_page};
use crate::cli::dispatcher::{Dispatcher, report_error};
use std::io::{self, Write};
use std::path::PathBuf;
use tabsql_core::core::pagination::{Command, PageSize, PaginationState};
use tabsql_core::core::session::{Completion, Session};
use tabsql_core::display::{OperationStatus, TableDisplay, display_status};
use tabsql_core::error::{AppError, CliError, ConnectionError, DisplayError};
use tabsql_core::utils::sql::is_complete_statement;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "Commands:
  <sql>;            Run a statement (may span lines)
  .tables           List tables
  .describe TABLE   List a table's columns
  .select TABLE     Browse a table page by page
  .next .prev       Next / previous page
  .first .last      First / last page
  .page N           Jump to page N
  .size N           Rows per page (10, 25, 50, 100)
  .reload           Re-run the current page
  .load FILE...     Load CSV, JSON or Parquet files
  .export [PATH]    Write the last result as CSV
  .connect          Open the database if it is not open
  .help             Show this help
  .quit             Exit";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Navigate(Command),
    Tables,
    Describe(String),
    Load(Vec<PathBuf>),
    Export(Option<PathBuf>),
    Connect,
    Help,
    Quit,
}

/// Parse a `.command` line.
pub fn parse_dot_command(line: &str) -> Result<ShellCommand, CliError> {
    let mut parts = line.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    let one_arg = |what: &str| -> Result<String, CliError> {
        match args.as_slice() {
            [value] => Ok(value.to_string()),
            _ => Err(CliError::InvalidArguments(format!(
                "'{}' needs exactly one {}",
                name, what
            ))),
        }
    };

    let command = match name {
        ".tables" => ShellCommand::Tables,
        ".describe" => ShellCommand::Describe(one_arg("table name")?),
        ".select" => ShellCommand::Navigate(Command::SelectTable(one_arg("table name")?)),
        ".next" => ShellCommand::Navigate(Command::NextPage),
        ".prev" => ShellCommand::Navigate(Command::PreviousPage),
        ".first" => ShellCommand::Navigate(Command::FirstPage),
        ".last" => ShellCommand::Navigate(Command::LastPage),
        ".reload" => ShellCommand::Navigate(Command::Reload),
        ".page" => {
            let raw = one_arg("page number")?;
            let page = raw.parse::<u64>().map_err(|_| {
                CliError::InvalidArguments(format!("'{}' is not a page number", raw))
            })?;
            ShellCommand::Navigate(Command::GoToPage(page))
        }
        ".size" => {
            let size = one_arg("page size")?
                .parse::<PageSize>()
                .map_err(|e| CliError::InvalidArguments(e.to_string()))?;
            ShellCommand::Navigate(Command::SetPageSize(size))
        }
        ".load" => {
            if args.is_empty() {
                return Err(CliError::InvalidArguments(
                    "'.load' needs at least one file".to_string(),
                ));
            }
            ShellCommand::Load(args.iter().map(PathBuf::from).collect())
        }
        ".export" => match args.as_slice() {
            [] => ShellCommand::Export(None),
            [path] => ShellCommand::Export(Some(PathBuf::from(path))),
            _ => {
                return Err(CliError::InvalidArguments(
                    "'.export' takes at most one path".to_string(),
                ));
            }
        },
        ".connect" => ShellCommand::Connect,
        ".help" => ShellCommand::Help,
        ".quit" | ".exit" => ShellCommand::Quit,
        _ => {
            return Err(CliError::UnknownCommand {
                command: name.to_string(),
            });
        }
    };
    Ok(command)
}

/// Collects input lines until a statement or shell command is complete.
#[derive(Debug, Default)]
pub struct StatementBuffer {
    pending: String,
}

impl StatementBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a statement spans several lines.
    pub fn is_continuing(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn push_line(&mut self, line: &str) -> Result<Option<ShellCommand>, CliError> {
        let trimmed = line.trim();
        if !self.is_continuing() {
            if trimmed.is_empty() {
                return Ok(None);
            }
            if trimmed.starts_with('.') {
                return parse_dot_command(trimmed).map(Some);
            }
        }

        self.pending.push_str(line);
        self.pending.push('\n');
        if !is_complete_statement(&self.pending) {
            return Ok(None);
        }

        let statement = std::mem::take(&mut self.pending);
        let statement = statement.trim().trim_end_matches(';').trim_end();
        if statement.is_empty() {
            return Ok(None);
        }
        Ok(Some(ShellCommand::Navigate(Command::Execute(
            statement.to_string(),
        ))))
    }
}

enum Flow {
    Continue,
    Quit,
}

pub struct Shell<'a> {
    dispatcher: &'a Dispatcher,
    session: Option<Session>,
    buffer: StatementBuffer,
    display: TableDisplay,
}

impl<'a> Shell<'a> {
    pub fn new(dispatcher: &'a Dispatcher, session: Option<Session>) -> Self {
        Self {
            dispatcher,
            session,
            buffer: StatementBuffer::new(),
            display: TableDisplay::new(),
        }
    }

    pub async fn run(mut self) -> Result<(), AppError> {
        println!("tabsql shell. Type .help for commands, .quit to exit.");
        if let Some(session) = &self.session {
            if let Some(version) = session.engine_version().await {
                println!("DuckDB {}", version);
            }
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let prompt = if self.buffer.is_continuing() {
                "   ...> "
            } else {
                "tabsql> "
            };
            print!("{}", prompt);
            io::stdout()
                .flush()
                .map_err(|e| DisplayError::TerminalOutput(e.to_string()))?;

            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => return Err(DisplayError::TerminalOutput(e.to_string()).into()),
            };

            let command = match self.buffer.push_line(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    report_error(&e.into());
                    continue;
                }
            };

            match self.execute(command).await {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => report_error(&e),
            }
            if let Some(session) = self.session.as_mut() {
                print_notices(session);
            }
        }

        Ok(())
    }

    async fn execute(&mut self, command: ShellCommand) -> Result<Flow, AppError> {
        match command {
            ShellCommand::Quit => return Ok(Flow::Quit),
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Connect => {
                if self.session.is_some() {
                    display_status("Already connected", OperationStatus::Info);
                } else {
                    self.session = Some(self.dispatcher.open_session().await?);
                    display_status("Connected", OperationStatus::Success);
                }
            }
            ShellCommand::Export(path) => {
                let session = self.session.as_mut().ok_or(ConnectionError::NotConnected)?;
                session.export_csv(&self.dispatcher.export_target(path))?;
            }
            other => {
                let session = self.session.as_mut().ok_or(ConnectionError::NotConnected)?;
                run_session_command(session, other, &self.display).await?;
            }
        }
        Ok(Flow::Continue)
    }
}

/// What to tell the user when a navigation command issued no query.
pub fn rejection_message(command: &Command, state: &PaginationState) -> String {
    match command {
        // The size is stored even when nothing is browsed.
        Command::SetPageSize(size) => format!("Page size set to {}", size),
        _ if !state.is_paginated => "Select a table first with '.select <table>'".to_string(),
        _ => "No such page".to_string(),
    }
}

/// Run a command that needs an open session and print what it produced.
pub async fn run_session_command(
    session: &mut Session,
    command: ShellCommand,
    display: &TableDisplay,
) -> Result<(), AppError> {
    match command {
        ShellCommand::Navigate(command) => match session.dispatch(command.clone()).await {
            None => display_status(
                &rejection_message(&command, session.state()),
                OperationStatus::Info,
            ),
            // Failures arrive as notices.
            Some(Completion::Failed(_)) => {}
            Some(_) => print_page(session, display)?,
        },
        ShellCommand::Tables => {
            let rows: Vec<Vec<String>> = session.tables().iter().map(|t| vec![t.clone()]).collect();
            if rows.is_empty() {
                display_status("No tables loaded", OperationStatus::Info);
            } else {
                println!("{}", display.render_simple_table(&["Table"], &rows));
            }
        }
        ShellCommand::Describe(table) => {
            let columns = session.columns_of(&table).await;
            if columns.is_empty() {
                display_status(
                    &format!("Could not describe '{}'", table),
                    OperationStatus::Warning,
                );
            } else {
                let rows: Vec<Vec<String>> = columns.into_iter().map(|c| vec![c]).collect();
                println!("{}", display.render_simple_table(&["Column"], &rows));
            }
        }
        ShellCommand::Load(paths) => {
            let outcomes = session.upload_paths(&paths).await;
            if outcomes.iter().any(|o| o.is_ok()) {
                print_page(session, display)?;
            }
        }
        ShellCommand::Export(_) | ShellCommand::Connect | ShellCommand::Help | ShellCommand::Quit => {
            return Err(CliError::InvalidArguments(
                "command is handled by the shell itself".to_string(),
            )
            .into());
        }
    }
    Ok(())
}

fn print_notices(session: &mut Session) {
    for notice in session.notices().drain() {
        display_status(&notice.text, notice_status(notice.kind));
    }
}
