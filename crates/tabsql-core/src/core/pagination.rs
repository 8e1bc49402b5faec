//! Pagination controller
//!
//! Keeps a windowed view of a table consistent as the user pages through it.
//! The controller is a synchronous state machine: a [`Command`] mutates
//! [`PaginationState`] and yields the [`PageRequest`] to run. Execution
//! happens elsewhere (possibly on a spawned task) and comes back as a
//! [`PageResponse`], which the session applies only if its token is still the
//! latest one issued. A slow page load can therefore never overwrite the
//! result of a newer request.

use crate::core::executor::Execution;
use crate::display::render::RenderMode;
use crate::error::{ConfigError, QueryError};
use crate::utils::sql::{is_bounded_query, quote_identifier};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Page sizes offered by the page-size selector.
pub const PAGE_SIZE_OPTIONS: [u64; 4] = [10, 25, 50, 100];

/// Rows per page, restricted to [`PAGE_SIZE_OPTIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct PageSize(u64);

impl PageSize {
    pub const DEFAULT: PageSize = PageSize(25);

    pub fn get(self) -> u64 {
        self.0
    }

    /// Next larger option, wrapping to the smallest.
    pub fn next(self) -> PageSize {
        let idx = self.position();
        PageSize(PAGE_SIZE_OPTIONS[(idx + 1) % PAGE_SIZE_OPTIONS.len()])
    }

    /// Next smaller option, wrapping to the largest.
    pub fn previous(self) -> PageSize {
        let idx = self.position();
        PageSize(PAGE_SIZE_OPTIONS[(idx + PAGE_SIZE_OPTIONS.len() - 1) % PAGE_SIZE_OPTIONS.len()])
    }

    fn position(self) -> usize {
        PAGE_SIZE_OPTIONS
            .iter()
            .position(|&n| n == self.0)
            .unwrap_or(1)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u64> for PageSize {
    type Error = ConfigError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if PAGE_SIZE_OPTIONS.contains(&value) {
            Ok(PageSize(value))
        } else {
            Err(ConfigError::InvalidValue {
                field: "page_size".to_string(),
                value: value.to_string(),
                reason: "must be one of 10, 25, 50, 100".to_string(),
            })
        }
    }
}

impl From<PageSize> for u64 {
    fn from(size: PageSize) -> Self {
        size.0
    }
}

impl FromStr for PageSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u64 = s.trim().parse().map_err(|_| ConfigError::InvalidValue {
            field: "page_size".to_string(),
            value: s.to_string(),
            reason: "not a number".to_string(),
        })?;
        PageSize::try_from(value)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the controller sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No table browsed; results come from manual queries.
    Unselected,
    /// A table is browsed and sits on page 1.
    Selected,
    /// A table is browsed past page 1.
    Paging,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaginationState {
    pub selected_table: Option<String>,
    pub current_page: u64,
    pub page_size: PageSize,
    pub total_rows: u64,
    pub is_paginated: bool,
}

impl PaginationState {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            selected_table: None,
            current_page: 1,
            page_size,
            total_rows: 0,
            is_paginated: false,
        }
    }

    /// `ceil(total_rows / page_size)`; zero for an empty table.
    pub fn total_pages(&self) -> u64 {
        self.total_rows.div_ceil(self.page_size.get())
    }

    pub fn offset(&self) -> u64 {
        (self.current_page - 1) * self.page_size.get()
    }

    pub fn phase(&self) -> Phase {
        match (self.is_paginated, self.current_page) {
            (false, _) => Phase::Unselected,
            (true, 1) => Phase::Selected,
            (true, _) => Phase::Paging,
        }
    }

    pub fn navigation(&self) -> NavigationWidget {
        let total_pages = self.total_pages();
        let page_size = self.page_size.get();
        let end_row = (self.current_page * page_size).min(self.total_rows);
        let start_row = if self.total_rows == 0 {
            0
        } else {
            (self.current_page - 1) * page_size + 1
        };

        let at_first = self.current_page == 1;
        let at_last = self.current_page >= total_pages;

        NavigationWidget {
            visible: self.is_paginated,
            current_page: self.current_page,
            total_pages,
            start_row,
            end_row,
            total_rows: self.total_rows,
            first_disabled: at_first,
            prev_disabled: at_first,
            next_disabled: at_last,
            last_disabled: at_last,
        }
    }
}

/// Derived state of the pagination bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationWidget {
    pub visible: bool,
    pub current_page: u64,
    pub total_pages: u64,
    pub start_row: u64,
    pub end_row: u64,
    pub total_rows: u64,
    pub first_disabled: bool,
    pub prev_disabled: bool,
    pub next_disabled: bool,
    pub last_disabled: bool,
}

impl NavigationWidget {
    pub fn range_label(&self) -> String {
        format!(
            "Showing {}-{} of {} rows",
            self.start_row, self.end_row, self.total_rows
        )
    }

    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.current_page, self.total_pages)
    }

    pub fn all_disabled(&self) -> bool {
        self.first_disabled && self.prev_disabled && self.next_disabled && self.last_disabled
    }
}

/// UI intents consumed by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SelectTable(String),
    SetPageSize(PageSize),
    FirstPage,
    PreviousPage,
    NextPage,
    LastPage,
    GoToPage(u64),
    /// Re-run the current page query.
    Reload,
    /// A manually entered statement.
    Execute(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Count plus first page of a freshly selected table.
    SelectTable,
    /// A bounded page of the selected table.
    Page,
    /// A manual statement.
    Manual,
}

/// Work issued by the controller, tagged with its sequence token.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub token: u64,
    pub kind: RequestKind,
    pub count_sql: Option<String>,
    pub sql: String,
}

/// Outcome of running a [`PageRequest`].
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub token: u64,
    pub total_rows: Option<Result<u64, QueryError>>,
    pub outcome: Result<Execution, QueryError>,
}

#[derive(Debug)]
pub struct PaginationController {
    state: PaginationState,
    token: u64,
    /// The selected table's count has not landed yet.
    count_pending: bool,
}

impl PaginationController {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            state: PaginationState::new(page_size),
            token: 0,
            count_pending: false,
        }
    }

    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    pub fn navigation(&self) -> NavigationWidget {
        self.state.navigation()
    }

    /// Token of the most recently issued request.
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn is_current(&self, token: u64) -> bool {
        token == self.token
    }

    pub fn render_mode(&self) -> RenderMode {
        if self.state.is_paginated {
            RenderMode::Paginated
        } else {
            RenderMode::Direct
        }
    }

    /// Apply a command. `None` means it was rejected or needs no query.
    pub fn handle(&mut self, command: Command) -> Option<PageRequest> {
        log::debug!("Pagination command {:?} in {:?}", command, self.state);

        match command {
            Command::SelectTable(name) => self.select_table(name),
            Command::SetPageSize(size) => self.set_page_size(size),
            Command::FirstPage => self.go_to_page(1),
            Command::PreviousPage => self.go_to_page(self.state.current_page.saturating_sub(1)),
            Command::NextPage => self.go_to_page(self.state.current_page + 1),
            Command::LastPage => self.go_to_page(self.state.total_pages()),
            Command::GoToPage(page) => self.go_to_page(page),
            Command::Reload => self.load_page(),
            Command::Execute(sql) => self.execute_manual(sql),
        }
    }

    fn select_table(&mut self, name: String) -> Option<PageRequest> {
        if name.is_empty() {
            return None;
        }

        // The previous table's count must not bound navigation on this one.
        self.state.selected_table = Some(name);
        self.state.current_page = 1;
        self.state.total_rows = 0;
        self.state.is_paginated = true;
        self.count_pending = true;

        let table = self.quoted_table()?;
        let sql = self.page_sql(&table);
        Some(self.issue(RequestKind::SelectTable, Some(count_sql_for(&table)), sql))
    }

    fn set_page_size(&mut self, size: PageSize) -> Option<PageRequest> {
        self.state.page_size = size;
        self.state.current_page = 1;

        if !self.state.is_paginated {
            return None;
        }
        let table = self.state.selected_table.clone()?;
        self.select_table(table)
    }

    fn go_to_page(&mut self, page: u64) -> Option<PageRequest> {
        let total_pages = self.state.total_pages();
        if !self.state.is_paginated || page < 1 || page > total_pages {
            log::debug!("Page {} is out of range (1-{})", page, total_pages);
            return None;
        }

        self.state.current_page = page;
        self.load_page()
    }

    fn load_page(&mut self) -> Option<PageRequest> {
        if !self.state.is_paginated {
            return None;
        }
        let table = self.quoted_table()?;
        let sql = self.page_sql(&table);
        // A superseded selection takes its count with it, so ask again.
        let count_sql = self.count_pending.then(|| count_sql_for(&table));
        Some(self.issue(RequestKind::Page, count_sql, sql))
    }

    fn execute_manual(&mut self, sql: String) -> Option<PageRequest> {
        let sql = sql.trim().to_string();
        if sql.is_empty() {
            return None;
        }

        // A query with both LIMIT and OFFSET is user-driven paging.
        if !is_bounded_query(&sql) {
            self.state.is_paginated = false;
        }
        Some(self.issue(RequestKind::Manual, None, sql))
    }

    fn quoted_table(&self) -> Option<String> {
        self.state
            .selected_table
            .as_deref()
            .map(quote_identifier)
    }

    fn page_sql(&self, table: &str) -> String {
        format!(
            "SELECT * FROM {} LIMIT {} OFFSET {}",
            table,
            self.state.page_size.get(),
            self.state.offset()
        )
    }

    fn issue(&mut self, kind: RequestKind, count_sql: Option<String>, sql: String) -> PageRequest {
        self.token += 1;
        log::debug!("Issuing {:?} request #{}: {}", kind, self.token, sql);
        PageRequest {
            token: self.token,
            kind,
            count_sql,
            sql,
        }
    }

    /// Record the row count of the selected table. A failed count leaves the
    /// table browsable with zero rows.
    pub fn apply_total_rows(&mut self, total: Result<u64, QueryError>) {
        self.count_pending = false;
        match total {
            Ok(total) => self.state.total_rows = total,
            Err(e) => {
                log::warn!("Failed to get total rows: {}", e);
                self.state.total_rows = 0;
            }
        }

        let total_pages = self.state.total_pages();
        if total_pages > 0 && self.state.current_page > total_pages {
            self.state.current_page = total_pages;
        }
        if total_pages == 0 {
            self.state.current_page = 1;
        }
    }
}

fn count_sql_for(table: &str) -> String {
    format!("SELECT COUNT(*) AS total FROM {}", table)
}
