//! Full-screen pager for browsing a table.
//!
//! Page loads run on spawned tasks and report back over a channel, so the
//! screen keeps redrawing (and accepting keys) while a query is in flight.
//! Only the response for the most recent request is applied.

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{
        self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use std::io::{self, Write, stdout};
use std::time::{Duration, Instant};
use tabsql_core::core::pagination::{Command, PageResponse, PageSize};
use tabsql_core::core::session::{Completion, Session};
use tabsql_core::display::{NoticeKind, OperationStatus, TableDisplay, format_status};
use tabsql_core::error::{AppError, DisplayError};
use tokio::sync::mpsc;

const TICK_RATE: Duration = Duration::from_millis(100);
const HELP_LINE: &str = "n/p next/prev  Home/End first/last  +/- page size  r reload  q quit";
// Title, navigation bar, status line and help line.
const CHROME_LINES: usize = 4;

/// What a key press asks the pager to do.
#[derive(Debug, Clone, PartialEq)]
pub enum PagerAction {
    Navigate(Command),
    Quit,
}

/// Map a key press to a pager action. `page_size` is the current size, used
/// to pick the next or previous option for `+` and `-`.
pub fn key_action(key: &KeyEvent, page_size: PageSize) -> Option<PagerAction> {
    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => PagerAction::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => PagerAction::Quit,
        KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => {
            PagerAction::Navigate(Command::NextPage)
        }
        KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
            PagerAction::Navigate(Command::PreviousPage)
        }
        KeyCode::Char('g') | KeyCode::Home => PagerAction::Navigate(Command::FirstPage),
        KeyCode::Char('G') | KeyCode::End => PagerAction::Navigate(Command::LastPage),
        KeyCode::Char('+') => PagerAction::Navigate(Command::SetPageSize(page_size.next())),
        KeyCode::Char('-') => PagerAction::Navigate(Command::SetPageSize(page_size.previous())),
        KeyCode::Char('r') => PagerAction::Navigate(Command::Reload),
        _ => return None,
    };
    Some(action)
}

/// Status line: a loading marker wins over the newest live notice.
pub fn status_line(loading: bool, notice: Option<(NoticeKind, &str)>) -> String {
    if loading {
        return "⏳ Loading...".to_string();
    }
    match notice {
        Some((NoticeKind::Success, text)) => format_status(text, OperationStatus::Success),
        Some((NoticeKind::Error, text)) => format_status(text, OperationStatus::Error),
        None => String::new(),
    }
}

/// Keep the first `height` lines of `text`, marking the cut.
pub fn fit_lines(text: &str, height: usize) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= height {
        return lines.into_iter().map(str::to_string).collect();
    }
    let keep = height.saturating_sub(1);
    let mut fitted: Vec<String> = lines[..keep].iter().map(|l| l.to_string()).collect();
    fitted.push(format!("... {} more lines (lower the page size with -)", lines.len() - keep));
    fitted
}

fn terminal_error(e: io::Error) -> AppError {
    DisplayError::TerminalOutput(e.to_string()).into()
}

/// Raw mode and the alternate screen, restored on drop.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(e) = execute!(stdout(), EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

#[derive(Default)]
pub struct InteractiveDisplay;

impl InteractiveDisplay {
    pub fn new() -> Self {
        Self
    }

    /// Run the pager until the user quits. The session must already show the
    /// table's first page.
    pub async fn browse(&self, session: &mut Session, table: &str) -> Result<(), AppError> {
        let _guard = TerminalGuard::enter().map_err(terminal_error)?;
        let (tx, mut rx) = mpsc::unbounded_channel::<PageResponse>();
        let mut loading = false;

        loop {
            while let Ok(response) = rx.try_recv() {
                match session.complete(response) {
                    Completion::Stale => {}
                    Completion::Rendered | Completion::Failed(_) => loading = false,
                }
                session.refresh_catalog_if_stale().await;
            }

            self.draw(session, table, loading)?;

            if !event::poll(TICK_RATE).map_err(terminal_error)? {
                continue;
            }
            let key = match event::read().map_err(terminal_error)? {
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => key,
                _ => continue,
            };

            match key_action(&key, session.state().page_size) {
                Some(PagerAction::Quit) => break,
                Some(PagerAction::Navigate(command)) => {
                    if let Some(request) = session.begin(command) {
                        loading = true;
                        let executor = session.executor().clone();
                        let tx = tx.clone();
                        tokio::spawn(async move {
                            let response = executor.run(request).await;
                            let _ = tx.send(response);
                        });
                    }
                }
                None => {}
            }
        }

        Ok(())
    }

    fn draw(&self, session: &mut Session, table: &str, loading: bool) -> Result<(), AppError> {
        let (width, height) = terminal::size().map_err(terminal_error)?;
        let display = TableDisplay::new()
            .with_max_width(width as usize)
            .with_colors(false);

        let body = match session.view() {
            Some(view) => display.render_view(view)?,
            None => String::new(),
        };
        let nav = session.navigation();
        let nav_line = if nav.visible {
            display.render_navigation(&nav)
        } else {
            String::new()
        };
        let status = {
            let notice = session
                .notices()
                .live(Instant::now())
                .last()
                .map(|n| (n.kind, n.text.clone()));
            status_line(loading, notice.as_ref().map(|(k, t)| (*k, t.as_str())))
        };

        let body_height = (height as usize).saturating_sub(CHROME_LINES).max(1);
        let mut out = stdout();
        queue!(out, Clear(ClearType::All), MoveTo(0, 0)).map_err(terminal_error)?;
        queue!(out, Print(format!("tabsql - {}\r\n", table))).map_err(terminal_error)?;
        for line in fit_lines(&body, body_height) {
            queue!(out, Print(line), Print("\r\n")).map_err(terminal_error)?;
        }
        for line in [nav_line, status, HELP_LINE.to_string()] {
            queue!(out, Print(line), Print("\r\n")).map_err(terminal_error)?;
        }
        out.flush().map_err(terminal_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_navigation_keys() {
        let size = PageSize::DEFAULT;
        assert_eq!(
            key_action(&key(KeyCode::Char('n')), size),
            Some(PagerAction::Navigate(Command::NextPage))
        );
        assert_eq!(
            key_action(&key(KeyCode::Left), size),
            Some(PagerAction::Navigate(Command::PreviousPage))
        );
        assert_eq!(
            key_action(&key(KeyCode::Home), size),
            Some(PagerAction::Navigate(Command::FirstPage))
        );
        assert_eq!(
            key_action(&key(KeyCode::End), size),
            Some(PagerAction::Navigate(Command::LastPage))
        );
        assert_eq!(
            key_action(&key(KeyCode::Char('r')), size),
            Some(PagerAction::Navigate(Command::Reload))
        );
        assert_eq!(key_action(&key(KeyCode::Char('x')), size), None);
    }

    #[test]
    fn test_page_size_keys_cycle_options() {
        let size = PageSize::DEFAULT;
        assert_eq!(
            key_action(&key(KeyCode::Char('+')), size),
            Some(PagerAction::Navigate(Command::SetPageSize(size.next())))
        );
        assert_eq!(
            key_action(&key(KeyCode::Char('-')), size),
            Some(PagerAction::Navigate(Command::SetPageSize(size.previous())))
        );
    }

    #[test]
    fn test_quit_keys() {
        let size = PageSize::DEFAULT;
        assert_eq!(key_action(&key(KeyCode::Char('q')), size), Some(PagerAction::Quit));
        assert_eq!(key_action(&key(KeyCode::Esc), size), Some(PagerAction::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_action(&ctrl_c, size), Some(PagerAction::Quit));
    }

    #[test]
    fn test_status_line() {
        assert_eq!(status_line(true, Some((NoticeKind::Error, "boom"))), "⏳ Loading...");
        assert_eq!(status_line(false, Some((NoticeKind::Error, "boom"))), "❌ boom");
        assert_eq!(status_line(false, None), "");
    }

    #[test]
    fn test_fit_lines() {
        assert_eq!(fit_lines("a\nb", 5), vec!["a", "b"]);

        let fitted = fit_lines("1\n2\n3\n4\n5", 3);
        assert_eq!(fitted.len(), 3);
        assert_eq!(fitted[0], "1");
        assert!(fitted[2].starts_with("... 3 more lines"));
    }
}
