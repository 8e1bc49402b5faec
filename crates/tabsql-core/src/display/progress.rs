//! Spinners and one-line status output for long-running operations

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_INTERVAL: Duration = Duration::from_millis(80);

/// Terminal spinner drawn on stderr from a background thread.
pub struct ProgressSpinner {
    message: String,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    enabled: bool,
}

impl ProgressSpinner {
    pub fn new(message: String) -> Self {
        Self {
            message,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
            enabled: atty::is(atty::Stream::Stderr),
        }
    }

    /// Never animate; `stop` still prints its final message.
    pub fn quiet(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn start(&mut self) {
        if !self.enabled || self.handle.is_some() {
            return;
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let message = self.message.clone();

        self.handle = Some(thread::spawn(move || {
            let mut frame = 0;
            while running.load(Ordering::SeqCst) {
                let mut stderr = io::stderr();
                let _ = write!(stderr, "\r{} {}", FRAMES[frame % FRAMES.len()], message);
                let _ = stderr.flush();
                frame += 1;
                thread::sleep(FRAME_INTERVAL);
            }
        }));
    }

    pub fn stop(&mut self, final_message: Option<&str>) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            let clear = " ".repeat(self.message.chars().count() + 2);
            eprint!("\r{}\r", clear);
        }
        if let Some(msg) = final_message {
            eprintln!("{}", msg);
        }
    }
}

impl Drop for ProgressSpinner {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop(None);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    Success,
    Warning,
    Error,
    Info,
}

impl OperationStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            OperationStatus::Success => "✅",
            OperationStatus::Warning => "⚠️",
            OperationStatus::Error => "❌",
            OperationStatus::Info => "ℹ️",
        }
    }
}

pub fn format_status(message: &str, status: OperationStatus) -> String {
    format!("{} {}", status.icon(), message)
}

/// Print a status line; errors and warnings go to stderr.
pub fn display_status(message: &str, status: OperationStatus) {
    let line = format_status(message, status);
    match status {
        OperationStatus::Error | OperationStatus::Warning => eprintln!("{}", line),
        OperationStatus::Success | OperationStatus::Info => println!("{}", line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_status() {
        assert_eq!(
            format_status("Table 'sales' created from sales.csv", OperationStatus::Success),
            "✅ Table 'sales' created from sales.csv"
        );
        assert!(format_status("boom", OperationStatus::Error).starts_with("❌"));
    }

    #[test]
    fn test_quiet_spinner_start_stop() {
        let mut spinner = ProgressSpinner::new("Loading...".to_string()).quiet();
        spinner.start();
        assert!(spinner.handle.is_none());
        spinner.stop(None);
    }
}
