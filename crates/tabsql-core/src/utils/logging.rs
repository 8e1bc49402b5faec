//! User-facing verbose output.
//!
//! Diagnostics go through the `log` facade. These lines are for `-v` users
//! and go to stderr, so piped `--format json|csv` output stays clean.

pub fn verbose_line(msg: &str) -> String {
    format!("Verbose: {}", msg)
}

pub fn print_verbose(verbose: bool, msg: &str) {
    log::trace!("{}", msg);
    if verbose {
        eprintln!("{}", verbose_line(msg));
    }
}
