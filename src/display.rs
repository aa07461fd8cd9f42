//! Colored CLI display utilities for supervisor output.
//!
//! Operator-facing output: the child's stdout passthrough, discovered
//! status messages, and diagnostic echo. Kept separate from `tracing`,
//! which goes to stderr with its own filtering.

use std::io::{self, Write};

use chrono::Utc;
use owo_colors::OwoColorize;

use crate::protocol::StatusUpdate;

/// Get current timestamp in the same format as tracing.
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Maximum length for truncated display strings.
const DEFAULT_MAX_LEN: usize = 200;

/// Truncate a string to a maximum length, adding ellipsis if truncated.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return "...".to_string();
    }
    let mut end = max_len - 3;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// Print one line of the child's stdout, verbatim.
pub fn print_passthrough(line: &str) {
    println!("{line}");
    let _ = io::stdout().flush();
}

/// Print a discovered status message.
pub fn print_status(update: &StatusUpdate) {
    let body = serde_json::to_string(update).unwrap_or_else(|_| update.status.clone());
    println!(
        "{} {} {}",
        timestamp().dimmed(),
        "[STATUS]".magenta().bold(),
        truncate(&body, DEFAULT_MAX_LEN)
    );
    let _ = io::stdout().flush();
}

/// Echo a diagnostic chunk from the child's stderr (dimmed, verbatim).
pub fn print_diagnostic(text: &str) {
    eprint!("{}", text.dimmed());
    let _ = io::stderr().flush();
}

/// Print an error message.
pub fn print_error(message: &str) {
    println!("{} {}", "[ERROR]".red().bold(), message);
    let _ = io::stdout().flush();
}
