//! Status message functions for terminal output.
//!
//! Status lines go to stderr so that stdout carries nothing but compiler output.

use super::{colors_enabled, is_quiet};
use owo_colors::OwoColorize;

/// Print a success message to stderr.
///
/// # Examples
///
/// ```no_run
/// use elmwatch_cli::ui::success;
///
/// success("Dev server listening on http://127.0.0.1:8001");
/// ```
pub fn success(message: &str) {
    if is_quiet() {
        return;
    }
    if colors_enabled() {
        eprintln!("{} {}", "✓".green().bold(), message);
    } else {
        eprintln!("✓ {}", message);
    }
}

/// Print an info message to stderr.
pub fn info(message: &str) {
    if is_quiet() {
        return;
    }
    if colors_enabled() {
        eprintln!("{} {}", "ℹ".blue().bold(), message);
    } else {
        eprintln!("ℹ {}", message);
    }
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    if is_quiet() {
        return;
    }
    if colors_enabled() {
        eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
    } else {
        eprintln!("⚠ {}", message);
    }
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    } else {
        eprintln!("✗ {}", message);
    }
}

/// Print a debug message to stderr (only if RUST_LOG is set).
pub fn debug(message: &str) {
    if is_quiet() || std::env::var("RUST_LOG").is_err() {
        return;
    }
    if colors_enabled() {
        eprintln!("{} {}", "◆".dimmed(), message.dimmed());
    } else {
        eprintln!("◆ {}", message);
    }
}
