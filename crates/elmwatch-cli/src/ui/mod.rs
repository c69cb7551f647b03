//! Terminal UI utilities.
//!
//! Status messages, the screen clear issued before each rebuild, and
//! environment detection (CI, color support).
//!
//! # Examples
//!
//! ```no_run
//! use elmwatch_cli::ui;
//!
//! ui::init_colors(false);
//! ui::info("Watching src/*.elm");
//! ui::clear_screen();
//! ```

mod format;
mod messages;

pub use format::{compiler_output, format_duration};
pub use messages::{debug, error, info, success, warning};

use console::Term;
use std::sync::atomic::{AtomicBool, Ordering};

static COLORS_ENABLED: AtomicBool = AtomicBool::new(true);
static QUIET: AtomicBool = AtomicBool::new(false);

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
}

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR environment variables, falls back to
/// terminal capability detection.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended_stderr()
}

/// Initialize color support based on environment and the `--no-color` flag.
///
/// Should be called early in `main`. Status messages check the result via
/// [`colors_enabled`].
pub fn init_colors(no_color: bool) {
    COLORS_ENABLED.store(!no_color && should_use_color(), Ordering::Relaxed);
}

/// Whether status messages should be colored.
pub fn colors_enabled() -> bool {
    COLORS_ENABLED.load(Ordering::Relaxed)
}

/// Suppress every status message except errors (`--quiet`).
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

/// Whether non-error status messages are suppressed.
pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Clear the terminal before a rebuild.
///
/// Writes the clear sequence to stdout, where the compiler output that follows
/// is printed. Skipped when stdout is not a terminal or when running in CI,
/// so the escape sequence never ends up in captured output.
pub fn clear_screen() {
    let term = Term::stdout();
    if !term.is_term() || is_ci() {
        return;
    }
    if let Err(e) = term.clear_screen() {
        tracing::debug!("failed to clear terminal: {}", e);
    }
}
