//! Logging infrastructure for the elmwatch CLI.
//!
//! Structured logging via the `tracing` ecosystem. Compiler output never goes
//! through here; it is printed verbatim by the builder.
//!
//! # Example
//!
//! ```rust,no_run
//! use elmwatch_cli::logger::init_logger;
//! use tracing::{debug, info};
//!
//! init_logger(false, false, false);
//!
//! info!("Watching src/*.elm");
//! debug!(path = "src/Main.elm", "source changed");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "elmwatch=debug,elmwatch_cli=debug,tower_http=debug";
const QUIET_FILTER: &str = "elmwatch=error,elmwatch_cli=error";
const DEFAULT_FILTER: &str = "elmwatch=info,elmwatch_cli=info";

/// Initialize the tracing subscriber with the specified options.
///
/// Should be called once at the start of the program, before any logging occurs.
///
/// # Verbosity Levels
///
/// The logging level is determined in this order:
/// 1. `--verbose` flag: DEBUG for elmwatch and request tracing
/// 2. `--quiet` flag: ERROR only
/// 3. `RUST_LOG` environment variable: custom filter
/// 4. Default: INFO for elmwatch
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(select_filter(verbose, quiet), no_color);
}

/// Initialize logger with a custom environment filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .compact();

    // try_init: a second initialization (tests, embedding) is not fatal
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn select_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Check if colored output should be enabled.
///
/// - `NO_COLOR`: if set, disables colors
/// - `FORCE_COLOR`: if set, forces colors even in non-TTY
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::Term::stderr().features().colors_supported()
}
