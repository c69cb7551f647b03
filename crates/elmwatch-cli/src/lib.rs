//! elmwatch - a watch, rebuild and live-reload loop for Elm projects.
//!
//! Watches source files, runs the Elm compiler through the shell whenever one
//! changes, and serves the output directory with live reload and a history
//! API fallback for single-page applications.
//!
//! # Architecture
//!
//! - [`error`] - Error types with actionable messages
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Terminal output helpers
//! - [`config`] - Configuration loading (file, environment, flags)
//! - [`dev`] - Watcher, builder and dev server
//! - [`commands`] - CLI command implementations
//!
//! # Example
//!
//! ```no_run
//! use elmwatch_cli::config::ElmwatchConfig;
//! use elmwatch_cli::dev::{DevConfig, Session};
//!
//! # async fn run() -> elmwatch_cli::Result<()> {
//! let root = std::env::current_dir()?;
//! let config = DevConfig::new(ElmwatchConfig::default(), root)?;
//! let mut session = Session::start(&config)?;
//! while let Some(change) = session.next_change().await {
//!     session.handle_change(&change);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

// Re-export commonly used types
pub use error::{BuildError, CliError, ConfigError, Result, ResultExt};
