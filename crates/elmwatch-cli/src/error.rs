//! Error handling for the elmwatch CLI.
//!
//! This module provides a hierarchical error type system using `thiserror`.
//! Each variant is meant to be actionable: configuration problems carry a hint,
//! process and watcher failures carry the underlying cause.
//!
//! Compiler failures are *not* errors at this level. A failed compile is an
//! expected outcome of a rebuild and is reported by printing the compiler's
//! stderr; only failures of elmwatch itself surface as [`CliError`].
//!
//! # Example
//!
//! ```rust,no_run
//! use elmwatch_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_config(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_path(path)
//!         .with_hint("Create an elmwatch.json file or pass --config <path>")
//! }
//! ```

pub mod miette;

use std::path::PathBuf;
use thiserror::Error;

pub use self::miette::cli_error_to_miette;

/// Top-level CLI error type.
///
/// Returned by every command. Domain-specific errors convert into it via `From`.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (file not found, invalid values, etc.)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The compiler process could not be started
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Development server errors
    #[error("Server error: {0}")]
    Server(String),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file doesn't exist at the expected location
    #[error("Config file not found: {}\n\nHint: Create an elmwatch.json file or specify --config <path>", .0.display())]
    NotFound(PathBuf),

    /// Missing required configuration field
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField {
        /// Name of the missing field
        field: String,
        /// Helpful hint for providing the field
        hint: String,
    },

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },

    /// I/O error while reading config
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors starting the compiler process.
///
/// A compiler that runs and reports errors is a normal build outcome; these
/// variants cover the cases where no compiler run happened at all.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The configured command is empty or whitespace
    #[error("Build command is empty\n\nHint: Set 'command' in elmwatch.json, e.g. \"elm-make src/Main.elm --output=public/main.js --yes\"")]
    EmptyCommand,

    /// The shell could not be spawned
    #[error("Failed to start `{command}`: {source}\n\nHint: Check that a shell is available and the working directory exists")]
    SpawnFailed {
        /// The command line that was being run
        command: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Add a file path to the error context.
    ///
    /// `NotFound` I/O errors become [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Add a helpful hint to the error context.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Convert to a custom error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            match err {
                CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    CliError::FileNotFound(path.as_ref().to_path_buf())
                }
                other => other,
            }
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}
