//! Miette diagnostic conversion for CLI errors.

use crate::error::{BuildError, CliError};
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Build(e) => build_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        CliError::Watch(e) => miette::miette!(
            "File watcher error: {}\n\nHint: Check that the watched directories exist and the OS watch limit is not exhausted",
            e
        ),
        _ => miette::miette!("{}", err),
    }
}

/// Convert BuildError to miette Report
pub fn build_error_to_miette(err: BuildError) -> Report {
    match err {
        BuildError::SpawnFailed { command, source } => {
            miette::miette!(
                "Failed to start build command: {}\nCause: {}\n\nHint: Check that a shell is available and the working directory exists",
                command,
                source
            )
        }
        _ => miette::miette!("{}", err),
    }
}
