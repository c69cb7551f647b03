//! Command implementations for the elmwatch CLI.
//!
//! - [`dev`] - Watch, rebuild and serve with live reload
//! - [`check`] - Configuration validation
//!
//! Each command provides an `execute` function that takes the parsed command
//! arguments and returns a Result.

pub mod check;
pub mod dev;

// Re-export execute functions for convenience
pub use check::execute as check_execute;
pub use dev::execute as dev_execute;
