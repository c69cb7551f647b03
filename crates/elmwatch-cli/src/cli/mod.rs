//! Command-line interface definition for elmwatch.
//!
//! # Command Structure
//!
//! - `elmwatch [OPTIONS]` - Same as `elmwatch dev [OPTIONS]`
//! - `elmwatch dev` - Watch sources, rebuild, and serve with live reload
//! - `elmwatch check` - Validate configuration and print the resolved settings

mod commands;
mod validation;

use clap::Parser;

pub use commands::{CheckArgs, Command, DevArgs};
pub use validation::parse_host;

/// elmwatch - rebuild Elm on save and serve the result with live reload
#[derive(Parser, Debug)]
#[command(
    name = "elmwatch",
    version,
    args_conflicts_with_subcommands = true,
    about = "Rebuild Elm on save and serve the result with live reload",
    long_about = "elmwatch watches your Elm sources, runs the Elm compiler whenever one changes,\n\
                  and serves the output directory with live reload and a history API fallback\n\
                  for single-page applications."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors and compiler output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Dev options used when no subcommand is given
    #[command(flatten)]
    pub dev: DevArgs,

    /// Subcommand to execute (defaults to `dev`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The command to run, with `dev` as the default.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Dev(self.dev))
    }
}
