use clap::{Args, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::cli::validation::parse_host;

/// Available elmwatch subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Watch sources, rebuild on change, and serve with live reload
    ///
    /// Runs the compiler once, then again every time a watched source file
    /// changes. The output directory is served over HTTP and connected
    /// browsers reload when served files change.
    Dev(DevArgs),

    /// Validate configuration
    ///
    /// Loads elmwatch.json, environment overrides and flags, validates the
    /// result and prints the resolved configuration.
    Check(CheckArgs),
}

/// Arguments for the dev command
#[derive(Args, Debug, Default, Clone)]
pub struct DevArgs {
    /// Path to the configuration file (defaults to elmwatch.json in the project root)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project root; globs, the command and the server root are resolved against it
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Port for the dev server
    ///
    /// The next available port is used if this one is busy.
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Interface to bind the dev server to
    #[arg(long, value_name = "IP", value_parser = parse_host)]
    pub host: Option<IpAddr>,

    /// Open the browser once the server is running
    #[arg(long)]
    pub open: bool,

    /// Keep previous output instead of clearing the terminal before each rebuild
    #[arg(long)]
    pub no_clear: bool,

    /// Disable the history API fallback to index.html
    #[arg(long)]
    pub no_fallback: bool,
}

/// Arguments for the check command
#[derive(Args, Debug, Default, Clone)]
pub struct CheckArgs {
    /// Path to the configuration file (defaults to elmwatch.json in the project root)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project root
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

impl From<CheckArgs> for DevArgs {
    fn from(args: CheckArgs) -> Self {
        Self {
            config: args.config,
            cwd: args.cwd,
            ..Self::default()
        }
    }
}
