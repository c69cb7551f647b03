//! Configuration for elmwatch with multi-source loading.
//!
//! Merges settings from CLI args, environment variables, and `elmwatch.json`.
//! Priority: CLI > Environment > File > Defaults
//!
//! With no file, no environment and no flags the defaults reproduce the classic
//! Elm watch script: compile `src/Main.elm` into `public/main.js` whenever a
//! file matching `src/*.elm` changes, and serve `public` on port 8001.

mod defaults;
mod loading;
mod tests;
mod validation;

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

pub use defaults::*;

/// elmwatch configuration - loaded from elmwatch.json, the environment, or CLI args.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ElmwatchConfig {
    /// Source globs that trigger a rebuild, relative to the project root
    #[serde(default = "default_watch")]
    pub watch: Vec<String>,

    /// Compiler command line, run through the platform shell
    #[serde(default = "default_command")]
    pub command: String,

    /// Directory served over HTTP
    #[serde(default = "default_server_root")]
    pub server_root: PathBuf,

    /// Globs whose changes push a reload to connected browsers
    #[serde(default = "default_reload_files")]
    pub reload_files: Vec<String>,

    /// Interface the dev server binds to
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Preferred dev server port (the next free port is used if it is busy)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Open the browser once the server is up
    #[serde(default)]
    pub open: bool,

    /// Show an in-page notification when the reload client connects or reloads
    #[serde(default)]
    pub notify: bool,

    /// Rewrite HTML navigations for unknown routes to the index document
    #[serde(default = "default_true")]
    pub history_fallback: bool,

    /// Clear the terminal before each rebuild
    #[serde(default = "default_true")]
    pub clear_screen: bool,
}

impl Default for ElmwatchConfig {
    fn default() -> Self {
        Self {
            watch: default_watch(),
            command: default_command(),
            server_root: default_server_root(),
            reload_files: default_reload_files(),
            host: default_host(),
            port: default_port(),
            open: false,
            notify: false,
            history_fallback: true,
            clear_screen: true,
        }
    }
}

/// Values supplied on the command line.
///
/// Only fields that were actually given are serialized, so merging this
/// provider overrides exactly the settings the user passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear_screen: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_fallback: Option<bool>,
}

impl ElmwatchConfig {
    /// Pretty JSON for the resolved configuration (used by `elmwatch check`).
    pub fn to_pretty_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
