//! Development mode: watch, rebuild, serve.
//!
//! Provides the three pieces the `elmwatch` command wires together:
//! - [`FileWatcher`] over a [`WatchSet`] of source globs
//! - [`Builder`] running the compiler as a fire-and-forget subprocess
//! - [`DevServer`] serving the output directory with live reload via Server-Sent Events
//!
//! The server is coupled to the watcher/builder pair only through the
//! filesystem: it runs its own watcher over the output globs.

pub mod builder;
pub mod config;
pub mod fallback;
pub mod server;
pub mod session;
pub mod state;
pub mod watcher;

// Re-exports
pub use builder::{BuildOutcome, Builder};
pub use config::DevConfig;
pub use server::{BoundServer, DevServer};
pub use session::Session;
pub use state::{DevServerState, SharedState};
pub use watcher::{FileChange, FileWatcher, WatchSet};

use serde::{Deserialize, Serialize};

/// Events pushed to live-reload clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DevEvent {
    /// Sent to a client right after it connects
    Connected { id: usize },

    /// A served file changed; `path` is relative to the server root
    Reload { path: String },
}

impl DevEvent {
    /// Serialize for an SSE `data:` line.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
