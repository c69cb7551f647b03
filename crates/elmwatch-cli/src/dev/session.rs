//! Watch-and-rebuild session.
//!
//! Pairs a [`FileWatcher`] on the source globs with a [`Builder`]. Starting a
//! session issues the initial build; every source change afterwards clears
//! the terminal (if enabled) and issues exactly one more build.

use crate::dev::{Builder, DevConfig, FileChange, FileWatcher};
use crate::error::Result;
use crate::ui;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Duplicate notifications for one source file within this window are one change.
pub const SOURCE_COALESCE: Duration = Duration::from_millis(50);

/// A running watch-and-rebuild session.
pub struct Session {
    builder: Builder,
    watcher: FileWatcher,
    changes: mpsc::Receiver<FileChange>,
    clear_screen: bool,
}

impl Session {
    /// Start watching and run the initial build.
    ///
    /// Must be called within a tokio runtime. The initial build runs in the
    /// background; this returns as soon as it has been issued.
    ///
    /// # Errors
    ///
    /// Returns error if the command is empty or the source watcher cannot be
    /// created
    pub fn start(config: &DevConfig) -> Result<Self> {
        let builder = Builder::new(config.base.command.clone(), config.root.clone())?;
        let (watcher, changes) = FileWatcher::new(config.source_watch_set()?, SOURCE_COALESCE)?;

        tracing::debug!(command = %builder.command(), "initial build");
        builder.spawn();

        Ok(Self {
            builder,
            watcher,
            changes,
            clear_screen: config.base.clear_screen,
        })
    }

    /// The builder shared by every rebuild.
    pub fn builder(&self) -> &Builder {
        &self.builder
    }

    /// Globs being watched.
    pub fn globs(&self) -> &[String] {
        self.watcher.globs()
    }

    /// Wait for the next source change.
    ///
    /// Returns `None` once the watcher has shut down.
    pub async fn next_change(&mut self) -> Option<FileChange> {
        self.changes.recv().await
    }

    /// React to a source change: clear the terminal and rebuild.
    pub fn handle_change(&self, change: &FileChange) -> JoinHandle<()> {
        if self.clear_screen {
            ui::clear_screen();
        }

        ui::info(&format!(
            "{} {}",
            change.kind(),
            display_path(self.watcher.root(), change.path())
        ));

        self.builder.spawn()
    }
}

fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}
