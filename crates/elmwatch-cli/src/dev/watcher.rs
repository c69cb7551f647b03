//! File system watching for source and output globs.
//!
//! A [`WatchSet`] turns a list of globs into the directories that need a
//! notify watch plus a matcher deciding which reported paths count. The
//! [`FileWatcher`] forwards matching events into a tokio channel.
//!
//! notify never reports the files that already exist when a watch starts, so
//! the first event a receiver sees is always a real change.

use crate::error::{CliError, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// File was modified (content, metadata, or renamed)
    Modified(PathBuf),
    /// File was created
    Created(PathBuf),
    /// File was removed
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }

    /// Short lowercase label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FileChange::Modified(_) => "change",
            FileChange::Created(_) => "add",
            FileChange::Removed(_) => "unlink",
        }
    }

    fn from_event(kind: &EventKind, path: PathBuf) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(FileChange::Created(path)),
            EventKind::Modify(_) => Some(FileChange::Modified(path)),
            EventKind::Remove(_) => Some(FileChange::Removed(path)),
            _ => None,
        }
    }
}

/// A set of globs resolved against a project root.
///
/// Globs use gitignore syntax: `src/*.elm` is anchored at the root and `*`
/// does not cross directories, `**` does, and a pattern without a slash
/// (`*.elm`) matches at any depth. Paths with a hidden segment below the root
/// (`src/.foo.elm`, `.git/...`) never match.
#[derive(Debug, Clone)]
pub struct WatchSet {
    root: PathBuf,
    globs: Vec<String>,
    matcher: Gitignore,
}

impl WatchSet {
    /// Compile `globs` relative to `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if a glob cannot be parsed.
    pub fn new(root: &Path, globs: &[String]) -> Result<Self> {
        let mut builder = GitignoreBuilder::new(root);
        for glob in globs {
            builder
                .add_line(None, glob)
                .map_err(|e| CliError::InvalidArgument(format!("invalid glob '{}': {}", glob, e)))?;
        }
        let matcher = builder
            .build()
            .map_err(|e| CliError::InvalidArgument(format!("invalid globs: {}", e)))?;

        Ok(Self {
            root: root.to_path_buf(),
            globs: globs.to_vec(),
            matcher,
        })
    }

    /// Root the globs are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The globs as configured.
    pub fn globs(&self) -> &[String] {
        &self.globs
    }

    /// Check whether a reported path belongs to this set.
    pub fn matches(&self, path: &Path) -> bool {
        // Only paths within the root
        let Ok(rel_path) = path.strip_prefix(&self.root) else {
            return false;
        };

        if rel_path.as_os_str().is_empty() || is_hidden(rel_path) {
            return false;
        }

        self.matcher.matched(rel_path, false).is_ignore()
    }

    /// Directories that must be watched (recursively) to observe every glob.
    ///
    /// Uses the literal directory prefix of each glob; when that directory does
    /// not exist yet the root is watched instead, so the set still sees it
    /// being created.
    pub fn watch_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = Vec::new();

        for glob in &self.globs {
            if glob.starts_with('!') {
                continue;
            }
            let dir = self.root.join(literal_prefix(glob));
            let dir = if dir.is_dir() { dir } else { self.root.clone() };
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }

        // A watch on the root already covers everything below it
        if dirs.contains(&self.root) {
            return vec![self.root.clone()];
        }
        dirs
    }
}

/// Leading directory components of a glob that contain no wildcard.
///
/// `src/*.elm` -> `src`, `src/**/*.elm` -> `src`, `*.elm` -> ``,
/// `src/Main.elm` -> `src`.
fn literal_prefix(glob: &str) -> PathBuf {
    let trimmed = glob.trim_start_matches('/');
    let parts: Vec<&str> = trimmed.split('/').collect();
    // A glob without a slash matches at any depth
    if parts.len() < 2 {
        return PathBuf::new();
    }

    let mut prefix = PathBuf::new();
    for part in &parts[..parts.len() - 1] {
        if part.contains(['*', '?', '[', '{']) {
            break;
        }
        prefix.push(part);
    }
    prefix
}

/// True if any component of a root-relative path starts with a dot.
fn is_hidden(rel_path: &Path) -> bool {
    rel_path.components().any(|component| match component {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

/// Drops repeated modify notifications for one path inside a time window.
///
/// A single save usually produces several modify events. Creates and
/// removes are always admitted, as are modifies of different paths.
#[derive(Debug)]
pub(crate) struct Coalescer {
    window: Duration,
    last_modified: HashMap<PathBuf, Instant>,
}

impl Coalescer {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            window,
            last_modified: HashMap::new(),
        }
    }

    /// Decide whether `change`, observed at `now`, should be delivered.
    pub(crate) fn admit(&mut self, change: &FileChange, now: Instant) -> bool {
        if self.window.is_zero() {
            return true;
        }

        let FileChange::Modified(path) = change else {
            // A create or remove starts a new modify sequence for the path
            self.last_modified.remove(change.path());
            return true;
        };

        if let Some(last) = self.last_modified.get(path) {
            if now.duration_since(*last) < self.window {
                return false;
            }
        }

        let window = self.window;
        self.last_modified
            .retain(|_, seen| now.duration_since(*seen) < window);
        self.last_modified.insert(path.clone(), now);
        true
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.last_modified.len()
    }
}

/// File watcher filtered by a [`WatchSet`].
///
/// Watches the set's directories recursively and sends matching changes
/// through a channel. Repeated modify notifications for the *same path*
/// inside the coalescing window are dropped; creates, removes and changes to
/// different paths are always delivered.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    watch_set: WatchSet,
}

impl FileWatcher {
    /// Create a new file watcher.
    ///
    /// # Arguments
    ///
    /// * `watch_set` - Globs selecting the paths to report
    /// * `coalesce` - Window for dropping repeat modify events on one path (zero disables)
    ///
    /// # Returns
    ///
    /// Tuple of (FileWatcher, receiver for change events)
    ///
    /// # Errors
    ///
    /// Returns error if the root doesn't exist or a watch cannot be registered
    pub fn new(
        watch_set: WatchSet,
        coalesce: Duration,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        if !watch_set.root().exists() {
            return Err(CliError::FileNotFound(watch_set.root().to_path_buf()));
        }

        let (tx, rx) = mpsc::channel(100);

        let filter = watch_set.clone();
        let mut coalescer = Coalescer::new(coalesce);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("watch error: {}", e);
                    return;
                }
            };

            for path in event.paths {
                if !filter.matches(&path) {
                    continue;
                }

                let Some(change) = FileChange::from_event(&event.kind, path) else {
                    continue;
                };

                if !coalescer.admit(&change, Instant::now()) {
                    continue;
                }

                // Receiver gone means the session is shutting down
                if tx.blocking_send(change).is_err() {
                    return;
                }
            }
        })?;

        for dir in watch_set.watch_dirs() {
            tracing::debug!("watching {}", dir.display());
            watcher.watch(&dir, RecursiveMode::Recursive)?;
        }

        Ok((
            Self {
                _watcher: watcher,
                watch_set,
            },
            rx,
        ))
    }

    /// Get the root directory being watched.
    pub fn root(&self) -> &Path {
        self.watch_set.root()
    }

    /// Globs this watcher reports.
    pub fn globs(&self) -> &[String] {
        self.watch_set.globs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(globs: &[&str]) -> WatchSet {
        let globs: Vec<String> = globs.iter().map(|g| g.to_string()).collect();
        WatchSet::new(Path::new("/project"), &globs).unwrap()
    }

    #[test]
    fn test_matches_top_level_elm_sources() {
        let watch = set(&["src/*.elm"]);

        assert!(watch.matches(Path::new("/project/src/Main.elm")));
        assert!(watch.matches(Path::new("/project/src/Page.elm")));

        // `*` stays within one directory
        assert!(!watch.matches(Path::new("/project/src/Page/Home.elm")));
        assert!(!watch.matches(Path::new("/project/src/main.js")));
        assert!(!watch.matches(Path::new("/project/Main.elm")));
    }

    #[test]
    fn test_double_star_crosses_directories() {
        let watch = set(&["src/**/*.elm"]);

        assert!(watch.matches(Path::new("/project/src/Main.elm")));
        assert!(watch.matches(Path::new("/project/src/Page/Home.elm")));
    }

    #[test]
    fn test_hidden_paths_ignored() {
        let watch = set(&["src/*.elm", "**/*.elm"]);

        assert!(!watch.matches(Path::new("/project/src/.foo.elm")));
        assert!(!watch.matches(Path::new("/project/.git/x.elm")));
        assert!(!watch.matches(Path::new("/project/src/.cache/Main.elm")));
    }

    #[test]
    fn test_hidden_ancestor_above_root_is_fine() {
        let globs = vec!["src/*.elm".to_string()];
        let watch = WatchSet::new(Path::new("/home/dev/.projects/app"), &globs).unwrap();

        assert!(watch.matches(Path::new("/home/dev/.projects/app/src/Main.elm")));
    }

    #[test]
    fn test_outside_root_ignored() {
        let watch = set(&["**/*.elm"]);
        assert!(!watch.matches(Path::new("/other/src/Main.elm")));
        assert!(!watch.matches(Path::new("/project")));
    }

    #[test]
    fn test_output_glob() {
        let watch = set(&["public/*"]);

        assert!(watch.matches(Path::new("/project/public/main.js")));
        assert!(watch.matches(Path::new("/project/public/index.html")));
        assert!(!watch.matches(Path::new("/project/public/css/site.css")));
        assert!(!watch.matches(Path::new("/project/src/Main.elm")));
    }

    #[test]
    fn test_invalid_glob_rejected() {
        let globs = vec!["src/[.elm".to_string()];
        assert!(WatchSet::new(Path::new("/project"), &globs).is_err());
    }

    #[test]
    fn test_literal_prefix() {
        assert_eq!(literal_prefix("src/*.elm"), PathBuf::from("src"));
        assert_eq!(literal_prefix("src/**/*.elm"), PathBuf::from("src"));
        assert_eq!(literal_prefix("/src/Main.elm"), PathBuf::from("src"));
        assert_eq!(literal_prefix("a/b/*/c.elm"), PathBuf::from("a/b"));
        assert_eq!(literal_prefix("*.elm"), PathBuf::new());
    }

    #[test]
    fn test_watch_dirs_fall_back_to_root_when_missing() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("src")).unwrap();

        let globs = vec!["src/*.elm".to_string()];
        let watch = WatchSet::new(temp.path(), &globs).unwrap();
        assert_eq!(watch.watch_dirs(), vec![temp.path().join("src")]);

        let globs = vec!["src/*.elm".to_string(), "missing/*.elm".to_string()];
        let watch = WatchSet::new(temp.path(), &globs).unwrap();
        assert_eq!(watch.watch_dirs(), vec![temp.path().to_path_buf()]);
    }

    #[test]
    fn test_file_change_path_and_kind() {
        let path = PathBuf::from("/project/src/Main.elm");

        let change = FileChange::Modified(path.clone());
        assert_eq!(change.path(), path.as_path());
        assert_eq!(change.kind(), "change");

        assert_eq!(FileChange::Created(path.clone()).kind(), "add");
        assert_eq!(FileChange::Removed(path).kind(), "unlink");
    }

    #[test]
    fn test_access_events_are_not_changes() {
        use notify::event::{AccessKind, CreateKind};

        let path = PathBuf::from("/project/src/Main.elm");
        assert!(FileChange::from_event(&EventKind::Access(AccessKind::Any), path.clone()).is_none());
        assert_eq!(
            FileChange::from_event(&EventKind::Create(CreateKind::File), path.clone()),
            Some(FileChange::Created(path))
        );
    }

    #[test]
    fn test_coalescer_drops_repeat_modifies_only() {
        let path = PathBuf::from("/project/src/Main.elm");
        let mut coalescer = Coalescer::new(Duration::from_millis(50));
        let start = Instant::now();

        assert!(coalescer.admit(&FileChange::Modified(path.clone()), start));
        assert!(!coalescer.admit(
            &FileChange::Modified(path.clone()),
            start + Duration::from_millis(10)
        ));
        assert!(coalescer.admit(
            &FileChange::Modified(path.clone()),
            start + Duration::from_millis(60)
        ));
    }

    #[test]
    fn test_coalescer_always_admits_create_and_remove() {
        let path = PathBuf::from("/project/src/Page.elm");
        let mut coalescer = Coalescer::new(Duration::from_millis(50));
        let start = Instant::now();

        assert!(coalescer.admit(&FileChange::Created(path.clone()), start));
        assert!(coalescer.admit(
            &FileChange::Modified(path.clone()),
            start + Duration::from_millis(1)
        ));
        assert!(coalescer.admit(
            &FileChange::Removed(path.clone()),
            start + Duration::from_millis(10)
        ));
        assert!(coalescer.admit(
            &FileChange::Created(path.clone()),
            start + Duration::from_millis(11)
        ));
        // The create reset the window, so the next modify is a new save
        assert!(coalescer.admit(
            &FileChange::Modified(path),
            start + Duration::from_millis(12)
        ));
    }

    #[test]
    fn test_coalescer_modifies_of_different_paths() {
        let mut coalescer = Coalescer::new(Duration::from_millis(50));
        let now = Instant::now();

        assert!(coalescer.admit(&FileChange::Modified(PathBuf::from("/p/src/A.elm")), now));
        assert!(coalescer.admit(&FileChange::Modified(PathBuf::from("/p/src/B.elm")), now));
    }

    #[test]
    fn test_coalescer_prunes_expired_paths() {
        let mut coalescer = Coalescer::new(Duration::from_millis(50));
        let start = Instant::now();

        for i in 0..100 {
            let path = PathBuf::from(format!("/project/src/M{}.elm", i));
            assert!(coalescer.admit(&FileChange::Modified(path), start));
        }
        assert_eq!(coalescer.tracked(), 100);

        let later = start + Duration::from_millis(100);
        assert!(coalescer.admit(
            &FileChange::Modified(PathBuf::from("/project/src/Main.elm")),
            later
        ));
        assert_eq!(coalescer.tracked(), 1);
    }

    #[test]
    fn test_coalescer_zero_window_admits_everything() {
        let path = PathBuf::from("/project/src/Main.elm");
        let mut coalescer = Coalescer::new(Duration::ZERO);
        let now = Instant::now();

        assert!(coalescer.admit(&FileChange::Modified(path.clone()), now));
        assert!(coalescer.admit(&FileChange::Modified(path), now));
        assert_eq!(coalescer.tracked(), 0);
    }
}
