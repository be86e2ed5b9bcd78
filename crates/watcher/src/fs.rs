//! Platform file watcher backed by `notify`
//!
//! Events are translated to [`RawEvent`]s on notify's callback thread and
//! delivered over a crossbeam channel. Consumers treat them as hints; an
//! [`WatchEvent::Overflow`] means events were lost and the roots must be
//! rescanned.

use crossbeam_channel as channel;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::event::RawEvent;

/// One delivery from the watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Translated events for one notify event
    Events(Vec<RawEvent>),
    /// The backend dropped events; a rescan is required
    Overflow,
}

/// Message delivered by [`FsWatcher`]; backend errors arrive on the same stream
pub type WatchMessage = notify::Result<WatchEvent>;

/// Recursive file watcher over a set of roots
pub struct FsWatcher {
    watcher: RecommendedWatcher,
    rx: channel::Receiver<WatchMessage>,
    roots: HashSet<PathBuf>,
}

impl FsWatcher {
    /// Create a watcher with no roots
    pub fn new() -> notify::Result<Self> {
        let (tx, rx) = channel::unbounded::<WatchMessage>();

        let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let message = res.map(|event| {
                if event.need_rescan() {
                    WatchEvent::Overflow
                } else {
                    WatchEvent::Events(RawEvent::from_notify(&event))
                }
            });

            match &message {
                Ok(WatchEvent::Events(events)) if events.is_empty() => return,
                Ok(WatchEvent::Events(events)) => trace!("Watcher delivered {} events", events.len()),
                Ok(WatchEvent::Overflow) => debug!("Watcher reported overflow"),
                Err(e) => debug!("Watcher error: {}", e),
            }

            // Receiver gone means the watcher is shutting down
            let _ = tx.send(message);
        })?;

        Ok(Self {
            watcher,
            rx,
            roots: HashSet::new(),
        })
    }

    /// Begin watching `root` recursively
    pub fn watch_root(&mut self, root: &Path) -> notify::Result<()> {
        if self.roots.contains(root) {
            return Ok(());
        }
        self.watcher.watch(root, RecursiveMode::Recursive)?;
        self.roots.insert(root.to_path_buf());
        debug!("Watching {}", root.display());
        Ok(())
    }

    /// Stop watching `root`
    pub fn unwatch_root(&mut self, root: &Path) -> notify::Result<()> {
        if !self.roots.remove(root) {
            return Ok(());
        }
        self.watcher.unwatch(root)
    }

    /// Roots currently watched, sorted
    pub fn roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<_> = self.roots.iter().cloned().collect();
        roots.sort();
        roots
    }

    /// Receiver for watcher messages
    pub fn receiver(&self) -> &channel::Receiver<WatchMessage> {
        &self.rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    #[test]
    fn test_watch_missing_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut watcher = FsWatcher::new().unwrap();

        assert!(watcher.watch_root(&temp_dir.path().join("missing")).is_err());
        assert!(watcher.roots().is_empty());
    }

    #[test]
    fn test_watch_and_unwatch_roots() {
        let temp_dir = TempDir::new().unwrap();
        let mut watcher = FsWatcher::new().unwrap();

        watcher.watch_root(temp_dir.path()).unwrap();
        watcher.watch_root(temp_dir.path()).unwrap();
        assert_eq!(watcher.roots(), vec![temp_dir.path().to_path_buf()]);

        watcher.unwatch_root(temp_dir.path()).unwrap();
        assert!(watcher.roots().is_empty());
    }

    #[test]
    fn test_file_write_is_delivered() {
        let temp_dir = TempDir::new().unwrap();
        // Canonical path so macOS /private/var prefixes match
        let root = temp_dir.path().canonicalize().unwrap();
        let mut watcher = FsWatcher::new().unwrap();
        watcher.watch_root(&root).unwrap();

        let file = root.join("main.xml");
        fs::write(&file, b"<View/>").unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut seen = false;
        while !seen && Instant::now() < deadline {
            match watcher.receiver().recv_timeout(Duration::from_millis(200)) {
                Ok(Ok(WatchEvent::Events(events))) => {
                    seen = events.iter().any(|e| e.path.as_deref() == Some(file.as_path()));
                }
                Ok(Ok(WatchEvent::Overflow)) => seen = true,
                _ => {}
            }
        }

        assert!(seen, "no event for {}", file.display());
    }
}
