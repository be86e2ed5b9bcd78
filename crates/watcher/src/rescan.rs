//! Overflow recovery
//!
//! When the platform watcher drops events (queue overflow, `need_rescan`),
//! walk the watched roots and report every candidate file as modified. The
//! classifier and tracked-file predicate then narrow it down as usual, so
//! nothing that changed during the gap is lost.

use std::path::PathBuf;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::event::RawEvent;
use crate::ignore::IgnoreRules;

/// Walk `roots` and report every non-ignored file as modified
///
/// Unreadable entries are logged and skipped. Roots that do not exist
/// contribute nothing.
pub fn rescan_roots(roots: &[PathBuf], ignore: &IgnoreRules) -> Vec<RawEvent> {
    let mut events = Vec::new();

    for root in roots {
        if !root.exists() {
            debug!("Rescan root {} missing, skipping", root.display());
            continue;
        }

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !ignore.should_ignore(e.path()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Rescan skipped unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_file() {
                events.push(RawEvent::modified(entry.into_path()));
            }
        }
    }

    info!("Rescan of {} roots reported {} files", roots.len(), events.len());
    events
}
