//! Change classification
//!
//! Turns a sequence of raw events into the set of tracked files whose
//! content changed and the set that was deleted. In-place renames (the
//! `name` property) are left to refactoring support and never count as
//! content changes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::event::{RawEvent, RawEventKind, NAME_PROPERTY};

/// Result of classifying one sequence of events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    /// Tracked files whose content changed or that were created
    pub changed: HashSet<PathBuf>,
    /// Tracked files that were deleted
    pub deleted: HashSet<PathBuf>,
}

impl Classified {
    /// Check if nothing relevant happened
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.deleted.is_empty()
    }
}

/// Classify raw events against a tracked-file predicate
///
/// - `name` property changes are ignored
/// - events without a path are ignored
/// - untracked paths are ignored
/// - a path both changed and deleted in one call is reported deleted only
pub fn classify<F>(events: &[RawEvent], is_tracked: F) -> Classified
where
    F: Fn(&Path) -> bool,
{
    let mut classified = Classified::default();

    for event in events {
        if let RawEventKind::PropertyChanged { name } = &event.kind {
            if name == NAME_PROPERTY {
                continue;
            }
        }

        let Some(path) = event.path.as_ref() else {
            continue;
        };

        if !is_tracked(path) {
            continue;
        }

        match event.kind {
            RawEventKind::Deleted => {
                classified.deleted.insert(path.clone());
            }
            _ => {
                classified.changed.insert(path.clone());
            }
        }
    }

    let deleted = &classified.deleted;
    classified.changed.retain(|path| !deleted.contains(path));
    classified
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layouts_only(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "xml")
    }

    fn set(items: &[&str]) -> HashSet<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_changed_and_deleted() {
        let events = vec![
            RawEvent::modified("/proj/mod/layout_a.xml"),
            RawEvent::created("/proj/mod/layout_c.xml"),
            RawEvent::deleted("/proj/mod/layout_b.xml"),
        ];

        let classified = classify(&events, layouts_only);

        assert_eq!(classified.changed, set(&["/proj/mod/layout_a.xml", "/proj/mod/layout_c.xml"]));
        assert_eq!(classified.deleted, set(&["/proj/mod/layout_b.xml"]));
    }

    #[test]
    fn test_rename_only_event_ignored() {
        let events = vec![RawEvent::renamed("/proj/mod/layout_a.xml")];
        assert!(classify(&events, layouts_only).is_empty());
    }

    #[test]
    fn test_other_property_change_counts_as_change() {
        let events = vec![RawEvent::property_changed("/proj/mod/layout_a.xml", "writable")];
        assert_eq!(classify(&events, layouts_only).changed, set(&["/proj/mod/layout_a.xml"]));
    }

    #[test]
    fn test_pathless_and_untracked_ignored() {
        let events = vec![
            RawEvent {
                path: None,
                kind: RawEventKind::Modified,
            },
            RawEvent::modified("/proj/mod/Main.java"),
            RawEvent::deleted("/proj/mod/notes.txt"),
        ];
        assert!(classify(&events, layouts_only).is_empty());
    }

    #[test]
    fn test_changed_and_deleted_same_call_is_deleted() {
        let events = vec![
            RawEvent::modified("/proj/mod/layout_a.xml"),
            RawEvent::deleted("/proj/mod/layout_a.xml"),
            RawEvent::created("/proj/mod/layout_a.xml"),
        ];

        let classified = classify(&events, layouts_only);

        assert!(classified.changed.is_empty());
        assert_eq!(classified.deleted, set(&["/proj/mod/layout_a.xml"]));
    }

    #[test]
    fn test_atomic_save_over_layout_is_a_change() {
        use notify::event::{EventKind, ModifyKind, RenameMode};

        let save = notify::Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/proj/mod/res/layout/.main.xml.tmp"))
            .add_path(PathBuf::from("/proj/mod/res/layout/main.xml"));
        let moved_out = notify::Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::From)))
            .add_path(PathBuf::from("/proj/mod/res/layout/row.xml"));

        let mut events = RawEvent::from_notify(&save);
        events.extend(RawEvent::from_notify(&moved_out));
        let classified = classify(&events, layouts_only);

        assert_eq!(classified.changed, set(&["/proj/mod/res/layout/main.xml"]));
        assert_eq!(classified.deleted, set(&["/proj/mod/res/layout/row.xml"]));
    }
}
