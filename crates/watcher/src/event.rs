//! Raw file-system events as delivered by an event source

use notify::event::{EventKind, ModifyKind, RenameMode};
use std::path::PathBuf;

/// Name of the property carried by rename events
pub const NAME_PROPERTY: &str = "name";

/// Name of the property carried by metadata-only events
pub const METADATA_PROPERTY: &str = "metadata";

/// One raw event from the event source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// File the event is about, if the source could resolve one
    pub path: Option<PathBuf>,
    /// What happened
    pub kind: RawEventKind,
}

/// Type of raw event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEventKind {
    /// File created
    Created,
    /// File content changed
    Modified,
    /// File deleted
    Deleted,
    /// A file property changed (`name` for renames)
    PropertyChanged { name: String },
}

impl RawEvent {
    /// Create a new event
    pub fn new(path: impl Into<PathBuf>, kind: RawEventKind) -> Self {
        Self {
            path: Some(path.into()),
            kind,
        }
    }

    /// Content-changed event
    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self::new(path, RawEventKind::Modified)
    }

    /// Creation event
    pub fn created(path: impl Into<PathBuf>) -> Self {
        Self::new(path, RawEventKind::Created)
    }

    /// Deletion event
    pub fn deleted(path: impl Into<PathBuf>) -> Self {
        Self::new(path, RawEventKind::Deleted)
    }

    /// Rename (name property change) event
    pub fn renamed(path: impl Into<PathBuf>) -> Self {
        Self::property_changed(path, NAME_PROPERTY)
    }

    /// Property change event
    pub fn property_changed(path: impl Into<PathBuf>, name: &str) -> Self {
        Self::new(
            path,
            RawEventKind::PropertyChanged {
                name: name.to_string(),
            },
        )
    }

    /// Translate a notify event into raw events, one per path
    ///
    /// Access events carry no change and are dropped. An event without
    /// paths yields a single path-less event.
    ///
    /// A rename with a known side is a change of content at that path: the
    /// source side is deleted and the target side created, which covers
    /// atomic saves that rename a temp file over a layout. Only renames of
    /// unknown direction are reported as a `name` property change.
    pub fn from_notify(event: &notify::Event) -> Vec<RawEvent> {
        let kind = match event.kind {
            EventKind::Access(_) => return Vec::new(),
            EventKind::Create(_) => RawEventKind::Created,
            EventKind::Remove(_) => RawEventKind::Deleted,
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => RawEventKind::Created,
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => RawEventKind::Deleted,
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                return Self::from_rename_pair(&event.paths);
            }
            EventKind::Modify(ModifyKind::Name(_)) => RawEventKind::PropertyChanged {
                name: NAME_PROPERTY.to_string(),
            },
            EventKind::Modify(ModifyKind::Metadata(_)) => RawEventKind::PropertyChanged {
                name: METADATA_PROPERTY.to_string(),
            },
            EventKind::Modify(_) | EventKind::Any | EventKind::Other => RawEventKind::Modified,
        };

        if event.paths.is_empty() {
            return vec![RawEvent { path: None, kind }];
        }

        event
            .paths
            .iter()
            .map(|path| RawEvent {
                path: Some(path.clone()),
                kind: kind.clone(),
            })
            .collect()
    }

    /// `[from, to]` of a paired rename: old path deleted, new path created
    fn from_rename_pair(paths: &[PathBuf]) -> Vec<RawEvent> {
        match paths {
            [] => vec![RawEvent {
                path: None,
                kind: RawEventKind::PropertyChanged {
                    name: NAME_PROPERTY.to_string(),
                },
            }],
            [from, rest @ ..] => std::iter::once(RawEvent::deleted(from.clone()))
                .chain(rest.iter().map(|to| RawEvent::created(to.clone())))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, RemoveKind, RenameMode};

    fn notify_event(kind: EventKind, paths: &[&str]) -> notify::Event {
        let mut event = notify::Event::new(kind);
        for path in paths {
            event = event.add_path(PathBuf::from(path));
        }
        event
    }

    #[test]
    fn test_from_notify_kinds() {
        let create = notify_event(EventKind::Create(CreateKind::File), &["/p/a.xml"]);
        assert_eq!(RawEvent::from_notify(&create), vec![RawEvent::created("/p/a.xml")]);

        let write = notify_event(EventKind::Modify(ModifyKind::Data(DataChange::Content)), &["/p/a.xml"]);
        assert_eq!(RawEvent::from_notify(&write), vec![RawEvent::modified("/p/a.xml")]);

        let remove = notify_event(EventKind::Remove(RemoveKind::File), &["/p/a.xml"]);
        assert_eq!(RawEvent::from_notify(&remove), vec![RawEvent::deleted("/p/a.xml")]);
    }

    #[test]
    fn test_from_notify_paired_rename_deletes_old_creates_new() {
        let rename = notify_event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/p/old.xml", "/p/new.xml"],
        );
        assert_eq!(
            RawEvent::from_notify(&rename),
            vec![RawEvent::deleted("/p/old.xml"), RawEvent::created("/p/new.xml")]
        );
    }

    #[test]
    fn test_from_notify_rename_sides() {
        // Atomic save: temp file renamed over the layout
        let to = notify_event(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            &["/p/res/layout/main.xml"],
        );
        assert_eq!(
            RawEvent::from_notify(&to),
            vec![RawEvent::created("/p/res/layout/main.xml")]
        );

        let from = notify_event(
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            &["/p/res/layout/main.xml"],
        );
        assert_eq!(
            RawEvent::from_notify(&from),
            vec![RawEvent::deleted("/p/res/layout/main.xml")]
        );
    }

    #[test]
    fn test_from_notify_rename_of_unknown_direction_is_name_property() {
        let rename = notify_event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Any)),
            &["/p/a.xml"],
        );
        assert_eq!(RawEvent::from_notify(&rename), vec![RawEvent::renamed("/p/a.xml")]);
    }

    #[test]
    fn test_from_notify_access_dropped() {
        let access = notify_event(EventKind::Access(AccessKind::Any), &["/p/a.xml"]);
        assert!(RawEvent::from_notify(&access).is_empty());
    }

    #[test]
    fn test_from_notify_without_paths() {
        let event = notify_event(EventKind::Any, &[]);
        let raw = RawEvent::from_notify(&event);
        assert_eq!(raw.len(), 1);
        assert!(raw[0].path.is_none());
    }
}
