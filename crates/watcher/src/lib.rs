//! File system watching for layoutd
//!
//! This crate turns raw file-system events into debounced change batches:
//! - Raw event model and translation from `notify`
//! - Classification into changed/deleted tracked files (renames ignored)
//! - Quiet-period debouncing with last-state-wins merging
//! - Layout-file predicate with .gitignore/.layoutdignore support
//! - Overflow recovery by rescanning watched roots

pub mod classify;
pub mod debounce;
pub mod event;
pub mod fs;
pub mod ignore;
pub mod layout;
pub mod rescan;

pub use classify::{classify, Classified};
pub use debounce::{DebounceConfig, Debouncer};
pub use event::{RawEvent, RawEventKind, METADATA_PROPERTY, NAME_PROPERTY};
pub use fs::{FsWatcher, WatchEvent, WatchMessage};
pub use ignore::{IgnoreConfig, IgnoreRules, IGNORE_FILE_NAME};
pub use layout::LayoutFiles;
pub use rescan::rescan_roots;
