//! Tracked-file predicate for user-authored layout resources

use layoutd_core::{Project, ProjectContext, TrackedFiles, WatchConfig};
use std::path::Path;
use std::sync::Arc;

use crate::ignore::IgnoreRules;

/// Name of the resource folder holding layouts (`layout` or `layout-<qualifier>`)
const LAYOUT_FOLDER: &str = "layout";

/// Decides which paths are layout files the generator consumes
///
/// A path is tracked when:
/// - its extension is one of the configured extensions
/// - its parent folder is `layout` or `layout-<qualifier>`
/// - it lies inside a resource directory of its owning unit
/// - no ignore rule excludes it
///
/// Only the path is inspected, so deleted files classify the same way as
/// existing ones.
pub struct LayoutFiles {
    project: Arc<Project>,
    ignore: IgnoreRules,
    extensions: Vec<String>,
}

impl LayoutFiles {
    /// Create a predicate over `project`'s resource directories
    pub fn new(project: Arc<Project>, ignore: IgnoreRules, extensions: Vec<String>) -> Self {
        Self {
            project,
            ignore,
            extensions,
        }
    }

    /// Create a predicate from the `[watch]` configuration
    pub fn from_config(project: Arc<Project>, ignore: IgnoreRules, config: &WatchConfig) -> Self {
        Self::new(project, ignore, config.extensions.clone())
    }

    /// Check the parts of the rule that need no project lookup
    pub fn is_layout_path(&self, path: &Path) -> bool {
        let has_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed == ext));
        if !has_extension {
            return false;
        }

        path.parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .is_some_and(is_layout_folder)
    }

    /// Ignore rules applied by this predicate
    pub fn ignore_rules(&self) -> &IgnoreRules {
        &self.ignore
    }
}

impl TrackedFiles for LayoutFiles {
    fn is_tracked(&self, path: &Path, project: &dyn ProjectContext) -> bool {
        if !self.is_layout_path(path) {
            return false;
        }

        let Some(owner) = project.find_owning_unit(path) else {
            return false;
        };
        let in_resources = self
            .project
            .unit(&owner)
            .is_some_and(|unit| unit.owns_resource(path));
        if !in_resources {
            return false;
        }

        !self.ignore.should_ignore(path)
    }
}

fn is_layout_folder(name: &str) -> bool {
    match name.strip_prefix(LAYOUT_FOLDER) {
        Some("") => true,
        Some(qualifier) => qualifier.len() > 1 && qualifier.starts_with('-'),
        None => false,
    }
}
