//! Collaborator interfaces the pipeline consumes
//!
//! Everything the change pipeline knows about the host project, the code
//! generator and the editor goes through these traits. The project model may
//! change at any moment between two calls; implementations answer from their
//! current state and callers treat a missing answer as "nothing to do".

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::CompileError;
use crate::unit::{BuildVariant, UnitId};

/// Read-only view of the host project's units and dependency relation
pub trait ProjectContext: Send + Sync {
    /// Unit that owns `path`, if any
    fn find_owning_unit(&self, path: &Path) -> Option<UnitId>;

    /// Units depending on any of `units`
    ///
    /// May answer with direct dependents only or with the transitive set;
    /// the resolver expands to a fixpoint either way.
    fn reverse_dependents_of(&self, units: &HashSet<UnitId>) -> HashSet<UnitId>;

    /// Whether `unit` has been torn down (unknown units count as disposed)
    fn is_disposed(&self, unit: &UnitId) -> bool;

    /// Whether `unit` carries the layout-resource facet the generator needs
    fn has_layout_facet(&self, unit: &UnitId) -> bool;

    /// Currently selected build variant of `unit`, if one is selected
    fn build_variant(&self, unit: &UnitId) -> Option<BuildVariant>;
}

/// Predicate deciding whether a path is a user-authored layout file of a
/// unit the project manages
pub trait TrackedFiles: Send + Sync {
    /// Check if `path` should be tracked
    fn is_tracked(&self, path: &Path, project: &dyn ProjectContext) -> bool;
}

/// External incremental code generator
pub trait Generator: Send + Sync {
    /// Regenerate output for `changed` files and drop output for `removed` files
    fn compile_incremental(
        &self,
        changed: &[PathBuf],
        removed: &[PathBuf],
        output_dir: &Path,
    ) -> Result<(), CompileError>;
}

/// Fire-and-forget signal asking file-system-sync collaborators to refresh
pub trait RefreshSink: Send + Sync {
    /// Request an asynchronous refresh
    fn request_async_refresh(&self);
}

/// Refresh sink that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRefresh;

impl RefreshSink for NoRefresh {
    fn request_async_refresh(&self) {}
}

/// Refresh sink that only records the request in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRefresh;

impl RefreshSink for LogRefresh {
    fn request_async_refresh(&self) {
        tracing::info!("Generated sources updated, refresh requested");
    }
}
