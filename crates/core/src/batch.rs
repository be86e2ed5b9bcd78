//! Change batches: the sets of changed and deleted files that flow through
//! the pipeline

use std::collections::HashSet;
use std::path::PathBuf;

/// A set of changed and deleted files
///
/// A path is never in both sets. Used for the debounce window (see
/// [`ChangeBatch::merge`]) and for per-unit invalidation requests (see
/// [`ChangeBatch::absorb`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeBatch {
    changed: HashSet<PathBuf>,
    deleted: HashSet<PathBuf>,
}

impl ChangeBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a batch from already classified sets
    ///
    /// A path present in both sets is kept as deleted only.
    pub fn from_sets(changed: HashSet<PathBuf>, deleted: HashSet<PathBuf>) -> Self {
        let mut batch = Self::new();
        batch.merge(changed, deleted);
        batch
    }

    /// Merge newly observed state into the batch (last state wins)
    ///
    /// Paths in `changed` are applied first, then `deleted`, so a path
    /// reported in both by the same call ends up deleted. Across calls the
    /// later observation wins: a change after a deletion revives the path.
    pub fn merge(
        &mut self,
        changed: impl IntoIterator<Item = PathBuf>,
        deleted: impl IntoIterator<Item = PathBuf>,
    ) {
        for path in changed {
            self.deleted.remove(&path);
            self.changed.insert(path);
        }
        for path in deleted {
            self.changed.remove(&path);
            self.deleted.insert(path);
        }
    }

    /// Fold another request's delta into this one (deletion dominates)
    ///
    /// `changed = (changed ∪ other.changed) \ deleted`, `deleted = deleted ∪ other.deleted`.
    pub fn absorb(&mut self, other: ChangeBatch) {
        self.deleted.extend(other.deleted);
        self.changed.extend(other.changed);
        let deleted = &self.deleted;
        self.changed.retain(|path| !deleted.contains(path));
    }

    /// Files whose content changed (or that were created)
    pub fn changed(&self) -> &HashSet<PathBuf> {
        &self.changed
    }

    /// Files that were deleted
    pub fn deleted(&self) -> &HashSet<PathBuf> {
        &self.deleted
    }

    /// Iterate over every path in the batch
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.changed.iter().chain(self.deleted.iter())
    }

    /// Total number of paths
    pub fn len(&self) -> usize {
        self.changed.len() + self.deleted.len()
    }

    /// Check if the batch holds no paths
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.deleted.is_empty()
    }

    /// Split into `(changed, deleted)`
    pub fn into_parts(self) -> (HashSet<PathBuf>, HashSet<PathBuf>) {
        (self.changed, self.deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(items: &[&str]) -> HashSet<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_merge_coalesces_duplicates() {
        let mut batch = ChangeBatch::new();
        batch.merge(paths(&["/p/a.xml"]), paths(&[]));
        batch.merge(paths(&["/p/a.xml"]), paths(&[]));

        assert_eq!(batch.len(), 1);
        assert!(batch.changed().contains(&PathBuf::from("/p/a.xml")));
    }

    #[test]
    fn test_merge_last_state_wins() {
        let mut batch = ChangeBatch::new();
        batch.merge(paths(&["/p/a.xml", "/p/b.xml"]), paths(&[]));
        batch.merge(paths(&[]), paths(&["/p/a.xml"]));
        batch.merge(paths(&["/p/b.xml"]), paths(&[]));

        assert_eq!(batch.changed(), &paths(&["/p/b.xml"]));
        assert_eq!(batch.deleted(), &paths(&["/p/a.xml"]));

        // Recreated after deletion
        batch.merge(paths(&["/p/a.xml"]), paths(&[]));
        assert_eq!(batch.changed(), &paths(&["/p/a.xml", "/p/b.xml"]));
        assert!(batch.deleted().is_empty());
    }

    #[test]
    fn test_same_call_delete_wins() {
        let batch = ChangeBatch::from_sets(paths(&["/p/a.xml"]), paths(&["/p/a.xml"]));
        assert!(batch.changed().is_empty());
        assert_eq!(batch.deleted(), &paths(&["/p/a.xml"]));
    }

    #[test]
    fn test_absorb_deletion_dominates() {
        let mut active = ChangeBatch::from_sets(paths(&["/p/a.xml", "/p/b.xml"]), paths(&["/p/c.xml"]));
        let incoming = ChangeBatch::from_sets(paths(&["/p/c.xml", "/p/d.xml"]), paths(&["/p/b.xml"]));

        active.absorb(incoming);

        assert_eq!(active.changed(), &paths(&["/p/a.xml", "/p/d.xml"]));
        assert_eq!(active.deleted(), &paths(&["/p/b.xml", "/p/c.xml"]));
    }
}
