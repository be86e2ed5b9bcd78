//! Config-backed project model
//!
//! [`Project`] answers the [`ProjectContext`] queries from a
//! [`ProjectConfig`]. The model can be swapped at runtime (config reload) or
//! have units torn down; readers always see one consistent snapshot.

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::config::ProjectConfig;
use crate::graph::DependencyGraph;
use crate::traits::ProjectContext;
use crate::unit::{BuildVariant, UnitId};

/// Resolved state of one unit
#[derive(Debug, Clone)]
pub struct UnitInfo {
    /// Unit identifier
    pub id: UnitId,
    /// Absolute unit root
    pub root: PathBuf,
    /// Absolute resource directories
    pub res_dirs: Vec<PathBuf>,
    /// Absolute build folder
    pub build_dir: PathBuf,
    /// Selected variant
    pub variant: Option<String>,
    /// Layout facet present
    pub layouts: bool,
    /// Torn down (removed from config or disposed explicitly)
    pub disposed: bool,
}

impl UnitInfo {
    /// Check if `path` lies inside one of the unit's resource directories
    pub fn owns_resource(&self, path: &Path) -> bool {
        self.res_dirs.iter().any(|dir| path.starts_with(dir))
    }
}

#[derive(Debug, Default)]
struct ProjectState {
    units: HashMap<UnitId, UnitInfo>,
    graph: DependencyGraph,
}

/// Host project model
pub struct Project {
    /// Project root directory
    root: PathBuf,
    state: RwLock<ProjectState>,
}

impl Project {
    /// Build a project model from configuration
    ///
    /// Relative paths in the configuration are resolved against `root`.
    pub fn from_config(root: &Path, config: &ProjectConfig) -> Self {
        let project = Self {
            root: root.to_path_buf(),
            state: RwLock::new(ProjectState::default()),
        };
        project.reload(config);
        project
    }

    /// Replace the model with a new configuration
    ///
    /// Units absent from `config` stay known but are marked disposed, so
    /// late events for their files resolve and are then dropped.
    pub fn reload(&self, config: &ProjectConfig) {
        let mut next = ProjectState::default();

        for unit in &config.units {
            let root = self.root.join(&unit.root);
            let info = UnitInfo {
                id: unit.id.clone(),
                res_dirs: unit.res_dirs.iter().map(|d| root.join(d)).collect(),
                build_dir: root.join(&unit.build_dir),
                variant: unit.variant.clone(),
                layouts: unit.layouts,
                disposed: false,
                root,
            };
            next.graph.add_unit(unit.id.clone());
            for dependency in &unit.depends_on {
                next.graph.add_dependency(unit.id.clone(), dependency.clone());
            }
            next.units.insert(unit.id.clone(), info);
        }

        let mut state = self.state.write();
        for (id, old) in state.units.drain() {
            if !next.units.contains_key(&id) {
                tracing::debug!(unit = %id, "Unit removed from config, marking disposed");
                next.units.insert(id, UnitInfo { disposed: true, ..old });
            }
        }
        *state = next;
    }

    /// Mark a unit as torn down
    pub fn dispose_unit(&self, unit: &UnitId) -> bool {
        match self.state.write().units.get_mut(unit) {
            Some(info) => {
                info.disposed = true;
                true
            }
            None => false,
        }
    }

    /// Project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Snapshot of a unit
    pub fn unit(&self, unit: &UnitId) -> Option<UnitInfo> {
        self.state.read().units.get(unit).cloned()
    }

    /// Ids of all live units, sorted
    pub fn unit_ids(&self) -> Vec<UnitId> {
        let state = self.state.read();
        let mut ids: Vec<_> = state
            .units
            .values()
            .filter(|u| !u.disposed)
            .map(|u| u.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Snapshot of the dependency graph
    pub fn graph(&self) -> DependencyGraph {
        self.state.read().graph.clone()
    }
}

impl ProjectContext for Project {
    fn find_owning_unit(&self, path: &Path) -> Option<UnitId> {
        let state = self.state.read();
        state
            .units
            .values()
            .filter(|u| path.starts_with(&u.root))
            .max_by_key(|u| u.root.components().count())
            .map(|u| u.id.clone())
    }

    fn reverse_dependents_of(&self, units: &HashSet<UnitId>) -> HashSet<UnitId> {
        let state = self.state.read();
        units
            .iter()
            .flat_map(|unit| state.graph.dependents_of(unit))
            .collect()
    }

    fn is_disposed(&self, unit: &UnitId) -> bool {
        self.state
            .read()
            .units
            .get(unit)
            .map_or(true, |u| u.disposed)
    }

    fn has_layout_facet(&self, unit: &UnitId) -> bool {
        self.state.read().units.get(unit).is_some_and(|u| u.layouts)
    }

    fn build_variant(&self, unit: &UnitId) -> Option<BuildVariant> {
        let state = self.state.read();
        let info = state.units.get(unit)?;
        let name = info.variant.as_ref()?;
        Some(BuildVariant::new(&info.build_dir, name))
    }
}
