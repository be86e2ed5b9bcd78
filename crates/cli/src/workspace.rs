//! Loaded project: configuration, project model and generator models

use anyhow::{Context, Result};
use layoutd_core::{Project, ProjectConfig, ProjectContext, UnitId};
use layoutd_engine::{CommandGeneratorFactory, ModelRegistry};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::util;

/// A project loaded from its `layoutd.toml`
pub struct Workspace {
    root: PathBuf,
    config: RwLock<ProjectConfig>,
    project: Arc<Project>,
    registry: Arc<ModelRegistry>,
}

impl Workspace {
    /// Load the project rooted at `root`
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = util::config_path(root);
        let config = ProjectConfig::load(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;

        let project = Arc::new(Project::from_config(root, &config));
        let registry = Arc::new(ModelRegistry::new(Arc::new(CommandGeneratorFactory)));
        sync_registry(&registry, &project, &config);

        info!(
            root = %root.display(),
            units = config.units.len(),
            models = registry.len(),
            "Project loaded"
        );

        Ok(Self {
            root: root.to_path_buf(),
            config: RwLock::new(config),
            project,
            registry,
        })
    }

    /// Re-read the configuration and update the model in place
    ///
    /// Units dropped from the configuration become disposed and lose their
    /// generator model. On error the previous state is kept.
    pub fn reload(&self) -> Result<()> {
        let config_path = util::config_path(&self.root);
        let config = ProjectConfig::load(&config_path)
            .with_context(|| format!("Failed to reload {}", config_path.display()))?;

        self.project.reload(&config);
        sync_registry(&self.registry, &self.project, &config);
        info!(units = config.units.len(), "Configuration reloaded");

        *self.config.write() = config;
        Ok(())
    }

    /// Project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the config file
    pub fn config_path(&self) -> PathBuf {
        util::config_path(&self.root)
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> ProjectConfig {
        self.config.read().clone()
    }

    /// Project model
    pub fn project(&self) -> &Arc<Project> {
        &self.project
    }

    /// Generator models
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Resolve unit id arguments, defaulting to every live unit
    pub fn select_units(&self, ids: &[String]) -> Result<Vec<UnitId>> {
        if ids.is_empty() {
            return Ok(self.project.unit_ids());
        }

        ids.iter()
            .map(|id| {
                let unit = UnitId::from(id.as_str());
                if self.project.is_disposed(&unit) {
                    anyhow::bail!("Unknown unit: {}", id);
                }
                Ok(unit)
            })
            .collect()
    }
}

/// Bring the registry in line with `config`: one model per live unit with
/// the layout facet, none for anything else
fn sync_registry(registry: &ModelRegistry, project: &Project, config: &ProjectConfig) {
    for unit in registry.units() {
        if config.unit(&unit).is_none() {
            registry.delete(&unit);
            debug!(unit = %unit, "Removed generator model");
        }
    }

    for unit in &config.units {
        if !registry.put(project, &unit.id, config.generator_for(unit)) {
            registry.delete(&unit.id);
        }
    }
}
