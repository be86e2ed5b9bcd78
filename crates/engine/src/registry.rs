//! Registry of per-unit generator models

use dashmap::DashMap;
use layoutd_core::{GeneratorConfig, ProjectContext, UnitId};
use std::sync::Arc;
use tracing::debug;

use crate::model::{GeneratorFactory, UnitModel};

/// Concurrent map from unit to its generator model
///
/// Lookups are cheap and lock-free for readers; the scheduler fetches the
/// model fresh for every compile, so a `put` or `delete` takes effect on the
/// next request for that unit.
pub struct ModelRegistry {
    models: DashMap<UnitId, Arc<UnitModel>>,
    factory: Arc<dyn GeneratorFactory>,
}

impl ModelRegistry {
    /// Create an empty registry building generators with `factory`
    pub fn new(factory: Arc<dyn GeneratorFactory>) -> Self {
        Self {
            models: DashMap::new(),
            factory,
        }
    }

    /// Model for `unit`, if registered
    pub fn get(&self, unit: &UnitId) -> Option<Arc<UnitModel>> {
        self.models.get(unit).map(|entry| entry.value().clone())
    }

    /// Register or replace the model for `unit`
    ///
    /// Returns false and registers nothing when the unit lacks the layout
    /// facet.
    pub fn put(&self, project: &dyn ProjectContext, unit: &UnitId, config: GeneratorConfig) -> bool {
        if !project.has_layout_facet(unit) {
            debug!(unit = %unit, "Unit has no layout facet, not registering model");
            return false;
        }

        let generator = self.factory.create(unit, &config);
        let model = UnitModel::new(unit.clone(), config, generator);
        self.models.insert(unit.clone(), Arc::new(model));
        debug!(unit = %unit, "Registered generator model");
        true
    }

    /// Remove the model for `unit`
    pub fn delete(&self, unit: &UnitId) -> bool {
        self.models.remove(unit).is_some()
    }

    /// Registered unit ids, sorted
    pub fn units(&self) -> Vec<UnitId> {
        let mut units: Vec<_> = self.models.iter().map(|e| e.key().clone()).collect();
        units.sort();
        units
    }

    /// Number of registered models
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check if no models are registered
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
