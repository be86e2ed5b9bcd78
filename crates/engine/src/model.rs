//! Per-unit generator model
//!
//! A [`UnitModel`] binds one unit to its generator settings and generator
//! instance, and knows how to turn a change delta into one incremental
//! generator call.

use layoutd_core::{CompileError, Generator, GeneratorConfig, ProjectContext, UnitId};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Result of a compile attempt that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileOutcome {
    /// The generator ran
    Compiled,
    /// The output directory could not be resolved; nothing was run
    Skipped,
}

/// Builds a generator for a unit from its effective settings
pub trait GeneratorFactory: Send + Sync {
    /// Create the generator `unit` will use
    fn create(&self, unit: &UnitId, config: &GeneratorConfig) -> Arc<dyn Generator>;
}

/// Generator model for one unit
pub struct UnitModel {
    unit: UnitId,
    config: GeneratorConfig,
    generator: Arc<dyn Generator>,
}

impl UnitModel {
    /// Create a model
    pub fn new(unit: UnitId, config: GeneratorConfig, generator: Arc<dyn Generator>) -> Self {
        Self {
            unit,
            config,
            generator,
        }
    }

    /// Unit this model belongs to
    pub fn unit(&self) -> &UnitId {
        &self.unit
    }

    /// Effective generator settings
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Output directory for the unit's current build variant
    pub fn output_dir(&self, project: &dyn ProjectContext) -> Option<PathBuf> {
        project
            .build_variant(&self.unit)
            .map(|variant| variant.output_dir(&self.config.name))
    }

    /// Run one incremental generation for `changed` and `deleted`
    ///
    /// Without a selected build variant there is nowhere to write output,
    /// which is reported as [`CompileOutcome::Skipped`] rather than an error.
    /// Paths are passed to the generator sorted.
    pub fn compile(
        &self,
        project: &dyn ProjectContext,
        changed: &HashSet<PathBuf>,
        deleted: &HashSet<PathBuf>,
    ) -> Result<CompileOutcome, CompileError> {
        let Some(output_dir) = self.output_dir(project) else {
            debug!(unit = %self.unit, "No build variant selected, skipping generation");
            return Ok(CompileOutcome::Skipped);
        };

        let changed = sorted(changed);
        let removed = sorted(deleted);

        debug!(
            unit = %self.unit,
            changed = changed.len(),
            removed = removed.len(),
            output = %output_dir.display(),
            "Running incremental generation"
        );
        self.generator
            .compile_incremental(&changed, &removed, &output_dir)?;
        Ok(CompileOutcome::Compiled)
    }
}

fn sorted(paths: &HashSet<PathBuf>) -> Vec<PathBuf> {
    let mut paths: Vec<_> = paths.iter().cloned().collect();
    paths.sort();
    paths
}
