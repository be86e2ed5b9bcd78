//! Dependency resolution
//!
//! Maps a batch of changed files to every unit that must be regenerated:
//! the units owning the files plus everything that transitively depends on
//! them. The project model is consulted fresh on every call.

use layoutd_core::{ProjectContext, UnitId};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, trace};

/// Resolve `files` to the set of units needing regeneration
///
/// Files without an owning unit, or owned by a disposed unit or one without
/// the layout facet, contribute nothing. Dependents are expanded to a
/// fixpoint, so the provider may answer with direct or transitive
/// dependents. Disposed dependents are dropped from the result but still
/// expanded through, so live units behind them are reached. Cycles
/// terminate.
pub fn resolve<'a, I>(files: I, project: &dyn ProjectContext) -> HashSet<UnitId>
where
    I: IntoIterator<Item = &'a PathBuf>,
{
    let mut owners = HashSet::new();

    for file in files {
        let Some(unit) = project.find_owning_unit(file) else {
            debug!("No unit owns {}, dropping", file.display());
            continue;
        };
        if project.is_disposed(&unit) {
            debug!(unit = %unit, "Owning unit disposed, dropping {}", file.display());
            continue;
        }
        if !project.has_layout_facet(&unit) {
            trace!(unit = %unit, "Unit has no layout facet, dropping {}", file.display());
            continue;
        }
        owners.insert(unit);
    }

    if owners.is_empty() {
        return owners;
    }

    // Expansion walks through disposed units so the answer does not depend
    // on whether the provider reports direct or transitive dependents
    let mut reached = owners.clone();
    let mut frontier = owners;

    while !frontier.is_empty() {
        let next: HashSet<UnitId> = project
            .reverse_dependents_of(&frontier)
            .into_iter()
            .filter(|unit| !reached.contains(unit))
            .collect();

        reached.extend(next.iter().cloned());
        frontier = next;
    }

    let resolved: HashSet<UnitId> = reached
        .into_iter()
        .filter(|unit| {
            let live = !project.is_disposed(unit);
            if !live {
                debug!(unit = %unit, "Dependent unit disposed, skipping");
            }
            live
        })
        .collect();

    trace!("Resolved {} units", resolved.len());
    resolved
}
