//! One-shot full regeneration
//!
//! Every layout file of the selected units is fed through the regular
//! pipeline as changed, so dependents are regenerated too.

use anyhow::{Context, Result};
use layoutd_core::{NoRefresh, Project, TrackedFiles, UnitId};
use layoutd_engine::{resolve, ProjectSession};
use layoutd_watcher::{DebounceConfig, IgnoreConfig, IgnoreRules, LayoutFiles};
use owo_colors::OwoColorize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use walkdir::WalkDir;

use crate::util;
use crate::workspace::Workspace;

pub async fn run(unit_args: &[String]) -> Result<()> {
    let root = util::find_project_root()?;
    let workspace = Workspace::load(&root)?;
    let config = workspace.config();
    let units = workspace.select_units(unit_args)?;

    let ignore = IgnoreRules::load(&root, IgnoreConfig::from(&config.watch))
        .context("Failed to load ignore rules")?;
    let tracked = LayoutFiles::from_config(workspace.project().clone(), ignore, &config.watch);

    let files = collect_layouts(workspace.project(), &tracked, &units);
    if files.is_empty() {
        println!("{}", "No layout files found".yellow());
        return Ok(());
    }

    let affected = resolve(files.iter(), &**workspace.project());
    let mut affected: Vec<_> = affected.into_iter().collect();
    affected.sort();

    println!(
        "Generating {} layout files for {} units",
        files.len(),
        affected.len()
    );

    // An explicit compile always dispatches, even in a headless project
    let debounce = DebounceConfig {
        dispatch_enabled: true,
        ..DebounceConfig::from(&config.watch)
    };

    let start = Instant::now();
    let session = ProjectSession::attach(
        workspace.project().clone(),
        Arc::new(tracked),
        workspace.registry().clone(),
        Arc::new(NoRefresh),
        debounce,
    );
    session.enqueue(files, HashSet::new());
    session.flush();
    session.wait_idle().await;
    session.dispose();

    for unit in &affected {
        println!("  {} {}", "•".cyan(), unit);
    }
    println!(
        "{} in {:.2}s",
        "Done".green(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Every tracked layout file in the resource directories of `units`
fn collect_layouts(project: &Project, tracked: &LayoutFiles, units: &[UnitId]) -> HashSet<PathBuf> {
    let mut files = HashSet::new();

    for id in units {
        let Some(unit) = project.unit(id) else {
            continue;
        };
        for res_dir in &unit.res_dirs {
            for entry in WalkDir::new(res_dir)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if entry.file_type().is_file() && tracked.is_tracked(entry.path(), project) {
                    files.insert(entry.into_path());
                }
            }
        }
    }

    files
}
