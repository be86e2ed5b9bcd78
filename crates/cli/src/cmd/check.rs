//! Validate the configuration and show the unit graph

use anyhow::{Context, Result};
use layoutd_core::{BuildVariant, ProjectConfig, UnitConfig, UnitId};
use layoutd_watcher::{IgnoreConfig, IgnoreRules};
use owo_colors::OwoColorize;
use std::iter;
use std::path::PathBuf;

use crate::util;
use crate::workspace::Workspace;

pub fn run() -> Result<()> {
    let root = util::find_project_root()?;
    let workspace = Workspace::load(&root)?;
    let config = workspace.config();
    let graph = workspace.project().graph();

    println!("{} {}", "Configuration OK".green().bold(), workspace.config_path().display());
    println!();

    if config.units.is_empty() {
        println!("{}", "No units configured".yellow());
    }

    for unit in &config.units {
        let info = workspace.project().unit(&unit.id);
        let unit_root = info.as_ref().map(|u| u.root.clone()).unwrap_or_else(|| root.join(&unit.root));

        println!("{} {}", "•".cyan(), unit.id.bold());
        println!("  {}: {}", "root".dimmed(), util::display_relative(&unit_root, &root));
        println!(
            "  {}: {}",
            "layouts".dimmed(),
            if unit.layouts { "yes" } else { "no" }
        );
        println!(
            "  {}: {}",
            "variant".dimmed(),
            unit.variant.as_deref().unwrap_or("none")
        );

        match output_dir(&config, unit, unit_root) {
            Some(dir) => println!("  {}: {}", "output".dimmed(), util::display_relative(&dir, &root)),
            None => println!("  {}: {}", "output".dimmed(), "unresolved".yellow()),
        }

        if !unit.depends_on.is_empty() {
            println!("  {}: {}", "depends on".dimmed(), join(&unit.depends_on));
        }

        let mut dependents: Vec<_> = graph
            .reverse_closure(iter::once(&unit.id))
            .into_iter()
            .filter(|id| id != &unit.id)
            .collect();
        dependents.sort();
        if !dependents.is_empty() {
            println!("  {}: {}", "regenerates".dimmed(), join(&dependents));
        }
    }

    let ignore = IgnoreRules::load(&root, IgnoreConfig::from(&config.watch))
        .context("Failed to load ignore rules")?;

    println!();
    println!(
        "{} units, {} generator models, {} ignore sources",
        config.units.len(),
        workspace.registry().len(),
        ignore.active_sources()
    );
    if config.generator.command.is_empty() {
        println!("{}", "generator.command is empty, generation will fail".yellow());
    }

    Ok(())
}

/// Output directory of `unit` for the configured generator, if its variant is known
fn output_dir(config: &ProjectConfig, unit: &UnitConfig, unit_root: PathBuf) -> Option<PathBuf> {
    let variant = unit.variant.as_deref()?;
    let generator = config.generator_for(unit);
    Some(BuildVariant::new(unit_root.join(&unit.build_dir), variant).output_dir(&generator.name))
}

fn join(ids: &[UnitId]) -> String {
    ids.iter().map(UnitId::as_str).collect::<Vec<_>>().join(", ")
}
