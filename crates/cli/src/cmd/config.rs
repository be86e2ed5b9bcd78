//! Configuration management command
//!
//! View and edit the project's `layoutd.toml`.

use anyhow::{Context, Result};
use layoutd_core::config::{example_config, DEBOUNCE_RANGE_MS};
use layoutd_core::ProjectConfig;
use owo_colors::OwoColorize;
use std::path::PathBuf;

use crate::util;

fn load() -> Result<(PathBuf, ProjectConfig)> {
    let root = util::find_project_root()?;
    let path = util::config_path(&root);
    let config = ProjectConfig::load(&path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    Ok((path, config))
}

/// List all configuration values
pub fn run_list() -> Result<()> {
    let (path, config) = load()?;

    println!("{}", "Project Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), path.display().dimmed());

    println!("{}", "[watch]".yellow());
    println!(
        "  {} = {} {}",
        "debounce_ms".cyan(),
        config.watch.debounce_ms,
        format!("({}ms quiet period)", config.watch.debounce_ms).dimmed()
    );
    println!(
        "  {} = {} {}",
        "dispatch".cyan(),
        config.watch.dispatch,
        if config.watch.dispatch {
            "".to_string()
        } else {
            "(headless, generator never runs)".dimmed().to_string()
        }
    );
    println!("  {} = {:?}", "extensions".cyan(), config.watch.extensions);
    println!("  {} = {}", "use_gitignore".cyan(), config.watch.use_gitignore);
    println!("  {} = {}", "use_layoutdignore".cyan(), config.watch.use_layoutdignore);
    println!("  {} = {:?}", "ignore_patterns".cyan(), config.watch.ignore_patterns);
    println!("  {} = {}", "rescan_on_overflow".cyan(), config.watch.rescan_on_overflow);

    println!("\n{}", "[generator]".yellow());
    println!("  {} = {}", "name".cyan(), config.generator.name);
    println!("  {} = {:?}", "command".cyan(), config.generator.command);
    println!(
        "  {} = {}",
        "package".cyan(),
        config.generator.package.as_deref().unwrap_or("(unset)")
    );

    println!("\n{} {}", "[[units]]".yellow(), format!("({})", config.units.len()).dimmed());
    for unit in &config.units {
        println!(
            "  {} {} {}",
            unit.id.cyan(),
            unit.root.display(),
            unit.variant
                .as_deref()
                .map(|v| format!("[{}]", v))
                .unwrap_or_else(|| "[no variant]".to_string())
                .dimmed()
        );
    }

    println!("\n{}", "Valid Ranges:".bold());
    println!(
        "  debounce_ms: {}-{}",
        DEBOUNCE_RANGE_MS.start(),
        DEBOUNCE_RANGE_MS.end()
    );
    println!("  extensions: at least one");

    Ok(())
}

/// Get a single configuration value
pub fn run_get(key: &str) -> Result<()> {
    let (_, config) = load()?;
    println!("{}", get_value(&config, key)?);
    Ok(())
}

/// Set a configuration value
pub fn run_set(key: &str, value: &str) -> Result<()> {
    let (path, mut config) = load()?;

    set_value(&mut config, key, value)?;

    // Validate before saving
    config.validate().context("Invalid configuration value")?;
    config
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("{} {} = {}", "✓".green(), key.cyan(), value);
    if key.starts_with("watch.") {
        println!(
            "{}",
            "Note: Restart 'layoutd watch' for [watch] changes to take effect".yellow()
        );
    }

    Ok(())
}

/// Show the config file path and optionally create it
pub fn run_path(create: bool) -> Result<()> {
    let root = match util::find_project_root() {
        Ok(root) => root,
        Err(_) => std::env::current_dir().context("Failed to get current directory")?,
    };
    let config_path = util::config_path(&root);

    if create && !config_path.exists() {
        std::fs::write(&config_path, example_config())
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else if config_path.exists() {
        println!("{}", config_path.display());
    } else {
        println!("{}", config_path.display());
        println!("{}", "File does not exist. Use --create to create it.".yellow());
    }

    Ok(())
}

/// Show example configuration
pub fn run_example() -> Result<()> {
    println!("{}", example_config());
    Ok(())
}

fn get_value(config: &ProjectConfig, key: &str) -> Result<String> {
    let value = match key {
        "watch.debounce_ms" => config.watch.debounce_ms.to_string(),
        "watch.dispatch" => config.watch.dispatch.to_string(),
        "watch.extensions" => config.watch.extensions.join(","),
        "watch.use_gitignore" => config.watch.use_gitignore.to_string(),
        "watch.use_layoutdignore" => config.watch.use_layoutdignore.to_string(),
        "watch.rescan_on_overflow" => config.watch.rescan_on_overflow.to_string(),
        "generator.name" => config.generator.name.clone(),
        "generator.command" => config.generator.command.join(" "),
        "generator.package" => config.generator.package.clone().unwrap_or_default(),
        _ => anyhow::bail!(
            "Unknown config key: {}. Use 'layoutd config list' to see available keys.",
            key
        ),
    };
    Ok(value)
}

fn set_value(config: &mut ProjectConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "watch.debounce_ms" => {
            config.watch.debounce_ms = value
                .parse()
                .context("Invalid value: must be a positive integer")?;
        }
        "watch.dispatch" => config.watch.dispatch = parse_bool(value)?,
        "watch.extensions" => {
            config.watch.extensions = value
                .split(',')
                .map(|ext| ext.trim().trim_start_matches('.').to_string())
                .filter(|ext| !ext.is_empty())
                .collect();
        }
        "watch.use_gitignore" => config.watch.use_gitignore = parse_bool(value)?,
        "watch.use_layoutdignore" => config.watch.use_layoutdignore = parse_bool(value)?,
        "watch.rescan_on_overflow" => config.watch.rescan_on_overflow = parse_bool(value)?,
        "generator.name" => config.generator.name = value.to_string(),
        "generator.command" => {
            config.generator.command = value.split_whitespace().map(str::to_string).collect();
        }
        "generator.package" => {
            config.generator.package = (!value.is_empty()).then(|| value.to_string());
        }
        _ => anyhow::bail!(
            "Unknown config key: {}. Use 'layoutd config list' to see available keys.",
            key
        ),
    }
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool> {
    value
        .parse()
        .context("Invalid value: must be 'true' or 'false'")
}
