//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use layoutd_core::CONFIG_FILE_NAME;
use std::path::{Path, PathBuf};

/// Name of the per-project state directory (locks, logs)
pub const STATE_DIR: &str = ".layoutd";

/// Find the project root by walking up from cwd to find layoutd.toml
pub fn find_project_root() -> Result<PathBuf> {
    let current = std::env::current_dir().context("Failed to get current directory")?;
    find_project_root_from(&current)
}

/// Find the project root by walking up from `start`
pub fn find_project_root_from(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(CONFIG_FILE_NAME).is_file() {
            return Ok(current);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => anyhow::bail!(
                "Not a layoutd project (no {} found). Run 'layoutd config path --create' to create one.",
                CONFIG_FILE_NAME
            ),
        }
    }
}

/// Path of the config file in `root`
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// State directory in `root`
pub fn state_dir(root: &Path) -> PathBuf {
    root.join(STATE_DIR)
}

/// Display `path` relative to `root` when possible
pub fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}
