//! Test project fixtures
//!
//! Builds throwaway projects with a `layoutd.toml` and layout resources.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A project rooted in a temporary directory
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    /// Empty directory without configuration
    pub fn empty() -> Result<Self> {
        Ok(Self { dir: TempDir::new()? })
    }

    /// Project with the given `layoutd.toml` contents
    pub fn with_config(config: &str) -> Result<Self> {
        let project = Self::empty()?;
        project.write("layoutd.toml", config)?;
        Ok(project)
    }

    /// Two units, `app` depending on `lib`, generator running `command`
    pub fn app_and_lib(command: &str) -> Result<Self> {
        Self::with_config(&format!(
            r#"
[generator]
command = ["sh", "-c", "{command}"]

[[units]]
id = "lib"
root = "lib"
variant = "debug"

[[units]]
id = "app"
root = "app"
variant = "debug"
depends_on = ["lib"]
"#
        ))
    }

    /// Project root
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the root, creating parent directories
    pub fn write(&self, relative: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Write a layout file into a unit's default resource directory
    pub fn write_layout(&self, unit: &str, folder: &str, name: &str) -> Result<PathBuf> {
        self.write(
            &format!("{}/src/main/res/{}/{}", unit, folder, name),
            "<LinearLayout/>",
        )
    }

    /// Read a file relative to the root
    pub fn read(&self, relative: &str) -> Result<String> {
        Ok(fs::read_to_string(self.dir.path().join(relative))?)
    }
}
