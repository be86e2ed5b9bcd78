//! Project configuration (`layoutd.toml`)
//!
//! Describes the units of the project, how to watch them and which
//! generator to run. Paths are relative to the directory holding the file.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::unit::UnitId;

/// Name of the configuration file at the project root
pub const CONFIG_FILE_NAME: &str = "layoutd.toml";

/// Valid range for the quiet period, in milliseconds
pub const DEBOUNCE_RANGE_MS: std::ops::RangeInclusive<u64> = 10..=60_000;

/// Complete project configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Watch and debounce settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// Default generator settings
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Build units
    #[serde(default)]
    pub units: Vec<UnitConfig>,
}

/// Watch settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Quiet period after the last relevant event (default: 300ms)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Dispatch batches to the generator (false = headless, nothing runs)
    #[serde(default = "default_true")]
    pub dispatch: bool,

    /// Layout file extensions (default: xml)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Use .gitignore patterns (default: true)
    #[serde(default = "default_true")]
    pub use_gitignore: bool,

    /// Use .layoutdignore patterns (default: true)
    #[serde(default = "default_true")]
    pub use_layoutdignore: bool,

    /// Additional ignore patterns
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Rescan unit roots when the watcher reports lost events (default: true)
    #[serde(default = "default_true")]
    pub rescan_on_overflow: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            dispatch: true,
            extensions: default_extensions(),
            use_gitignore: true,
            use_layoutdignore: true,
            ignore_patterns: vec![],
            rescan_on_overflow: true,
        }
    }
}

/// Generator invocation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Generator name, also the output directory segment (default: holdr)
    #[serde(default = "default_generator_name")]
    pub name: String,

    /// Program and arguments to run
    #[serde(default)]
    pub command: Vec<String>,

    /// Package generated classes are placed in
    #[serde(default)]
    pub package: Option<String>,

    /// Free-form options passed through to the generator
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            name: default_generator_name(),
            command: vec![],
            package: None,
            options: BTreeMap::new(),
        }
    }
}

/// One build unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConfig {
    /// Unit identifier
    pub id: UnitId,

    /// Unit root directory
    pub root: PathBuf,

    /// Resource directories, relative to the unit root
    #[serde(default = "default_res_dirs")]
    pub res_dirs: Vec<PathBuf>,

    /// Units this unit depends on
    #[serde(default)]
    pub depends_on: Vec<UnitId>,

    /// Build folder, relative to the unit root (default: build)
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    /// Selected build variant; without one the output directory is unresolvable
    #[serde(default)]
    pub variant: Option<String>,

    /// Whether the unit carries layout resources (default: true)
    #[serde(default = "default_true")]
    pub layouts: bool,

    /// Package override for this unit
    #[serde(default)]
    pub package: Option<String>,

    /// Option overrides for this unit
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl ProjectConfig {
    /// Load and validate configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::parse(&contents).map_err(|e| match e {
            Error::InvalidConfig(message) => Error::Config {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), units = config.units.len(), "Loaded project config");
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Validate value ranges and unit references
    pub fn validate(&self) -> Result<()> {
        if !DEBOUNCE_RANGE_MS.contains(&self.watch.debounce_ms) {
            return Err(Error::InvalidConfig(format!(
                "watch.debounce_ms must be between {} and {} (got {})",
                DEBOUNCE_RANGE_MS.start(),
                DEBOUNCE_RANGE_MS.end(),
                self.watch.debounce_ms
            )));
        }

        if self.watch.extensions.is_empty() {
            return Err(Error::InvalidConfig(
                "watch.extensions must list at least one extension".to_string(),
            ));
        }

        if self.generator.name.trim().is_empty() {
            return Err(Error::InvalidConfig("generator.name must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for unit in &self.units {
            if unit.id.as_str().trim().is_empty() {
                return Err(Error::InvalidConfig("unit id must not be empty".to_string()));
            }
            if !seen.insert(unit.id.clone()) {
                return Err(Error::DuplicateUnit(unit.id.clone()));
            }
        }

        for unit in &self.units {
            for dependency in &unit.depends_on {
                if !seen.contains(dependency) {
                    return Err(Error::UnknownDependency {
                        unit: unit.id.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Look up a unit by id
    pub fn unit(&self, id: &UnitId) -> Option<&UnitConfig> {
        self.units.iter().find(|u| &u.id == id)
    }

    /// Effective generator settings for a unit
    pub fn generator_for(&self, unit: &UnitConfig) -> GeneratorConfig {
        let mut config = self.generator.clone();
        if unit.package.is_some() {
            config.package = unit.package.clone();
        }
        config
            .options
            .extend(unit.options.iter().map(|(k, v)| (k.clone(), v.clone())));
        config
    }
}

/// Example configuration with every setting spelled out
pub fn example_config() -> &'static str {
    r#"# layoutd project configuration

[watch]
# Quiet period after the last layout change before generation runs (10-60000)
debounce_ms = 300
# Set to false to watch without running the generator
dispatch = true
extensions = ["xml"]
use_gitignore = true
use_layoutdignore = true
ignore_patterns = []
rescan_on_overflow = true

[generator]
name = "holdr"
command = ["holdr-gen", "--incremental"]
package = "com.example.holdr"

[[units]]
id = "lib"
root = "lib"
variant = "debug"

[[units]]
id = "app"
root = "app"
res_dirs = ["src/main/res"]
depends_on = ["lib"]
build_dir = "build"
variant = "debug"
"#
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_extensions() -> Vec<String> {
    vec!["xml".to_string()]
}

fn default_generator_name() -> String {
    "holdr".to_string()
}

fn default_res_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("src/main/res")]
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_true() -> bool {
    true
}
