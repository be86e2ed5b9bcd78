//! Build unit identity and build-variant state

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Identifier of a build unit (a compilable module of the host project)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    /// Create a new unit id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UnitId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Build configuration currently selected for a unit
///
/// Mirrors what the host build system exposes: a build folder and the name
/// of the selected variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildVariant {
    /// Build folder of the unit
    pub build_dir: PathBuf,
    /// Selected variant name (e.g. `debug`)
    pub name: String,
}

impl BuildVariant {
    /// Create a new build variant
    pub fn new(build_dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            build_dir: build_dir.into(),
            name: name.into(),
        }
    }

    /// Directory the named generator writes into for this variant
    ///
    /// Layout: `<build_dir>/generated/source/<generator>/<variant>`
    pub fn output_dir(&self, generator: &str) -> PathBuf {
        self.build_dir
            .join("generated")
            .join("source")
            .join(generator)
            .join(&self.name)
    }

    /// Get the build folder
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }
}
