//! Ignore pattern management for layoutd
//!
//! Supports multiple sources of ignore patterns:
//! 1. Built-in patterns (VCS metadata, build output, editor temp files - always active)
//! 2. .gitignore patterns (optional, enabled by default)
//! 3. .layoutdignore patterns (layoutd-specific, optional)
//! 4. Config-based patterns (additional custom patterns)

use anyhow::Result;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use layoutd_core::WatchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the layoutd-specific ignore file
pub const IGNORE_FILE_NAME: &str = ".layoutdignore";

/// Ignore rule manager
///
/// Combines multiple sources of ignore patterns with proper precedence:
/// 1. Built-in patterns (highest priority - always enforced)
/// 2. .layoutdignore patterns (override .gitignore)
/// 3. .gitignore patterns (lowest priority)
pub struct IgnoreRules {
    /// Project root directory
    project_root: PathBuf,

    /// Gitignore patterns (optional)
    gitignore: Option<Gitignore>,

    /// Layoutd-specific ignore patterns (optional)
    layoutdignore: Option<Gitignore>,

    /// Patterns from `watch.ignore_patterns` (optional)
    additional: Option<Gitignore>,

    /// Configuration
    config: IgnoreConfig,
}

impl IgnoreRules {
    /// Load ignore rules for a project
    pub fn load(project_root: &Path, config: IgnoreConfig) -> Result<Self> {
        let mut rules = Self {
            project_root: project_root.to_path_buf(),
            gitignore: None,
            layoutdignore: None,
            additional: None,
            config,
        };

        rules.reload_ignore_files()?;
        Ok(rules)
    }

    /// Reload ignore files from disk and recompile config patterns
    pub fn reload_ignore_files(&mut self) -> Result<()> {
        self.additional = self.build_additional()?;

        self.gitignore = if self.config.use_gitignore {
            self.build_matcher(".gitignore")?
        } else {
            None
        };

        self.layoutdignore = if self.config.use_layoutdignore {
            self.build_matcher(IGNORE_FILE_NAME)?
        } else {
            None
        };

        Ok(())
    }

    fn build_additional(&self) -> Result<Option<Gitignore>> {
        if self.config.additional_patterns.is_empty() {
            return Ok(None);
        }

        let mut builder = GitignoreBuilder::new(&self.project_root);
        for pattern in &self.config.additional_patterns {
            if let Err(err) = builder.add_line(None, pattern) {
                tracing::warn!("Skipping invalid ignore pattern {:?}: {}", pattern, err);
            }
        }
        Ok(Some(builder.build()?))
    }

    fn build_matcher(&self, file_name: &str) -> Result<Option<Gitignore>> {
        let path = self.project_root.join(file_name);
        if !path.exists() {
            return Ok(None);
        }

        let mut builder = GitignoreBuilder::new(&self.project_root);
        if let Some(err) = builder.add(&path) {
            tracing::warn!("Partially invalid {}: {}", path.display(), err);
        }
        Ok(Some(builder.build()?))
    }

    /// Check if path should be ignored
    ///
    /// Accepts absolute paths or paths relative to the project root. Paths
    /// outside the root are only checked against built-in patterns.
    pub fn should_ignore(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.project_root).unwrap_or(path);

        // 1. Built-in patterns (highest priority - always enforced)
        if self.is_builtin_ignored(relative) {
            return true;
        }

        // The ignore crate asserts paths lie under its root
        if relative.has_root() {
            return false;
        }
        let is_dir = self.project_root.join(relative).is_dir();

        // 2. .layoutdignore (overrides .gitignore)
        if let Some(ref layoutdignore) = self.layoutdignore {
            let matched = layoutdignore.matched_path_or_any_parents(relative, is_dir);
            if matched.is_ignore() {
                return true;
            }
            if matched.is_whitelist() {
                return false;
            }
        }

        // 3. .gitignore (lowest priority)
        if let Some(ref gitignore) = self.gitignore {
            if gitignore.matched_path_or_any_parents(relative, is_dir).is_ignore() {
                return true;
            }
        }

        // 4. Additional config patterns
        self.additional
            .as_ref()
            .is_some_and(|additional| additional.matched_path_or_any_parents(relative, is_dir).is_ignore())
    }

    /// Check if path matches built-in ignore patterns
    ///
    /// These are always enforced regardless of configuration
    fn is_builtin_ignored(&self, path: &Path) -> bool {
        for component in path.components() {
            if let Some(name) = component.as_os_str().to_str() {
                match name {
                    ".git" | ".jj" | ".hg" | ".svn" | ".layoutd" | ".gradle" | ".idea"
                    | ".vscode" | "node_modules" | "target" => return true,
                    _ => {}
                }
            }
        }

        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        is_editor_temp(filename)
    }

    /// Get number of active ignore sources
    pub fn active_sources(&self) -> usize {
        let mut count = 1; // Built-in always active
        if self.gitignore.is_some() {
            count += 1;
        }
        if self.layoutdignore.is_some() {
            count += 1;
        }
        if self.additional.is_some() {
            count += 1;
        }
        count
    }

    /// Get project root
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}

/// Common editor temporary and OS metadata files
///
/// Covers: Vim, Emacs, JetBrains safe-write, MacOS/Windows system files
fn is_editor_temp(filename: &str) -> bool {
    // Vim swap files
    if filename.ends_with(".swp") || filename.ends_with(".swo") || filename.ends_with(".swx") {
        return true;
    }

    // Backup files
    if filename.ends_with('~') || filename.ends_with(".bak") || filename.ends_with(".orig") {
        return true;
    }

    // Emacs auto-save and lock files
    if (filename.starts_with('#') && filename.ends_with('#')) || filename.starts_with(".#") {
        return true;
    }

    // JetBrains safe-write temp files
    if filename.ends_with("___jb_tmp___") || filename.ends_with("___jb_old___") {
        return true;
    }

    // MacOS / Windows system files
    filename == ".DS_Store" || filename.starts_with("._") || filename == "Thumbs.db"
}

/// Ignore configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnoreConfig {
    /// Use .gitignore patterns (default: true)
    #[serde(default = "default_true")]
    pub use_gitignore: bool,

    /// Use .layoutdignore patterns (default: true)
    #[serde(default = "default_true")]
    pub use_layoutdignore: bool,

    /// Additional patterns from config
    #[serde(default)]
    pub additional_patterns: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            use_gitignore: true,
            use_layoutdignore: true,
            additional_patterns: vec![],
        }
    }
}

impl From<&WatchConfig> for IgnoreConfig {
    fn from(config: &WatchConfig) -> Self {
        Self {
            use_gitignore: config.use_gitignore,
            use_layoutdignore: config.use_layoutdignore,
            additional_patterns: config.ignore_patterns.clone(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_patterns_always_enforced() {
        let temp_dir = TempDir::new().unwrap();
        let rules = IgnoreRules::load(temp_dir.path(), IgnoreConfig::default()).unwrap();

        assert!(rules.should_ignore(Path::new(".git/objects/ab/cd")));
        assert!(rules.should_ignore(Path::new("app/.gradle/cache.xml")));
        assert!(rules.should_ignore(Path::new(".layoutd/locks/daemon.lock")));
        assert!(rules.should_ignore(Path::new("app/src/main/res/layout/.#main.xml")));
        assert!(rules.should_ignore(Path::new("app/src/main/res/layout/main.xml~")));
        assert!(rules.should_ignore(Path::new("app/src/main/res/layout/main.xml___jb_tmp___")));

        assert!(!rules.should_ignore(Path::new("app/src/main/res/layout/main.xml")));
    }

    #[test]
    fn test_gitignore_parsing() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join(".gitignore"), "build/\n*.tmp.xml\n")?;
        fs::create_dir_all(temp_dir.path().join("app/build/intermediates"))?;

        let config = IgnoreConfig {
            use_gitignore: true,
            use_layoutdignore: false,
            additional_patterns: vec![],
        };
        let rules = IgnoreRules::load(temp_dir.path(), config)?;

        assert!(rules.should_ignore(&temp_dir.path().join("app/build/intermediates/res/layout/a.xml")));
        assert!(rules.should_ignore(&temp_dir.path().join("app/src/main/res/layout/a.tmp.xml")));
        assert!(!rules.should_ignore(&temp_dir.path().join("app/src/main/res/layout/a.xml")));

        Ok(())
    }

    #[test]
    fn test_layoutdignore_whitelist_overrides_gitignore() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join(".gitignore"), "*.xml\n")?;
        fs::write(temp_dir.path().join(IGNORE_FILE_NAME), "!main.xml\n")?;

        let rules = IgnoreRules::load(temp_dir.path(), IgnoreConfig::default())?;

        assert!(rules.should_ignore(&temp_dir.path().join("res/layout/other.xml")));
        assert!(!rules.should_ignore(&temp_dir.path().join("res/layout/main.xml")));
        assert_eq!(rules.active_sources(), 3);

        Ok(())
    }

    #[test]
    fn test_additional_patterns() {
        let temp_dir = TempDir::new().unwrap();
        let config = IgnoreConfig {
            use_gitignore: false,
            use_layoutdignore: false,
            additional_patterns: vec!["*_generated.xml".to_string(), "sandbox/".to_string()],
        };
        let rules = IgnoreRules::load(temp_dir.path(), config).unwrap();

        assert!(rules.should_ignore(Path::new("res/layout/view_generated.xml")));
        assert!(rules.should_ignore(Path::new("sandbox/res/layout/a.xml")));
        assert!(!rules.should_ignore(Path::new("res/layout/view.xml")));
        assert_eq!(rules.active_sources(), 2);
    }

    #[test]
    fn test_additional_patterns_use_gitignore_globs() {
        let temp_dir = TempDir::new().unwrap();
        let config = IgnoreConfig {
            use_gitignore: false,
            use_layoutdignore: false,
            additional_patterns: vec!["**/layout/*_draft.xml".to_string()],
        };
        let rules = IgnoreRules::load(temp_dir.path(), config).unwrap();

        assert!(rules.should_ignore(Path::new("app/src/main/res/layout/main_draft.xml")));
        assert!(rules.should_ignore(&temp_dir.path().join("lib/res/layout/row_draft.xml")));
        assert!(!rules.should_ignore(Path::new("app/src/main/res/layout/main.xml")));
        assert!(!rules.should_ignore(Path::new("app/src/main/res/layout-land/main_draft.xml")));
    }

    #[test]
    fn test_gitignore_disabled() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join(".gitignore"), "*.xml\n")?;

        let config = IgnoreConfig {
            use_gitignore: false,
            use_layoutdignore: false,
            additional_patterns: vec![],
        };
        let rules = IgnoreRules::load(temp_dir.path(), config)?;

        assert!(!rules.should_ignore(Path::new("res/layout/a.xml")));
        assert!(rules.should_ignore(Path::new(".git/config")));

        Ok(())
    }

    #[test]
    fn test_reload_ignore_files() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = IgnoreConfig {
            use_gitignore: true,
            use_layoutdignore: false,
            additional_patterns: vec![],
        };
        let mut rules = IgnoreRules::load(temp_dir.path(), config)?;
        assert!(!rules.should_ignore(Path::new("res/layout/a.xml")));

        fs::write(temp_dir.path().join(".gitignore"), "*.xml\n")?;
        rules.reload_ignore_files()?;

        assert!(rules.should_ignore(Path::new("res/layout/a.xml")));
        Ok(())
    }
}
