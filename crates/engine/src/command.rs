//! External generator invoked as a child process
//!
//! The configured program receives one JSON request on stdin per compile:
//!
//! ```json
//! {"unit": "app", "package": "com.example", "output_dir": "...",
//!  "changed": ["..."], "removed": ["..."], "options": {}}
//! ```
//!
//! Exit status zero means success; anything else is reported with the
//! program's stderr.

use layoutd_core::{CompileError, Generator, GeneratorConfig, UnitId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::model::GeneratorFactory;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    unit: &'a UnitId,
    package: Option<&'a str>,
    output_dir: &'a Path,
    changed: &'a [PathBuf],
    removed: &'a [PathBuf],
    options: &'a BTreeMap<String, String>,
}

/// Generator running a configured command
pub struct CommandGenerator {
    unit: UnitId,
    config: GeneratorConfig,
}

impl CommandGenerator {
    /// Create a generator for `unit`
    pub fn new(unit: UnitId, config: GeneratorConfig) -> Self {
        Self { unit, config }
    }
}

impl Generator for CommandGenerator {
    fn compile_incremental(
        &self,
        changed: &[PathBuf],
        removed: &[PathBuf],
        output_dir: &Path,
    ) -> Result<(), CompileError> {
        let Some((program, args)) = self.config.command.split_first() else {
            return Err(CompileError::Unavailable(format!(
                "no command configured for generator {}",
                self.config.name
            )));
        };

        let request = GenerateRequest {
            unit: &self.unit,
            package: self.config.package.as_deref(),
            output_dir,
            changed,
            removed,
            options: &self.config.options,
        };
        let payload = serde_json::to_vec(&request)
            .map_err(|e| CompileError::Io(std::io::Error::new(ErrorKind::InvalidData, e)))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    CompileError::Unavailable(format!("{}: {}", program, e))
                }
                _ => CompileError::Io(e),
            })?;
        trace!(unit = %self.unit, pid = child.id(), "Spawned generator {}", program);

        if let Some(mut stdin) = child.stdin.take() {
            // A generator may exit without reading its input
            match stdin.write_all(&payload) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
                Err(e) => return Err(CompileError::Io(e)),
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(CompileError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(unit = %self.unit, "Generator finished");
        Ok(())
    }
}

/// Factory building [`CommandGenerator`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandGeneratorFactory;

impl GeneratorFactory for CommandGeneratorFactory {
    fn create(&self, unit: &UnitId, config: &GeneratorConfig) -> Arc<dyn Generator> {
        Arc::new(CommandGenerator::new(unit.clone(), config.clone()))
    }
}
