//! Error types for layoutd-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::unit::UnitId;

/// Result type for layoutd-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading or validating a project description.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read or parse the project configuration.
    #[error("config error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// Configuration parsed but holds an invalid value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A unit lists a dependency that is not declared.
    #[error("unit {unit} depends on unknown unit {dependency}")]
    UnknownDependency { unit: UnitId, dependency: UnitId },

    /// The same unit id is declared twice.
    #[error("duplicate unit id: {0}")]
    DuplicateUnit(UnitId),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure reported by an incremental generator.
///
/// These are never fatal: the scheduler logs them and the unit stays stale
/// until the next batch that touches it.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The generator failed while reading inputs or writing outputs.
    #[error("generator I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// The generator ran but reported failure.
    #[error("generator exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    /// The generator could not be invoked at all.
    #[error("generator unavailable: {0}")]
    Unavailable(String),
}
