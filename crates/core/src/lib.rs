//! Core types for layoutd
//!
//! This crate provides:
//! - Build unit identity and build-variant output directories
//! - Change batches with debounce and request merge semantics
//! - Collaborator traits (project context, tracked-file predicate, generator, refresh)
//! - Unit dependency graph with reverse-dependency closure
//! - Project configuration (`layoutd.toml`) and a config-backed project model

pub mod batch;
pub mod config;
pub mod error;
pub mod graph;
pub mod project;
pub mod traits;
pub mod unit;

// Re-exports
pub use batch::ChangeBatch;
pub use config::{GeneratorConfig, ProjectConfig, UnitConfig, WatchConfig, CONFIG_FILE_NAME};
pub use error::{CompileError, Error, Result};
pub use graph::DependencyGraph;
pub use project::{Project, UnitInfo};
pub use traits::{Generator, LogRefresh, NoRefresh, ProjectContext, RefreshSink, TrackedFiles};
pub use unit::{BuildVariant, UnitId};
