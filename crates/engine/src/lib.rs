//! Incremental layout generation engine
//!
//! This crate provides:
//! - Dependency resolution from changed files to affected units
//! - Per-unit generator models and their registry
//! - An external-command generator speaking JSON over stdin
//! - Per-unit invalidation scheduling with request merging
//! - The project session tying watcher, resolver and scheduler together

pub mod command;
pub mod model;
pub mod registry;
pub mod resolver;
pub mod scheduler;
pub mod session;

// Re-exports
pub use command::{CommandGenerator, CommandGeneratorFactory};
pub use model::{CompileOutcome, GeneratorFactory, UnitModel};
pub use registry::ModelRegistry;
pub use resolver::resolve;
pub use scheduler::InvalidationScheduler;
pub use session::ProjectSession;
