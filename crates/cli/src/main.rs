//! layoutd CLI - incremental layout code generation daemon

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod locks;
mod logging;
mod util;
mod workspace;

/// layoutd - Regenerate layout-derived sources as you edit
#[derive(Parser)]
#[command(name = "layoutd")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the project and regenerate on layout changes
    Watch {
        /// Watch and classify without running the generator
        #[arg(long)]
        no_dispatch: bool,

        /// Also write logs to this file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
    /// Regenerate every layout of the given units (default: all units)
    Compile {
        /// Unit ids
        units: Vec<String>,
    },
    /// Validate the configuration and show the unit graph
    Check,
    /// View and edit project configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show all configuration values
    List,
    /// Get a single configuration value
    Get {
        /// Key, e.g. watch.debounce_ms
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Key, e.g. watch.debounce_ms
        key: String,
        /// New value
        value: String,
    },
    /// Show the config file path
    Path {
        /// Create the file from the example if it does not exist
        #[arg(long)]
        create: bool,
    },
    /// Print an example configuration
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = match &cli.command {
        Commands::Watch { log_file, .. } => log_file.clone(),
        _ => None,
    };
    // Keeps the non-blocking file writer flushing until exit
    let _guard = logging::init(cli.verbose, log_file.as_deref())?;

    match cli.command {
        Commands::Watch { no_dispatch, .. } => cmd::watch::run(no_dispatch).await,
        Commands::Compile { units } => cmd::compile::run(&units).await,
        Commands::Check => cmd::check::run(),
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::List => cmd::config::run_list(),
            ConfigCommands::Get { key } => cmd::config::run_get(&key),
            ConfigCommands::Set { key, value } => cmd::config::run_set(&key, &value),
            ConfigCommands::Path { create } => cmd::config::run_path(create),
            ConfigCommands::Example => cmd::config::run_example(),
        },
    }
}
