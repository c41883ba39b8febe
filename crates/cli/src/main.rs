//! Timeline CLI - tl command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;
mod session;
mod system_config;
mod util;

/// Timeline - checkpointed attribute sessions with undo and redo
#[derive(Parser)]
#[command(name = "tl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Show debug-level tracing output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a session script
    Run {
        /// Script file, one command per line
        script: PathBuf,
        /// Report failing commands and continue
        #[arg(long)]
        keep_going: bool,
    },
    /// Start an interactive session
    Repl,
    /// View and edit configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all configuration values
    List,
    /// Get a single configuration value
    Get {
        /// Dotted key, e.g. display.color
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Dotted key, e.g. display.color
        key: String,
        /// New value
        value: String,
    },
    /// Print the config file location
    Path {
        /// Write a default config file if none exists
        #[arg(long)]
        create: bool,
    },
    /// Print an annotated example config
    Example,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = system_config::resolve_path(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { script, keep_going } => {
            let config = system_config::load_from(&config_path)?;
            cmd::run::run(&config, &script, keep_going)
        }
        Commands::Repl => {
            let config = system_config::load_from(&config_path)?;
            cmd::repl::run(&config)
        }
        Commands::Config(command) => match command {
            ConfigCommands::List => cmd::config::run_list(&config_path),
            ConfigCommands::Get { key } => cmd::config::run_get(&config_path, &key),
            ConfigCommands::Set { key, value } => {
                cmd::config::run_set(&config_path, &key, &value)
            }
            ConfigCommands::Path { create } => cmd::config::run_path(&config_path, create),
            ConfigCommands::Example => cmd::config::run_example(),
        },
    }
}
