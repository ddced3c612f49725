//! CLI entry point for chatkeep

mod shell;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chatkeep_core::config::{Config, ConfigLoader};
use chatkeep_core::logging::init_logging;
use chatkeep_core::storage::open_storage;
use chatkeep_core::{MessageStore, StoreSettings};
use clap::{Parser, Subcommand};
use console::style;

#[derive(Parser)]
#[command(name = "chatkeep")]
#[command(about = "Session-scoped chat history with bounded retention")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat,
    /// Print the persisted session
    Show,
    /// Reset the persisted session to the welcome message
    Clear,
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = match &cli.config_dir {
        Some(dir) => ConfigLoader::with_dir(dir),
        None => ConfigLoader::new(),
    };
    let config = loader
        .load()
        .with_context(|| format!("loading config from {}", loader.config_dir().display()))?;
    let _log_guard = init_logging(&config.logging);

    match cli.command {
        Commands::Chat => {
            let storage = open_storage(&config.session);
            shell::run(storage, StoreSettings::from(&config.session)).await?;
        }
        Commands::Show => {
            let store = open_store(&config);
            shell::print_history(&store);
        }
        Commands::Clear => {
            let mut store = open_store(&config);
            store.clear();
            println!("{}", style("Session cleared").green());
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn open_store(config: &Config) -> MessageStore {
    MessageStore::open(
        open_storage(&config.session),
        StoreSettings::from(&config.session),
    )
}
