pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "market-api")]
#[command(about = "Market API - storefront backend over flat JSON files")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides MARKET_API_PORT / PORT)")]
        port: Option<u16>,
        #[arg(long, help = "Directory holding the JSON collections (overrides MARKET_DATA_DIR)")]
        data_dir: Option<PathBuf>,
    },

    #[command(about = "Create the data directory with empty collections")]
    Init {
        #[arg(long, help = "Directory holding the JSON collections (overrides MARKET_DATA_DIR)")]
        data_dir: Option<PathBuf>,
        #[arg(long, help = "Reset collections that already exist")]
        force: bool,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let command = cli.command.unwrap_or(Commands::Serve {
        port: None,
        data_dir: None,
    });

    match command {
        Commands::Serve { port, data_dir } => commands::serve::handle(port, data_dir).await,
        Commands::Init { data_dir, force } => commands::init::handle(data_dir, force).await,
    }
}
