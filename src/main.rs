//! cfexport - declarative configuration exporter for Cloud Foundry platforms

use clap::Parser;

mod cli;
mod client;
mod config;
mod entity;
mod error;
mod fetcher;
mod graph;
mod manifest;
mod mutation;
mod output;

use cli::{Cli, Commands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Export(args) => cli::export::run(args, cli.format, cli.config.as_deref()).await,
        Commands::Version => {
            println!("cfexport version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
