//! CLI argument definitions

pub mod export;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Declarative configuration exporter for Cloud Foundry platforms
#[derive(Parser)]
#[command(name = "cfexport", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format for the exported document
    #[arg(long, global = true, env = "EXPORTER_FORMAT", default_value = "yaml")]
    pub format: OutputFormat,

    /// Path to the configuration file
    #[arg(long, global = true, env = "EXPORTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, env = "EXPORTER_DEBUG")]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export the platform configuration graph
    Export(ExportArgs),

    /// Print version information
    Version,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Document schema to emit
    #[arg(long, default_value = "snapshot")]
    pub schema: Schema,

    /// Platform API endpoint
    #[arg(long, env = "EXPORTER_API_URL")]
    pub api_url: Option<String>,

    /// Administrator user name
    #[arg(long, env = "EXPORTER_ADMIN_USER")]
    pub admin_user: Option<String>,

    /// Administrator password
    #[arg(long, env = "EXPORTER_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Write the document to this file instead of standard output
    #[arg(long, env = "EXPORTER_OUTPUT_FILE")]
    pub output: Option<String>,

    /// Drop environment variables whose names start with these prefixes
    #[arg(long, env = "EXPORTER_EXCLUDE_ENV_VARS", value_delimiter = ',')]
    pub exclude_env_vars: Vec<String>,

    /// Abort the run after this many seconds
    #[arg(long, default_value_t = 600)]
    pub timeout_secs: u64,
}

#[derive(Copy, Clone, ValueEnum)]
pub enum Schema {
    /// The raw configuration snapshot
    Snapshot,
    /// Terraform provider input document
    Terraform,
    /// Configurator tooling input document
    Configurator,
}

#[derive(Copy, Clone, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}
