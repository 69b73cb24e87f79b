//! Export command handler

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::info;
use serde_json::Value;

use crate::cli::{ExportArgs, OutputFormat, Schema};
use crate::client::{CloudApi, CloudClient, UaaApi};
use crate::config::Config;
use crate::entity::Attrs;
use crate::error::{Error, Result};
use crate::fetcher::ResourceFetcher;
use crate::manifest::ManifestBuilder;
use crate::mutation::{ConfiguratorMutation, TerraformMutation};
use crate::output;

pub async fn run(args: ExportArgs, format: OutputFormat, config_path: Option<&Path>) -> Result<()> {
    let settings = merge(&args, Config::load_at(config_path)?);
    settings.validate()?;

    let deadline = Duration::from_secs(args.timeout_secs);
    match tokio::time::timeout(deadline, export(&args, &settings, format)).await {
        Ok(result) => result,
        Err(_) => Err(Error::Deadline(deadline)),
    }
}

/// Overlay CLI and environment values onto the file-backed settings
fn merge(args: &ExportArgs, mut config: Config) -> Config {
    if args.api_url.is_some() {
        config.api_url = args.api_url.clone();
    }
    if args.admin_user.is_some() {
        config.admin_user = args.admin_user.clone();
    }
    if args.admin_password.is_some() {
        config.admin_password = args.admin_password.clone();
    }
    if args.output.is_some() {
        config.output_file = args.output.clone();
    }
    if !args.exclude_env_vars.is_empty() {
        config.exclude_env_vars = args.exclude_env_vars.clone();
    }
    config
}

async fn export(args: &ExportArgs, settings: &Config, format: OutputFormat) -> Result<()> {
    // validate() ran before this point; the credentials are present
    let api_url = settings.api_url.as_deref().unwrap_or_default();
    let admin_user = settings.admin_user.as_deref().unwrap_or_default();
    let admin_password = settings.admin_password.as_deref().unwrap_or_default();

    let client = Arc::new(CloudClient::new(api_url, admin_user, admin_password)?);
    client.login().await?;
    info!("authenticated against {}", api_url);

    let fetcher = ResourceFetcher::new(client.clone() as Arc<dyn CloudApi>);
    let builder = ManifestBuilder::new(
        &fetcher,
        client as Arc<dyn UaaApi>,
        settings.exclude_env_vars.clone(),
    );

    let manifest = builder.build().await?;
    let document = apply_schema(args.schema, &manifest)?;
    let rendered = output::render(&document, format)?;

    match settings.output_file.as_deref() {
        Some(path) => {
            output::write_artifact(Path::new(path), &rendered)?;
            info!("wrote {}", path);
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn apply_schema(schema: Schema, manifest: &Attrs) -> Result<Value> {
    let document = match schema {
        Schema::Snapshot => manifest.clone(),
        Schema::Terraform => TerraformMutation::new(manifest).build()?,
        Schema::Configurator => ConfiguratorMutation::new(manifest).build()?,
    };
    Ok(Value::Object(document))
}
