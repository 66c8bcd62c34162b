//! One Pace Torbox addon
//!
//! # Usage
//!
//! ```bash
//! # Serve the addon
//! TORBOX_API_KEY=... onepace-torbox
//!
//! # Resolve one episode from the command line
//! onepace-torbox resolve RO_1
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use onepace_torbox::api::TorboxClient;
use onepace_torbox::catalog::StaticCatalog;
use onepace_torbox::cli::{Cli, Command, ExitCode, ResolveCmd, ServeCmd};
use onepace_torbox::config::Config;
use onepace_torbox::logging::{self, LogFormat};
use onepace_torbox::models::StreamsResponse;
use onepace_torbox::server::{self, AppState};
use onepace_torbox::stream::{RetryPolicy, StreamResolver};
use onepace_torbox::AddonError;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code.into(),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::Error.into()
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::from_config(config.log_format.as_deref())
    };
    logging::init(config.log_level(), format)?;

    let catalog = Arc::new(match &config.catalog_path {
        Some(path) => StaticCatalog::from_path(path)?,
        None => StaticCatalog::embedded()?,
    });
    tracing::debug!(version = catalog.version(), "catalog loaded");

    match cli.command() {
        Command::Serve(cmd) => serve_cmd(cmd, &config, catalog).await,
        Command::Resolve(cmd) => resolve_cmd(cmd, &config, catalog).await,
    }
}

fn torbox_client(config: &Config) -> Result<TorboxClient> {
    let api_key = config.api_key();
    let client = match &config.torbox_base_url {
        Some(url) => TorboxClient::with_base_url(api_key, url)?,
        None => TorboxClient::new(api_key)?,
    };
    if !client.is_configured() {
        tracing::warn!("TORBOX_API_KEY is not set; stream lists will be empty");
    }
    Ok(client)
}

async fn serve_cmd(cmd: ServeCmd, config: &Config, catalog: Arc<StaticCatalog>) -> Result<ExitCode> {
    let addr: SocketAddr = match cmd.bind {
        Some(bind) => bind.parse().context("Invalid --bind address")?,
        None => config.bind_addr()?,
    };

    let resolver = Arc::new(StreamResolver::new(
        catalog.clone(),
        Arc::new(torbox_client(config)?),
        config.retry_policy(),
    ));
    let state = Arc::new(AppState::new(catalog, resolver));

    server::serve(state, addr).await?;
    Ok(ExitCode::Success)
}

async fn resolve_cmd(
    cmd: ResolveCmd,
    config: &Config,
    catalog: Arc<StaticCatalog>,
) -> Result<ExitCode> {
    let policy = if cmd.no_wait {
        RetryPolicy::immediate(config.retry_policy().max_attempts)
    } else {
        config.retry_policy()
    };
    let resolver = StreamResolver::new(catalog, Arc::new(torbox_client(config)?), policy);

    let streams = match resolver.streams_for(&cmd.stream_id).await {
        Ok(streams) => streams,
        Err(AddonError::NotFound(what)) => {
            eprintln!("Not found: {}", what);
            return Ok(ExitCode::NotFound);
        }
        Err(e) => return Err(e.into()),
    };

    let empty = streams.is_empty();
    println!(
        "{}",
        serde_json::to_string_pretty(&StreamsResponse { streams })?
    );

    Ok(if empty {
        ExitCode::NoStreams
    } else {
        ExitCode::Success
    })
}
