//! `fsyctl serve` - run the HTTP API

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use fsyctl_server::{run_server, AppConfig, AppState};

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides config; default 127.0.0.1:3030)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Config file (default: ~/.fsyctl/config.toml when present)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut config = AppConfig::load(args.config.as_deref()).context("Failed to load config")?;
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    if args.cors_permissive {
        config.server.cors_permissive = true;
    }
    tracing::debug!(?config, "configuration loaded");

    let pool = super::connect(args.database_url, &config).await?;
    let state = AppState::from_config(pool, &config).context("Invalid server configuration")?;

    tracing::info!("Starting fsyctl server on {}", config.server.bind_addr);
    run_server(state, config.server).await.context("Server error")?;
    Ok(())
}
