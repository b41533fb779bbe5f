//! `fsyctl migrate` - create or update the schema

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use fsyctl_server::db::migrations;
use fsyctl_server::AppConfig;

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Config file (default: ~/.fsyctl/config.toml when present)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let config = AppConfig::load(args.config.as_deref()).context("Failed to load config")?;
    let pool = super::connect(args.database_url, &config).await?;

    migrations::run(&pool).await.context("Migration failed")?;
    println!("Schema is up to date");
    Ok(())
}
