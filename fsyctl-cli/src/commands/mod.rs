//! Command implementations for the fsyctl CLI

pub mod export;
pub mod migrate;
pub mod serve;
pub mod user;

pub use export::run_export;
pub use migrate::run_migrate;
pub use serve::run_serve;
pub use user::run_user;

use anyhow::{Context, Result};
use sqlx::PgPool;

use fsyctl_server::db::create_pool_with_options;
use fsyctl_server::AppConfig;

const MISSING_URL: &str =
    "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, ~/.fsyctl/.env or [database] url";

/// Resolve the database URL (flag, then config) and open a pool.
pub(crate) async fn connect(flag: Option<String>, config: &AppConfig) -> Result<PgPool> {
    let url = flag
        .or_else(|| config.database.url.clone())
        .context(MISSING_URL)?;
    create_pool_with_options(&url, config.database.max_connections)
        .await
        .context("Failed to create database pool")
}
