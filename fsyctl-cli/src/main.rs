//! fsyctl CLI - FSY event administration
//!
//! Entry point for the `fsyctl` binary:
//! - `serve` runs the HTTP API
//! - `migrate` creates or updates the database schema
//! - `user add` provisions coordinator accounts
//! - `export members` writes the company roster as CSV

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "fsyctl",
    author,
    version,
    about = "Administration API and tooling for FSY registrations, companies and schedules"
)]
struct Cli {
    /// Enable debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces to an OTLP endpoint (requires the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create or update the database schema
    Migrate(commands::migrate::MigrateArgs),
    /// Manage login accounts
    User(commands::user::UserArgs),
    /// Export data as CSV
    Export(commands::export::ExportArgs),
}

/// Load `.env` from the working directory, then `~/.fsyctl/.env`.
///
/// Values already in the environment win; the first file wins over the second.
fn load_env_files() -> Vec<PathBuf> {
    let mut loaded = Vec::new();
    if let Ok(path) = dotenvy::dotenv() {
        loaded.push(path);
    }
    if let Some(home) = dirs::home_dir() {
        let path = home.join(".fsyctl").join(".env");
        if path.exists() && dotenvy::from_path(&path).is_ok() {
            loaded.push(path);
        }
    }
    loaded
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing so `env = ...` args see values from .env files.
    let env_files = load_env_files();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })?;
    for path in &env_files {
        tracing::debug!(path = %path.display(), "loaded env file");
    }

    let result = match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await,
        Commands::Migrate(args) => commands::run_migrate(args).await,
        Commands::User(args) => commands::run_user(args).await,
        Commands::Export(args) => commands::run_export(args).await,
    };

    tracing_setup::shutdown_otel();
    result
}
