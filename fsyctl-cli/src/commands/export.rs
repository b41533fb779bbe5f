//! `fsyctl export` - CSV exports

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use fsyctl_server::db::MemberRepo;
use fsyctl_server::export::{members_filename, write_members};
use fsyctl_server::AppConfig;

#[derive(Parser, Debug)]
pub struct ExportArgs {
    #[command(subcommand)]
    pub command: ExportCommands,
}

#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Company members with their group and contact details
    Members(ExportMembersArgs),
}

#[derive(Parser, Debug)]
pub struct ExportMembersArgs {
    /// Output file, or a directory to write company-members-<date>.csv into (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Config file (default: ~/.fsyctl/config.toml when present)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

pub async fn run_export(args: ExportArgs) -> Result<()> {
    match args.command {
        ExportCommands::Members(args) => export_members(args).await,
    }
}

/// A directory target gets the dated default filename.
fn resolve_output(path: &Path, today: chrono::NaiveDate) -> PathBuf {
    if path.is_dir() {
        path.join(members_filename(today))
    } else {
        path.to_path_buf()
    }
}

async fn export_members(args: ExportMembersArgs) -> Result<()> {
    let config = AppConfig::load(args.config.as_deref()).context("Failed to load config")?;
    let pool = super::connect(args.database_url, &config).await?;

    let rows = MemberRepo::new(&pool)
        .export_rows()
        .await
        .context("Failed to load company members")?;

    match args.output {
        Some(path) => {
            let path = resolve_output(&path, chrono::Local::now().date_naive());
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_members(BufWriter::new(file), &rows)?;
            eprintln!("Wrote {} members to {}", rows.len(), path.display());
        }
        None => write_members(io::stdout().lock(), &rows)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn directory_gets_dated_name() {
        let dir = tempfile::tempdir().unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();

        assert_eq!(
            resolve_output(dir.path(), today),
            dir.path().join("company-members-2025-06-09.csv")
        );

        let file = dir.path().join("roster.csv");
        assert_eq!(resolve_output(&file, today), file);
    }
}
