//! `fsyctl user` - login accounts
//!
//! Coordinators cannot self-register over the API; this is how they get in.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use fsyctl_server::auth::hash_secret;
use fsyctl_server::db::{NewUser, UserRepo, UserType};
use fsyctl_server::AppConfig;

#[derive(Parser, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommands,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create a login account
    Add(AddUserArgs),
}

#[derive(Parser, Debug)]
pub struct AddUserArgs {
    /// Display name
    #[arg(long)]
    pub full_name: String,

    /// Login email (must be unique)
    #[arg(long)]
    pub email: String,

    /// Phone number, also accepted as a login
    #[arg(long)]
    pub phone: Option<String>,

    /// Initial password
    #[arg(long, env = "FSYCTL_USER_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Account type: Coordinator, Counselor or Participant
    #[arg(long, default_value = "Coordinator", value_parser = parse_user_type)]
    pub user_type: UserType,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Config file (default: ~/.fsyctl/config.toml when present)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

fn parse_user_type(s: &str) -> Result<UserType, String> {
    UserType::parse(s).map_err(|e| e.to_string())
}

pub async fn run_user(args: UserArgs) -> Result<()> {
    match args.command {
        UserCommands::Add(args) => add_user(args).await,
    }
}

async fn add_user(args: AddUserArgs) -> Result<()> {
    let full_name = args.full_name.trim();
    let email = args.email.trim();
    if full_name.is_empty() || email.is_empty() {
        bail!("--full-name and --email must not be blank");
    }
    if args.password.is_empty() {
        bail!("--password must not be empty");
    }

    let config = AppConfig::load(args.config.as_deref()).context("Failed to load config")?;
    let pool = super::connect(args.database_url, &config).await?;

    let user = NewUser {
        full_name: full_name.to_string(),
        email: email.to_string(),
        phone_number: args
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()),
        birth_date: None,
        password_hash: hash_secret(&args.password),
        user_type: args.user_type,
    };

    let user_id = UserRepo::new(&pool)
        .create(&user)
        .await
        .context("Failed to create user")?;

    tracing::info!(user_id, user_type = %user.user_type, "user created");
    println!("Created {} '{}' (user_id {})", user.user_type, user.full_name, user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_type_values() {
        assert_eq!(parse_user_type("Coordinator").unwrap(), UserType::Coordinator);
        assert_eq!(parse_user_type("Counselor").unwrap(), UserType::Counselor);
        assert!(parse_user_type("Admin").is_err());
    }
}
