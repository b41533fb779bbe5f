//! fsyctl-server: HTTP API for FSY event administration
//!
//! Registrations, company/group assignment, the daily schedule, dashboard
//! reports and SMS reminders over PostgreSQL.

pub mod auth;
pub mod config;
pub mod db;
pub mod export;
pub mod http;
pub mod models;
pub mod sms;

pub use config::AppConfig;
pub use http::{run_server, AppState, ServerConfig};
