//! Database layer - connection pool, schema and repositories
//!
//! # Design Principles
//!
//! - Connection pool, one checkout per request
//! - List operations use JOINs - no N+1 queries
//! - Rely on DB constraints, map unique/foreign key violations to conflicts
//! - Transactions for multi-step writes

pub mod pool;
pub mod migrations;
pub mod repos;

pub use pool::{create_pool, create_pool_with_options, ping};
pub use repos::*;
