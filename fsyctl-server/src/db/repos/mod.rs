//! Repository implementations for database access
//!
//! Each repository borrows the pool and exposes one method per query shape.
//! Handlers never build SQL themselves.

pub mod registrations;
pub mod reference;
pub mod companies;
pub mod groups;
pub mod members;
pub mod events;
pub mod users;
pub mod reports;

#[cfg(test)]
pub(crate) mod testing;

pub use registrations::{
    AssignableRegistrant, MatchType, RegistrantFilter, RegistrantSummary, Registration,
    RegistrationRepo, UnitRegistrant,
};
pub use reference::{ReferenceRepo, Stake, Unit};
pub use companies::{Company, CompanyRepo, CompanyWithCounts, CompanyWithGroups, NewGroup};
pub use groups::{Group, GroupRepo};
pub use members::{MemberAssignment, MemberExportRow, MemberRepo, MemberRow, MemberSearchRow};
pub use events::{DailyEvent, EventRepo, NewEvent};
pub use users::{NewUser, User, UserRepo, UserType};
pub use reports::{CountRow, Dashboard, ReportRepo, UnitAlert};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// A uniqueness or reference rule was violated by the write
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// The write was well-formed but breaks a business rule
    #[error("{message}")]
    Rejected { message: &'static str },
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

/// Map a unique-constraint violation to `Conflict`, anything else to `Sqlx`.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> DbError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => DbError::Conflict {
            message: message.to_owned(),
        },
        _ => DbError::Sqlx(err),
    }
}

/// Map a foreign-key violation to `Conflict`, anything else to `Sqlx`.
pub(crate) fn conflict_on_foreign_key(err: sqlx::Error, message: &str) -> DbError {
    match err.as_database_error() {
        Some(db) if db.is_foreign_key_violation() => DbError::Conflict {
            message: message.to_owned(),
        },
        _ => DbError::Sqlx(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_pass_through() {
        let err = conflict_on_unique(sqlx::Error::RowNotFound, "dup");
        assert!(matches!(err, DbError::Sqlx(sqlx::Error::RowNotFound)));

        let err = conflict_on_foreign_key(sqlx::Error::PoolTimedOut, "in use");
        assert!(matches!(err, DbError::Sqlx(sqlx::Error::PoolTimedOut)));
    }

    #[test]
    fn not_found_display() {
        let err = DbError::not_found("event", 42);
        assert_eq!(err.to_string(), "not found: event '42'");
    }
}
