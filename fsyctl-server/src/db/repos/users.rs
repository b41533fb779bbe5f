//! Login accounts

use std::fmt;

use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};

use super::{conflict_on_unique, DbError};
use crate::models::{ParticipantType, ValidationError};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    Coordinator,
    Counselor,
    Participant,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coordinator => "Coordinator",
            Self::Counselor => "Counselor",
            Self::Participant => "Participant",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "Coordinator" => Ok(Self::Coordinator),
            "Counselor" => Ok(Self::Counselor),
            "Participant" => Ok(Self::Participant),
            other => Err(ValidationError::InvalidVariant {
                field: "user_type",
                value: other.to_string(),
            }),
        }
    }
}

impl From<ParticipantType> for UserType {
    fn from(kind: ParticipantType) -> Self {
        match kind {
            ParticipantType::Participant => Self::Participant,
            ParticipantType::Counselor => Self::Counselor,
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored account. Never serialized: it carries the password hash.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: i32,
    pub full_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub password_hash: String,
    pub user_type: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// Already hashed; see `auth::hash_secret`
    pub password_hash: String,
    pub user_type: UserType,
}

pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Coordinator whose email or phone number equals `login`.
    pub async fn find_coordinator(&self, login: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as(
            r#"
            SELECT user_id, full_name, email, phone_number, password_hash, user_type
            FROM users
            WHERE user_type = $2 AND (email = $1 OR phone_number = $1)
            ORDER BY user_id
            LIMIT 1
            "#,
        )
        .bind(login)
        .bind(UserType::Coordinator.as_str())
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, DbError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Insert an account; a duplicate email is a conflict.
    pub async fn create(&self, user: &NewUser) -> Result<i32, DbError> {
        let (user_id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO users (full_name, email, phone_number, birth_date, password_hash, user_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING user_id
            "#,
        )
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(user.phone_number.as_deref())
        .bind(user.birth_date)
        .bind(&user.password_hash)
        .bind(user.user_type.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "A user with this email already exists"))?;

        tracing::info!(user_id, user_type = %user.user_type, "user created");
        Ok(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::testing::TestDb;

    #[test]
    fn user_type_parsing() {
        assert_eq!(UserType::parse("Coordinator").unwrap(), UserType::Coordinator);
        assert!(UserType::parse("coordinator").is_err());
        assert_eq!(UserType::from(ParticipantType::Counselor), UserType::Counselor);
        assert_eq!(UserType::Participant.to_string(), "Participant");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn coordinator_lookup_by_email_or_phone() {
        let db = TestDb::connect().await;
        let repo = UserRepo::new(&db.pool);
        let email = format!("{}@example.test", TestDb::unique_name("coord").replace(' ', "-"));
        let phone = format!("+63{}", rand::random::<u32>());

        repo.create(&NewUser {
            full_name: "Camp Coordinator".into(),
            email: email.clone(),
            phone_number: Some(phone.clone()),
            birth_date: None,
            password_hash: crate::auth::hash_secret("hunter22"),
            user_type: UserType::Coordinator,
        })
        .await
        .unwrap();

        assert!(repo.find_coordinator(&email).await.unwrap().is_some());
        assert!(repo.find_coordinator(&phone).await.unwrap().is_some());
        assert!(repo.find_coordinator("nobody@example.test").await.unwrap().is_none());
        assert!(repo.email_exists(&email).await.unwrap());

        let err = repo
            .create(&NewUser {
                full_name: "Duplicate".into(),
                email,
                phone_number: None,
                birth_date: None,
                password_hash: "x".into(),
                user_type: UserType::Participant,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn non_coordinators_cannot_log_in() {
        let db = TestDb::connect().await;
        let repo = UserRepo::new(&db.pool);
        let email = format!("{}@example.test", TestDb::unique_name("part").replace(' ', "-"));

        repo.create(&NewUser {
            full_name: "Some Participant".into(),
            email: email.clone(),
            phone_number: None,
            birth_date: NaiveDate::from_ymd_opt(2008, 3, 1),
            password_hash: crate::auth::hash_secret("1234"),
            user_type: UserType::Participant,
        })
        .await
        .unwrap();

        assert!(repo.find_coordinator(&email).await.unwrap().is_none());
    }
}
