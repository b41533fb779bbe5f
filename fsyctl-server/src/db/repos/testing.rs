//! Fixtures for database-backed tests
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p fsyctl-server -- --ignored

use rand::Rng;
use sqlx::PgPool;

use super::{Registration, RegistrationRepo};

pub(crate) struct TestDb {
    pub pool: PgPool,
}

impl TestDb {
    pub async fn connect() -> Self {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool creation failed");
        crate::db::migrations::run(&pool).await.expect("migrations failed");
        Self { pool }
    }

    /// Insert a registration with a random FSY ID and unique contact details.
    pub async fn registration(&self, kind: &str, status: &str) -> Registration {
        let fsy_id: i64 = rand::thread_rng().gen_range(10_000_000..i64::from(i32::MAX));
        sqlx::query(
            r#"
            INSERT INTO registrations
                (fsy_id, participant_type, first_name, last_name, gender, birth_date,
                 phone_number, email, stake_name, unit_name, status)
            VALUES ($1, $2, 'Test', $3, 'Female', DATE '2008-03-01',
                    $4, $5, 'Test Stake', 'Test Ward', $6)
            "#,
        )
        .bind(fsy_id)
        .bind(kind)
        .bind(format!("Registrant{}", fsy_id))
        .bind(format!("+63{}", fsy_id))
        .bind(format!("r{}@example.test", fsy_id))
        .bind(status)
        .execute(&self.pool)
        .await
        .expect("insert registration failed");

        RegistrationRepo::new(&self.pool)
            .get(fsy_id, None)
            .await
            .expect("registration not readable")
    }

    /// A company name no other test run will use.
    pub fn unique_name(prefix: &str) -> String {
        format!("{} {}", prefix, rand::thread_rng().gen::<u64>())
    }
}
