//! Schema setup
//!
//! Every statement is idempotent so `fsyctl migrate` can run on each deploy.

use sqlx::PgPool;

/// Named DDL statements, applied in order.
const SCHEMA: &[(&str, &str)] = &[
    (
        "stakes",
        r#"
        CREATE TABLE IF NOT EXISTS stakes (
            stake_name TEXT PRIMARY KEY
        )
        "#,
    ),
    (
        "units",
        r#"
        CREATE TABLE IF NOT EXISTS units (
            unit_name TEXT PRIMARY KEY,
            stake_name TEXT NOT NULL REFERENCES stakes(stake_name) ON UPDATE CASCADE,
            leader_name TEXT,
            leader_phone TEXT,
            leader_email TEXT
        )
        "#,
    ),
    (
        "registrations",
        r#"
        CREATE TABLE IF NOT EXISTS registrations (
            fsy_id BIGINT PRIMARY KEY,
            participant_type TEXT NOT NULL
                CHECK (participant_type IN ('Participant', 'Counselor')),
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            preferred_name TEXT,
            gender TEXT,
            birth_date DATE,
            shirt_size TEXT,
            phone_number TEXT,
            email TEXT,
            father_name TEXT,
            father_email TEXT,
            father_phone_number TEXT,
            mother_name TEXT,
            mother_email TEXT,
            mother_phone_number TEXT,
            stake_name TEXT,
            unit_name TEXT,
            bishop_name TEXT,
            bishop_email TEXT,
            medical_information TEXT,
            dietary_information TEXT,
            status TEXT NOT NULL DEFAULT 'Pending',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "companies",
        r#"
        CREATE TABLE IF NOT EXISTS companies (
            company_id SERIAL PRIMARY KEY,
            company_number INTEGER,
            company_name TEXT NOT NULL UNIQUE,
            description TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "companies_groups",
        r#"
        CREATE TABLE IF NOT EXISTS companies_groups (
            group_id SERIAL PRIMARY KEY,
            company_id INTEGER NOT NULL REFERENCES companies(company_id) ON DELETE CASCADE,
            group_number INTEGER,
            group_name TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (group_id, company_id)
        )
        "#,
    ),
    (
        // The composite key ties a member's group to the member's company.
        // NO ACTION (not RESTRICT) so a company delete can cascade through
        // both paths within one statement.
        "company_members",
        r#"
        CREATE TABLE IF NOT EXISTS company_members (
            fsy_id BIGINT PRIMARY KEY REFERENCES registrations(fsy_id) ON DELETE CASCADE,
            company_id INTEGER NOT NULL REFERENCES companies(company_id) ON DELETE CASCADE,
            group_id INTEGER NOT NULL,
            joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            FOREIGN KEY (group_id, company_id)
                REFERENCES companies_groups(group_id, company_id) ON DELETE NO ACTION
        )
        "#,
    ),
    (
        "daily_events",
        r#"
        CREATE TABLE IF NOT EXISTS daily_events (
            event_id SERIAL PRIMARY KEY,
            event_name TEXT NOT NULL,
            day_number SMALLINT NOT NULL CHECK (day_number BETWEEN 1 AND 7),
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            description TEXT,
            attendance_required BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CHECK (end_time > start_time)
        )
        "#,
    ),
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id SERIAL PRIMARY KEY,
            full_name TEXT NOT NULL,
            email TEXT UNIQUE,
            phone_number TEXT,
            birth_date DATE,
            password_hash TEXT NOT NULL,
            user_type TEXT NOT NULL
                CHECK (user_type IN ('Coordinator', 'Counselor', 'Participant')),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_registrations_type_stake ON registrations(participant_type, stake_name, unit_name)",
    "CREATE INDEX IF NOT EXISTS idx_registrations_status ON registrations(status)",
    "CREATE INDEX IF NOT EXISTS idx_registrations_email ON registrations(email)",
    "CREATE INDEX IF NOT EXISTS idx_registrations_phone ON registrations(phone_number)",
    "CREATE INDEX IF NOT EXISTS idx_units_stake ON units(stake_name)",
    "CREATE INDEX IF NOT EXISTS idx_groups_company ON companies_groups(company_id)",
    "CREATE INDEX IF NOT EXISTS idx_members_company_group ON company_members(company_id, group_id)",
    "CREATE INDEX IF NOT EXISTS idx_events_schedule ON daily_events(day_number, start_time)",
];

/// Create all tables and indexes.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running migrations...");

    for (name, ddl) in SCHEMA {
        tracing::debug!(table = name, "ensuring table");
        sqlx::query(ddl).execute(pool).await?;
    }

    for ddl in INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }

    tracing::info!("Migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_idempotent_ddl() {
        for (name, ddl) in SCHEMA {
            assert!(
                ddl.contains("CREATE TABLE IF NOT EXISTS"),
                "{} is not idempotent",
                name
            );
            assert!(ddl.contains(name), "{} DDL does not create its table", name);
        }
        for ddl in INDEXES {
            assert!(ddl.starts_with("CREATE INDEX IF NOT EXISTS"));
        }
    }

    #[test]
    fn referenced_tables_come_first() {
        let position = |table: &str| SCHEMA.iter().position(|(n, _)| *n == table).unwrap();
        assert!(position("stakes") < position("units"));
        assert!(position("registrations") < position("company_members"));
        assert!(position("companies_groups") < position("company_members"));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn migrations_can_run_twice() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        run(&pool).await.unwrap();
        run(&pool).await.unwrap();
    }
}
