use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Establishes a connection pool to the PostgreSQL database.
///
/// Each request borrows one connection from this pool for the lifetime of a
/// single transaction and returns it when the transaction is dropped.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    if settings.url.trim().is_empty() {
        return Err(DbError::ConnectionConfigError(
            "DATABASE_URL must be set.".to_string(),
        ));
    }

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .connect(&settings.url)
        .await?;

    Ok(pool)
}

/// Statements that bring an empty database up to the current schema.
///
/// Every statement is idempotent, so this runs on each startup without any
/// version bookkeeping.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS diet_plans (
        id               SERIAL PRIMARY KEY,
        external_user_id VARCHAR(128) NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS meals (
        id           SERIAL PRIMARY KEY,
        meal_type    VARCHAR(128) NOT NULL,
        diet_plan_id INTEGER NOT NULL REFERENCES diet_plans (id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS foods (
        id       SERIAL PRIMARY KEY,
        name     VARCHAR(255) NOT NULL,
        quantity VARCHAR(255) NOT NULL,
        meal_id  INTEGER NOT NULL REFERENCES meals (id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_meals_diet_plan_id ON meals (diet_plan_id)",
    "CREATE INDEX IF NOT EXISTS idx_foods_meal_id ON foods (meal_id)",
];

/// Creates the `diet_plans`, `meals` and `foods` tables if they are absent.
pub async fn init_schema(pool: &PgPool) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;
    for statement in SCHEMA {
        sqlx::query(*statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    tracing::info!("Database schema is ready.");
    Ok(())
}
