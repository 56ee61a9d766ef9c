use crate::config::{DatabaseSettings, PoolSettings};
use anyhow::{Context, Result};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};

pub async fn create_pool(database: &DatabaseSettings, pool: &PoolSettings) -> Result<PgPool> {
    tracing::info!(
        "Connecting to database: {}",
        database.redacted_connection_string()
    );

    let db_pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .min_connections(database.min_connections)
        .acquire_timeout(pool.acquire_timeout())
        .idle_timeout(pool.idle_timeout())
        .max_lifetime(pool.max_lifetime())
        .connect_with(connect_options(database)?)
        .await
        .context("Failed to create database connection pool")?;

    // Try to acquire a connection to verify the pool is working
    db_pool
        .acquire()
        .await
        .context("Failed to acquire initial database connection")?;

    tracing::info!(
        "Database pool established with {} max connections",
        database.max_connections
    );

    Ok(db_pool)
}

/// Driver options for `database`, including any `DATABASE_URL` query parameters.
pub fn connect_options(database: &DatabaseSettings) -> Result<PgConnectOptions> {
    database
        .connection_string()
        .parse::<PgConnectOptions>()
        .context("Invalid database connection options")
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations applied");
    Ok(())
}
