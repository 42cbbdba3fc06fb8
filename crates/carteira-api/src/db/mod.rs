//! # Database Persistence Layer
//!
//! Postgres persistence via SQLx.
//!
//! The database layer is **optional**. When `DATABASE_URL` is set, every
//! mutation is written through to PostgreSQL and the in-memory stores are
//! hydrated from it on startup. When absent, the API runs in-memory only
//! (suitable for development and testing).
//!
//! Each entity table implements [`Table`]; the generic service calls
//! through it without knowing any SQL.

pub mod investimentos;
pub mod pessoas;

use std::future::Future;

use carteira_core::Entity;
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Row-level persistence for one entity.
pub trait Table: Entity {
    /// Insert a freshly created record.
    fn insert(pool: &PgPool, record: &Self) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    /// Overwrite every column of an existing row. `false` if no row matched.
    fn update(
        pool: &PgPool,
        record: &Self,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    /// Delete a row by id. `false` if no row matched.
    fn delete(pool: &PgPool, id: i32) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    /// Load every row, ordered by id (startup hydration).
    fn load_all(pool: &PgPool) -> impl Future<Output = Result<Vec<Self>, sqlx::Error>> + Send;
}

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if no URL is configured (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool(database_url: Option<&str>) -> Result<Option<PgPool>, sqlx::Error> {
    let Some(url) = database_url else {
        tracing::warn!(
            "DATABASE_URL not set, running in-memory only mode. \
             State will not survive restarts."
        );
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}
