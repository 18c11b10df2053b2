//! PostgreSQL connection pool management
//!
//! Opens the pool described by the `[database]` configuration section and
//! applies the embedded schema migrations.

use carrental_core::config::DatabaseConfig;
use carrental_core::{AppError, AppResult};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{info, warn};

/// Open a connection pool for the `postgres` storage backend.
///
/// Fails with `AppError::Configuration` when `database.url` is unset and with
/// `AppError::Pool` when the server cannot be reached. A `SELECT 1` round trip
/// is made before the pool is handed out.
///
/// ```no_run
/// use carrental_core::config::DatabaseConfig;
/// use carrental_db::create_pool;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: Some("postgresql://localhost/carrental".to_string()),
///         ..Default::default()
///     };
///     let pool = create_pool(&config).await?;
///     Ok(())
/// }
/// ```
pub async fn create_pool(config: &DatabaseConfig) -> AppResult<PgPool> {
    let url = config.url.as_deref().ok_or_else(|| {
        AppError::Configuration(
            "database.url must be set for the postgres storage backend".to_string(),
        )
    })?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(url)
        .await
        .map_err(|e| {
            warn!("Cannot reach the reservation database: {}", e);
            AppError::Pool(format!("Failed to connect to database: {}", e))
        })?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| AppError::Database(format!("Database health check failed: {}", e)))?;

    info!(
        max_connections = config.max_connections,
        acquire_timeout_secs = config.acquire_timeout_secs,
        "Reservation database pool ready"
    );
    Ok(pool)
}

/// Apply the embedded migrations
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| {
            warn!("Migration failed: {}", e);
            AppError::Database(format!("Failed to run migrations: {}", e))
        })?;

    info!("Database migrations applied");
    Ok(())
}

/// Configuration for the PostgreSQL tests, read from `DATABASE_URL`
#[cfg(test)]
pub(crate) fn test_config() -> DatabaseConfig {
    DatabaseConfig {
        url: Some(
            std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/carrental".to_string()),
        ),
        max_connections: 2,
        ..Default::default()
    }
}
