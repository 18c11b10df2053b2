//! Client account repository implementation
//!
//! Provides PostgreSQL-backed storage for client accounts.

use carrental_core::{
    models::ClientAccount,
    traits::{ClientAccountRepository, Repository},
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of ClientAccountRepository
pub struct PgClientAccountRepository {
    pool: PgPool,
}

impl PgClientAccountRepository {
    /// Create a new client account repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert on any executor, so a caller can enlist it in a transaction
    pub(crate) async fn insert<'e, E>(executor: E, entity: &ClientAccount) -> AppResult<ClientAccount>
    where
        E: PgExecutor<'e>,
    {
        debug!("Creating client account: {}", entity.email);

        let row = sqlx::query_as::<sqlx::Postgres, ClientAccountRow>(
            r#"
            INSERT INTO client_accounts (email, full_name, phone)
            VALUES ($1, $2, $3)
            RETURNING client_id, email, full_name, phone, created_at, updated_at
            "#,
        )
        .bind(&entity.email)
        .bind(&entity.full_name)
        .bind(&entity.phone)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            error!("Database error creating client account: {}", e);
            AppError::Database(format!("Failed to create client account: {}", e))
        })?;

        Ok(row.into())
    }
}

#[async_trait]
impl Repository<ClientAccount, i32> for PgClientAccountRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<ClientAccount>> {
        debug!("Finding client account by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, ClientAccountRow>(
            r#"
            SELECT client_id, email, full_name, phone, created_at, updated_at
            FROM client_accounts
            WHERE client_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding client account {}: {}", id, e);
            AppError::Database(format!("Failed to find client account: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> AppResult<Vec<ClientAccount>> {
        let rows = sqlx::query_as::<sqlx::Postgres, ClientAccountRow>(
            r#"
            SELECT client_id, email, full_name, phone, created_at, updated_at
            FROM client_accounts
            ORDER BY client_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing client accounts: {}", e);
            AppError::Database(format!("Failed to fetch client accounts: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &ClientAccount) -> AppResult<ClientAccount> {
        Self::insert(&self.pool, entity).await
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &ClientAccount) -> AppResult<ClientAccount> {
        debug!("Updating client account: {}", entity.client_id);

        let row = sqlx::query_as::<sqlx::Postgres, ClientAccountRow>(
            r#"
            UPDATE client_accounts
            SET email = $2,
                full_name = $3,
                phone = $4,
                updated_at = NOW()
            WHERE client_id = $1
            RETURNING client_id, email, full_name, phone, created_at, updated_at
            "#,
        )
        .bind(entity.client_id)
        .bind(&entity.email)
        .bind(&entity.full_name)
        .bind(&entity.phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Database error updating client account {}: {}",
                entity.client_id, e
            );
            AppError::Database(format!("Failed to update client account: {}", e))
        })?
        .ok_or(AppError::ClientNotFound(entity.client_id))?;

        Ok(row.into())
    }
}

#[async_trait]
impl ClientAccountRepository for PgClientAccountRepository {
    #[instrument(skip(self))]
    async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<ClientAccount>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<sqlx::Postgres, ClientAccountRow>(
            r#"
            SELECT client_id, email, full_name, phone, created_at, updated_at
            FROM client_accounts
            WHERE client_id = ANY($1)
            ORDER BY client_id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding client accounts by ids: {}", e);
            AppError::Database(format!("Failed to fetch client accounts: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct ClientAccountRow {
    client_id: i32,
    email: String,
    full_name: String,
    phone: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ClientAccountRow> for ClientAccount {
    fn from(row: ClientAccountRow) -> Self {
        Self {
            client_id: row.client_id,
            email: row.email,
            full_name: row.full_name,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
