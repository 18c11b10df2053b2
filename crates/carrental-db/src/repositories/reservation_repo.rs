//! Reservation repository implementation
//!
//! Provides PostgreSQL-backed storage for reservations. Updates are guarded by
//! the `version` column so that concurrent transitions on one reservation
//! cannot overwrite each other.

use carrental_core::{
    models::{CarType, ClientAccount, Reservation},
    traits::{Repository, ReservationRepository},
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use tracing::{debug, error, instrument, warn};

use super::client_account_repo::PgClientAccountRepository;

const RESERVATION_COLUMNS: &str = r#"
    reservation_id, client_id, car_plate_number, car_type,
    pick_up_date, return_date,
    rental_fee, deposit_fee, cancellation_fee_rate, cancellation_fee,
    is_picked_up, is_returned, is_cancelled,
    version, created_at, updated_at
"#;

/// PostgreSQL implementation of ReservationRepository
pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    /// Create a new reservation repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn convert(rows: Vec<ReservationRow>) -> AppResult<Vec<Reservation>> {
        rows.into_iter().map(Reservation::try_from).collect()
    }

    /// Insert on any executor, so a caller can enlist it in a transaction
    async fn insert<'e, E>(executor: E, entity: &Reservation) -> AppResult<Reservation>
    where
        E: PgExecutor<'e>,
    {
        debug!(
            "Creating reservation for client {}: {}",
            entity.client_id, entity.car_plate_number
        );

        let sql = format!(
            r#"
            INSERT INTO reservations (
                client_id, car_plate_number, car_type,
                pick_up_date, return_date,
                rental_fee, deposit_fee, cancellation_fee_rate, cancellation_fee,
                is_picked_up, is_returned, is_cancelled, version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 0)
            RETURNING {}
            "#,
            RESERVATION_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&sql)
            .bind(entity.client_id)
            .bind(&entity.car_plate_number)
            .bind(entity.car_type.code())
            .bind(entity.pick_up_date)
            .bind(entity.return_date)
            .bind(entity.rental_fee)
            .bind(entity.deposit_fee)
            .bind(entity.cancellation_fee_rate)
            .bind(entity.cancellation_fee)
            .bind(entity.is_picked_up)
            .bind(entity.is_returned)
            .bind(entity.is_cancelled)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                error!("Database error creating reservation: {}", e);
                AppError::Database(format!("Failed to create reservation: {}", e))
            })?;

        row.try_into()
    }
}

#[async_trait]
impl Repository<Reservation, i32> for PgReservationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Reservation>> {
        debug!("Finding reservation by id: {}", id);

        let sql = format!(
            "SELECT {} FROM reservations WHERE reservation_id = $1",
            RESERVATION_COLUMNS
        );

        let result = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding reservation {}: {}", id, e);
                AppError::Database(format!("Failed to find reservation: {}", e))
            })?;

        result.map(Reservation::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> AppResult<Vec<Reservation>> {
        let sql = format!(
            "SELECT {} FROM reservations ORDER BY reservation_id",
            RESERVATION_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing reservations: {}", e);
                AppError::Database(format!("Failed to fetch reservations: {}", e))
            })?;

        Self::convert(rows)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Reservation) -> AppResult<Reservation> {
        Self::insert(&self.pool, entity).await
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Reservation) -> AppResult<Reservation> {
        debug!(
            "Updating reservation {} at version {}",
            entity.reservation_id, entity.version
        );

        let sql = format!(
            r#"
            UPDATE reservations
            SET cancellation_fee_rate = $3,
                cancellation_fee = $4,
                is_picked_up = $5,
                is_returned = $6,
                is_cancelled = $7,
                version = version + 1,
                updated_at = NOW()
            WHERE reservation_id = $1 AND version = $2
            RETURNING {}
            "#,
            RESERVATION_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&sql)
            .bind(entity.reservation_id)
            .bind(entity.version)
            .bind(entity.cancellation_fee_rate)
            .bind(entity.cancellation_fee)
            .bind(entity.is_picked_up)
            .bind(entity.is_returned)
            .bind(entity.is_cancelled)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!(
                    "Database error updating reservation {}: {}",
                    entity.reservation_id, e
                );
                AppError::Database(format!("Failed to update reservation: {}", e))
            })?;

        match row {
            Some(row) => row.try_into(),
            None => {
                // Distinguish a stale version from a missing row
                if self.find_by_id(entity.reservation_id).await?.is_none() {
                    return Err(AppError::ReservationNotFound(entity.reservation_id));
                }
                warn!(
                    "Reservation {} was modified concurrently (expected version {})",
                    entity.reservation_id, entity.version
                );
                Err(AppError::conflict(format!(
                    "Reservation {} was modified concurrently",
                    entity.reservation_id
                )))
            }
        }
    }
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    #[instrument(skip(self))]
    async fn list_by_client(&self, client_id: i32) -> AppResult<Vec<Reservation>> {
        let sql = format!(
            "SELECT {} FROM reservations WHERE client_id = $1 ORDER BY reservation_id",
            RESERVATION_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&sql)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(
                    "Database error listing reservations for client {}: {}",
                    client_id, e
                );
                AppError::Database(format!("Failed to fetch reservations: {}", e))
            })?;

        Self::convert(rows)
    }

    #[instrument(skip(self, client, reservation))]
    async fn create_with_client(
        &self,
        client: &ClientAccount,
        reservation: &Reservation,
    ) -> AppResult<(ClientAccount, Reservation)> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Database(format!("Failed to start transaction: {}", e))
        })?;

        // An early return drops `tx`, which rolls the client insert back
        let account = PgClientAccountRepository::insert(&mut *tx, client).await?;
        let created = Self::insert(
            &mut *tx,
            &Reservation {
                client_id: account.client_id,
                ..reservation.clone()
            },
        )
        .await?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit booking for {}: {}", account.email, e);
            AppError::Database(format!("Failed to commit transaction: {}", e))
        })?;

        Ok((account, created))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct ReservationRow {
    reservation_id: i32,
    client_id: i32,
    car_plate_number: String,
    car_type: i32,
    pick_up_date: DateTime<Utc>,
    return_date: DateTime<Utc>,
    rental_fee: Decimal,
    deposit_fee: Decimal,
    cancellation_fee_rate: Option<Decimal>,
    cancellation_fee: Option<Decimal>,
    is_picked_up: bool,
    is_returned: bool,
    is_cancelled: bool,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = AppError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            reservation_id: row.reservation_id,
            client_id: row.client_id,
            car_plate_number: row.car_plate_number,
            car_type: CarType::from_code(row.car_type)?,
            pick_up_date: row.pick_up_date,
            return_date: row.return_date,
            rental_fee: row.rental_fee,
            deposit_fee: row.deposit_fee,
            cancellation_fee_rate: row.cancellation_fee_rate,
            cancellation_fee: row.cancellation_fee,
            is_picked_up: row.is_picked_up,
            is_returned: row.is_returned,
            is_cancelled: row.is_cancelled,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
