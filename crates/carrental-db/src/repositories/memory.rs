//! In-memory repository implementations
//!
//! Used for development, tests and the `memory` storage backend. Records live
//! in ordered maps so listings come back in identifier order without sorting.
//! The reservation store shares the client store so that a booking with a new
//! client is written under one lock.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use carrental_core::{
    models::{ClientAccount, Reservation},
    traits::{ClientAccountRepository, Repository, ReservationRepository},
    AppError, AppResult,
};
use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, warn};

/// In-memory client account storage
pub struct InMemoryClientAccountRepository {
    accounts: RwLock<BTreeMap<i32, ClientAccount>>,
    id_counter: AtomicI32,
}

impl InMemoryClientAccountRepository {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(BTreeMap::new()),
            id_counter: AtomicI32::new(1),
        }
    }

    fn insert(&self, entity: &ClientAccount) -> ClientAccount {
        let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();

        let account = ClientAccount {
            client_id: id,
            created_at: now,
            updated_at: now,
            ..entity.clone()
        };
        self.accounts.write().insert(id, account.clone());

        debug!("Stored client account {}", id);
        account
    }
}

impl Default for InMemoryClientAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository<ClientAccount, i32> for InMemoryClientAccountRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<ClientAccount>> {
        Ok(self.accounts.read().get(&id).cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<ClientAccount>> {
        Ok(self.accounts.read().values().cloned().collect())
    }

    async fn create(&self, entity: &ClientAccount) -> AppResult<ClientAccount> {
        Ok(self.insert(entity))
    }

    async fn update(&self, entity: &ClientAccount) -> AppResult<ClientAccount> {
        let mut accounts = self.accounts.write();
        let stored = accounts
            .get_mut(&entity.client_id)
            .ok_or(AppError::ClientNotFound(entity.client_id))?;

        stored.email = entity.email.clone();
        stored.full_name = entity.full_name.clone();
        stored.phone = entity.phone.clone();
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }
}

#[async_trait]
impl ClientAccountRepository for InMemoryClientAccountRepository {
    async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<ClientAccount>> {
        let accounts = self.accounts.read();
        Ok(accounts
            .values()
            .filter(|a| ids.contains(&a.client_id))
            .cloned()
            .collect())
    }
}

/// In-memory reservation storage with optimistic version checks
pub struct InMemoryReservationRepository {
    reservations: RwLock<BTreeMap<i32, Reservation>>,
    id_counter: AtomicI32,
    clients: Arc<InMemoryClientAccountRepository>,
}

impl InMemoryReservationRepository {
    /// Reservation store whose bookings may create accounts in `clients`
    pub fn new(clients: Arc<InMemoryClientAccountRepository>) -> Self {
        Self {
            reservations: RwLock::new(BTreeMap::new()),
            id_counter: AtomicI32::new(1),
            clients,
        }
    }

    fn insert(
        &self,
        reservations: &mut BTreeMap<i32, Reservation>,
        entity: &Reservation,
    ) -> Reservation {
        let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();

        let reservation = Reservation {
            reservation_id: id,
            version: 0,
            created_at: now,
            updated_at: now,
            ..entity.clone()
        };
        reservations.insert(id, reservation.clone());

        debug!(
            "Stored reservation {} for client {}",
            id, reservation.client_id
        );
        reservation
    }
}

#[async_trait]
impl Repository<Reservation, i32> for InMemoryReservationRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Reservation>> {
        Ok(self.reservations.read().get(&id).cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<Reservation>> {
        Ok(self.reservations.read().values().cloned().collect())
    }

    async fn create(&self, entity: &Reservation) -> AppResult<Reservation> {
        let mut reservations = self.reservations.write();
        Ok(self.insert(&mut reservations, entity))
    }

    async fn update(&self, entity: &Reservation) -> AppResult<Reservation> {
        let mut reservations = self.reservations.write();
        let stored = reservations
            .get_mut(&entity.reservation_id)
            .ok_or(AppError::ReservationNotFound(entity.reservation_id))?;

        if stored.version != entity.version {
            warn!(
                "Reservation {} was modified concurrently (expected version {}, found {})",
                entity.reservation_id, entity.version, stored.version
            );
            return Err(AppError::conflict(format!(
                "Reservation {} was modified concurrently",
                entity.reservation_id
            )));
        }

        stored.cancellation_fee_rate = entity.cancellation_fee_rate;
        stored.cancellation_fee = entity.cancellation_fee;
        stored.is_picked_up = entity.is_picked_up;
        stored.is_returned = entity.is_returned;
        stored.is_cancelled = entity.is_cancelled;
        stored.version += 1;
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn list_by_client(&self, client_id: i32) -> AppResult<Vec<Reservation>> {
        let reservations = self.reservations.read();
        Ok(reservations
            .values()
            .filter(|r| r.client_id == client_id)
            .cloned()
            .collect())
    }

    async fn create_with_client(
        &self,
        client: &ClientAccount,
        reservation: &Reservation,
    ) -> AppResult<(ClientAccount, Reservation)> {
        // Nothing below can fail, and readers never see the reservation
        // without its client
        let mut reservations = self.reservations.write();
        let account = self.clients.insert(client);
        let created = self.insert(
            &mut reservations,
            &Reservation {
                client_id: account.client_id,
                ..reservation.clone()
            },
        );
        Ok((account, created))
    }
}
