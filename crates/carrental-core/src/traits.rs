//! Common traits for repositories
//!
//! The services only talk to storage through these traits. Implementations
//! return records ordered by identifier ascending; filtering beyond identifier
//! lookups happens in the services.

use crate::error::AppError;
use crate::models::{ClientAccount, Reservation};
use async_trait::async_trait;

/// Generic repository trait for the operations both record sets share
#[async_trait]
pub trait Repository<T, ID>: Send + Sync {
    /// Find entity by ID
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, AppError>;

    /// All entities, ordered by ID ascending
    async fn list_all(&self) -> Result<Vec<T>, AppError>;

    /// Persist a new entity and return it with its assigned ID
    async fn create(&self, entity: &T) -> Result<T, AppError>;

    /// Update an existing entity
    async fn update(&self, entity: &T) -> Result<T, AppError>;
}

/// Client account repository trait
#[async_trait]
pub trait ClientAccountRepository: Repository<ClientAccount, i32> {
    /// Find the accounts with the given IDs, ordered by ID; unknown IDs are skipped
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<ClientAccount>, AppError>;
}

/// Reservation repository trait
///
/// `update` is an optimistic write: it fails with `AppError::StateConflict`
/// when the stored `version` no longer equals the version of the entity
/// passed in, and bumps the version on success.
#[async_trait]
pub trait ReservationRepository: Repository<Reservation, i32> {
    /// All reservations of one client, ordered by ID
    async fn list_by_client(&self, client_id: i32) -> Result<Vec<Reservation>, AppError>;

    /// Persist a new client account together with its first reservation.
    ///
    /// Both records are stored or neither is. The reservation is linked to the
    /// newly assigned client id, whatever `reservation.client_id` holds.
    async fn create_with_client(
        &self,
        client: &ClientAccount,
        reservation: &Reservation,
    ) -> Result<(ClientAccount, Reservation), AppError>;
}

/// Skip/take window over an ordered result set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub start_index: usize,
    pub max_items: Option<usize>,
}

impl Pagination {
    pub fn new(start_index: Option<u32>, max_items: Option<u32>) -> Self {
        Self {
            start_index: start_index.unwrap_or(0) as usize,
            max_items: max_items.map(|m| m as usize),
        }
    }

    /// Apply skip then take
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let skipped = items.into_iter().skip(self.start_index);
        match self.max_items {
            Some(max) => skipped.take(max).collect(),
            None => skipped.collect(),
        }
    }
}
