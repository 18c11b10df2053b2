//! Repository implementations
//!
//! Concrete implementations of the repository traits defined in carrental-core.

pub mod client_account_repo;
pub mod memory;
pub mod reservation_repo;

pub use client_account_repo::PgClientAccountRepository;
pub use memory::{InMemoryClientAccountRepository, InMemoryReservationRepository};
pub use reservation_repo::PgReservationRepository;
