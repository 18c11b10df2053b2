//! CarRental Storage Layer
//!
//! This crate provides the repository implementations the services run against:
//!
//! - PostgreSQL repositories and connection pool management with sqlx
//! - Process-local repositories for tests and the `memory` storage backend
//! - Embedded schema migrations

pub mod pool;
pub mod repositories;

pub use pool::{create_pool, run_migrations};
pub use repositories::*;

// Re-export commonly used types
pub use carrental_core::{AppError, AppResult};
pub use sqlx::PgPool;
