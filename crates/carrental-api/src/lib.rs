//! API layer for the car rental engine
//!
//! HTTP handlers for client accounts and reservations. Handlers only translate
//! between HTTP and the services; every rule lives in `carrental-services`.

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;
pub mod state;

// Re-export DTOs (common types)
pub use dto::ApiResponse;

pub use handlers::{configure_api, query_config};
pub use state::AppState;
