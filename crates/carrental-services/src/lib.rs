//! Business logic services for the car rental engine
//!
//! Services own their repositories behind `Arc` and are generic over the
//! repository traits, so the same code runs against PostgreSQL, the in-memory
//! store, or trait objects chosen at startup.
//!
//! # Services
//!
//! - `ClientAccountService` - client account CRUD and fee balance
//! - `ReservationService` - booking, pick-up, return, cancellation and search

pub mod client_account_service;
pub mod reservation_service;

pub use client_account_service::ClientAccountService;
pub use reservation_service::ReservationService;
