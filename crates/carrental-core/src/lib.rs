//! CarRental Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the car rental reservation engine. It includes:
//!
//! - Domain models (ClientAccount, Reservation, CarType catalog)
//! - Parameter objects accepted by the services
//! - Repository traits for the storage collaborator
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;
pub mod validation;

pub use config::AppConfig;
pub use error::{AppError, ErrorKind};

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
