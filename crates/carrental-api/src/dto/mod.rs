//! Data Transfer Objects (DTOs) for API requests and responses
//!
//! Request bodies reuse the parameter objects from `carrental-core`; only the
//! responses have their own shapes here.

pub mod client;
pub mod common;
pub mod reservation;

pub use client::*;
pub use common::*;
pub use reservation::*;
