//! Domain models for the car rental engine
//!
//! This module contains all the core domain models used throughout the application.

pub mod car_type;
pub mod client_account;
pub mod reservation;

pub use car_type::{get_car_type, CarType, CarTypePricing};
pub use client_account::{
    ClientAccount, ClientAccountBalance, ClientAccountCreationParams,
    ClientAccountModificationParams, ClientContact,
};
pub use reservation::{
    duration_in_hours, Reservation, ReservationBrowsingParams, ReservationCancellationParams,
    ReservationCreationParams, ReservationStatus,
};
