//! Reservation DTOs

use carrental_core::models::{CarType, Reservation, ReservationStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Reservation response
#[derive(Debug, Clone, Serialize)]
pub struct ReservationResponse {
    pub reservation_id: i32,
    pub client_id: i32,
    pub car_plate_number: String,
    pub car_type: CarType,
    pub status: ReservationStatus,
    pub pick_up_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,
    pub rental_fee: Decimal,
    pub deposit_fee: Decimal,
    pub cancellation_fee_rate: Option<Decimal>,
    pub cancellation_fee: Option<Decimal>,
    pub is_picked_up: bool,
    pub is_returned: bool,
    pub is_cancelled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationResponse {
    fn from(reservation: Reservation) -> Self {
        Self {
            status: reservation.status(),
            reservation_id: reservation.reservation_id,
            client_id: reservation.client_id,
            car_plate_number: reservation.car_plate_number,
            car_type: reservation.car_type,
            pick_up_date: reservation.pick_up_date,
            return_date: reservation.return_date,
            rental_fee: reservation.rental_fee,
            deposit_fee: reservation.deposit_fee,
            cancellation_fee_rate: reservation.cancellation_fee_rate,
            cancellation_fee: reservation.cancellation_fee,
            is_picked_up: reservation.is_picked_up,
            is_returned: reservation.is_returned,
            is_cancelled: reservation.is_cancelled,
            created_at: reservation.created_at,
            updated_at: reservation.updated_at,
        }
    }
}

/// Outcome of a lifecycle transition
#[derive(Debug, Clone, Serialize)]
pub struct TransitionResponse {
    pub reservation_id: i32,
    pub success: bool,
}
