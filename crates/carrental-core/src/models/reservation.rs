//! Reservation model
//!
//! A reservation links a client to a car type and plate for a date range and
//! tracks its lifecycle:
//!
//! ```text
//! Booked -> PickedUp -> Returned
//!    \
//!     `-> Cancelled
//! ```
//!
//! Returned and Cancelled are terminal. Every other transition is rejected with
//! `AppError::StateConflict`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use super::car_type::{CarType, CarTypePricing};
use super::client_account::ClientAccountCreationParams;
use crate::error::AppError;
use crate::AppResult;

/// Lifecycle state derived from the reservation flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Created, car not yet picked up
    Booked,
    /// Car handed over to the client
    PickedUp,
    /// Car returned
    Returned,
    /// Cancelled before pickup
    Cancelled,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationStatus::Booked => write!(f, "booked"),
            ReservationStatus::PickedUp => write!(f, "picked_up"),
            ReservationStatus::Returned => write!(f, "returned"),
            ReservationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Reservation entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique identifier, assigned by storage on creation
    pub reservation_id: i32,

    /// Owning client account
    pub client_id: i32,

    pub car_plate_number: String,

    pub car_type: CarType,

    pub pick_up_date: DateTime<Utc>,

    pub return_date: DateTime<Utc>,

    /// Hourly rate times rental duration, fixed at creation
    pub rental_fee: Decimal,

    /// Deposit percentage of the rental fee, fixed at creation
    pub deposit_fee: Decimal,

    /// Rate supplied on cancellation
    pub cancellation_fee_rate: Option<Decimal>,

    /// Flat car type fee times the cancellation rate
    pub cancellation_fee: Option<Decimal>,

    pub is_picked_up: bool,

    pub is_returned: bool,

    pub is_cancelled: bool,

    /// Optimistic concurrency token, bumped by storage on every update
    pub version: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

const MICROS_PER_HOUR: i64 = 3_600_000_000;
const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Rental duration in (possibly fractional) hours, at microsecond precision.
///
/// Spans too long to count in microseconds fall back to milliseconds.
pub fn duration_in_hours(from: DateTime<Utc>, to: DateTime<Utc>) -> Decimal {
    let span = to - from;
    match span.num_microseconds() {
        Some(micros) => Decimal::from(micros) / Decimal::from(MICROS_PER_HOUR),
        None => Decimal::from(span.num_milliseconds()) / Decimal::from(MILLIS_PER_HOUR),
    }
}

impl Reservation {
    /// Build an unsaved, freshly booked reservation with computed fees
    pub fn book(
        client_id: i32,
        car_plate_number: String,
        pricing: &CarTypePricing,
        pick_up_date: DateTime<Utc>,
        return_date: DateTime<Utc>,
    ) -> AppResult<Self> {
        if pick_up_date >= return_date {
            return Err(AppError::invalid(format!(
                "Pick-up date {} must be before return date {}",
                pick_up_date, return_date
            )));
        }

        let rental_fee = pricing.rental_fee(duration_in_hours(pick_up_date, return_date))?;
        let deposit_fee = pricing.deposit_fee(rental_fee)?;
        let now = Utc::now();

        Ok(Self {
            reservation_id: 0,
            client_id,
            car_plate_number,
            car_type: pricing.car_type,
            pick_up_date,
            return_date,
            rental_fee,
            deposit_fee,
            cancellation_fee_rate: None,
            cancellation_fee: None,
            is_picked_up: false,
            is_returned: false,
            is_cancelled: false,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Current lifecycle state
    pub fn status(&self) -> ReservationStatus {
        if self.is_cancelled {
            ReservationStatus::Cancelled
        } else if self.is_returned {
            ReservationStatus::Returned
        } else if self.is_picked_up {
            ReservationStatus::PickedUp
        } else {
            ReservationStatus::Booked
        }
    }

    /// Booked and untouched since
    #[inline]
    pub fn is_booked(&self) -> bool {
        self.status() == ReservationStatus::Booked
    }

    /// Booked -> PickedUp
    pub fn pick_up(&mut self) -> AppResult<()> {
        match self.status() {
            ReservationStatus::Booked => {
                self.is_picked_up = true;
                self.updated_at = Utc::now();
                Ok(())
            }
            status => Err(self.conflict("pick up", status)),
        }
    }

    /// PickedUp -> Returned
    pub fn return_car(&mut self) -> AppResult<()> {
        match self.status() {
            ReservationStatus::PickedUp => {
                self.is_returned = true;
                self.updated_at = Utc::now();
                Ok(())
            }
            status => Err(self.conflict("return", status)),
        }
    }

    /// Booked -> Cancelled, charging the car type's flat fee scaled by `rate`
    pub fn cancel(&mut self, pricing: &CarTypePricing, rate: Decimal) -> AppResult<()> {
        if rate < Decimal::ZERO {
            return Err(AppError::invalid(format!(
                "Cancellation fee rate must not be negative, got {}",
                rate
            )));
        }

        match self.status() {
            ReservationStatus::Booked => {
                let fee = pricing.cancellation_fee_for(rate)?;
                self.is_cancelled = true;
                self.cancellation_fee_rate = Some(rate);
                self.cancellation_fee = Some(fee);
                self.updated_at = Utc::now();
                Ok(())
            }
            status => Err(self.conflict("cancel", status)),
        }
    }

    fn conflict(&self, action: &str, status: ReservationStatus) -> AppError {
        AppError::conflict(format!(
            "Cannot {} reservation {}: it is {}",
            action, self.reservation_id, status
        ))
    }
}

/// Reservation creation parameters
///
/// The client is either referenced by `client_id` or created on the fly from
/// `client_account`; `client_id` wins when both are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ReservationCreationParams {
    #[validate(range(min = 1, message = "client id must be positive"))]
    pub client_id: Option<i32>,

    pub client_account: Option<ClientAccountCreationParams>,

    #[validate(
        required(message = "car plate number is required"),
        length(min = 1, max = 20, message = "car plate number must be 1-20 characters")
    )]
    pub car_plate_number: Option<String>,

    #[validate(required(message = "car type is required"))]
    pub car_type: Option<CarType>,

    #[validate(required(message = "pick-up date is required"))]
    pub pick_up_date: Option<DateTime<Utc>>,

    #[validate(required(message = "return date is required"))]
    pub return_date: Option<DateTime<Utc>>,
}

/// Reservation search parameters
///
/// Every criterion is optional; absent criteria do not filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationBrowsingParams {
    pub client_email: Option<String>,
    pub client_full_name: Option<String>,
    pub client_phone: Option<String>,

    /// Inclusive lower bound on the pick-up date
    pub pick_up_date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the pick-up date
    pub pick_up_date_to: Option<DateTime<Utc>>,

    pub is_booked: Option<bool>,
    pub is_picked_up: Option<bool>,
    pub is_returned: Option<bool>,
    pub is_cancelled: Option<bool>,

    /// Number of matches to skip
    pub start_index: Option<u32>,
    /// Maximum number of matches to return
    pub max_items: Option<u32>,
}

impl ReservationBrowsingParams {
    /// Whether any client attribute criterion is set
    pub fn filters_by_client(&self) -> bool {
        [&self.client_email, &self.client_full_name, &self.client_phone]
            .iter()
            .any(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }

    /// Date range and state flag criteria
    pub fn matches_reservation(&self, reservation: &Reservation) -> bool {
        if let Some(from) = self.pick_up_date_from {
            if reservation.pick_up_date < from {
                return false;
            }
        }
        if let Some(to) = self.pick_up_date_to {
            if reservation.pick_up_date > to {
                return false;
            }
        }

        let flags = [
            (self.is_booked, reservation.is_booked()),
            (self.is_picked_up, reservation.is_picked_up),
            (self.is_returned, reservation.is_returned),
            (self.is_cancelled, reservation.is_cancelled),
        ];

        flags
            .iter()
            .all(|(wanted, actual)| wanted.map_or(true, |w| w == *actual))
    }
}

/// Reservation cancellation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCancellationParams {
    #[serde(alias = "rezervation_id")]
    pub reservation_id: i32,

    /// Multiplier applied to the car type's flat cancellation fee
    pub cancellation_fee_rate: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::get_car_type;
    use crate::ErrorKind;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    fn family_booking(days: i64) -> Reservation {
        let pricing = get_car_type(CarType::Family).unwrap();
        let pick_up = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        Reservation::book(
            1,
            "CA1234AC".to_string(),
            pricing,
            pick_up,
            pick_up + Duration::days(days),
        )
        .unwrap()
    }

    #[test]
    fn test_book_computes_fees() {
        let reservation = family_booking(4);

        assert_eq!(reservation.rental_fee, dec!(2304.00));
        assert_eq!(reservation.deposit_fee, dec!(345.60));
        assert_eq!(reservation.status(), ReservationStatus::Booked);
        assert!(reservation.cancellation_fee_rate.is_none());
        assert!(reservation.cancellation_fee.is_none());
    }

    #[test]
    fn test_book_fractional_hours() {
        let pricing = get_car_type(CarType::Economy).unwrap();
        let pick_up = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let reservation = Reservation::book(
            1,
            "B777".to_string(),
            pricing,
            pick_up,
            pick_up + Duration::minutes(90),
        )
        .unwrap();

        assert_eq!(reservation.rental_fee, dec!(15.00));
        assert_eq!(reservation.deposit_fee, dec!(1.50));
    }

    #[test]
    fn test_book_sub_millisecond_duration_is_charged() {
        let pricing = get_car_type(CarType::Economy).unwrap();
        let pick_up = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let reservation = Reservation::book(
            1,
            "B777".to_string(),
            pricing,
            pick_up,
            pick_up + Duration::microseconds(500),
        )
        .unwrap();

        assert!(reservation.rental_fee > Decimal::ZERO);
        assert!(reservation.deposit_fee > Decimal::ZERO);
        assert_eq!(
            duration_in_hours(pick_up, pick_up + Duration::microseconds(1_800_000_000)),
            dec!(0.5)
        );
    }

    #[test]
    fn test_book_rejects_inverted_dates() {
        let pricing = get_car_type(CarType::Family).unwrap();
        let now = Utc::now();

        let err = Reservation::book(1, "X".to_string(), pricing, now, now).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);

        let err = Reservation::book(1, "X".to_string(), pricing, now, now - Duration::hours(1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_pick_up_then_return() {
        let mut reservation = family_booking(1);

        let err = reservation.return_car().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);

        reservation.pick_up().unwrap();
        assert_eq!(reservation.status(), ReservationStatus::PickedUp);
        assert_eq!(
            reservation.pick_up().unwrap_err().kind(),
            ErrorKind::StateConflict
        );

        reservation.return_car().unwrap();
        assert!(reservation.is_picked_up);
        assert!(reservation.is_returned);
        assert_eq!(reservation.status(), ReservationStatus::Returned);
        assert_eq!(
            reservation.return_car().unwrap_err().kind(),
            ErrorKind::StateConflict
        );
    }

    #[test]
    fn test_cancel() {
        let pricing = get_car_type(CarType::Family).unwrap();
        let mut reservation = family_booking(2);

        reservation.cancel(pricing, dec!(2.00)).unwrap();
        assert_eq!(reservation.status(), ReservationStatus::Cancelled);
        assert_eq!(reservation.cancellation_fee_rate, Some(dec!(2.00)));
        assert_eq!(reservation.cancellation_fee, Some(dec!(50.00)));

        let err = reservation.cancel(pricing, dec!(1.00)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert_eq!(reservation.cancellation_fee, Some(dec!(50.00)));

        assert_eq!(
            reservation.pick_up().unwrap_err().kind(),
            ErrorKind::StateConflict
        );
    }

    #[test]
    fn test_cancel_after_pick_up_is_rejected() {
        let pricing = get_car_type(CarType::Family).unwrap();
        let mut reservation = family_booking(2);
        reservation.pick_up().unwrap();

        let err = reservation.cancel(pricing, dec!(1.00)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert!(!reservation.is_cancelled);
    }

    #[test]
    fn test_cancel_rejects_negative_rate() {
        let pricing = get_car_type(CarType::Family).unwrap();
        let mut reservation = family_booking(2);

        let err = reservation.cancel(pricing, dec!(-1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert!(reservation.is_booked());
    }

    #[test]
    fn test_cancel_with_oversized_rate_keeps_booking() {
        let pricing = get_car_type(CarType::Luxury).unwrap();
        let pick_up = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let mut reservation = Reservation::book(
            1,
            "LX0001".to_string(),
            pricing,
            pick_up,
            pick_up + Duration::days(1),
        )
        .unwrap();

        let rate = Decimal::from_str("1000000000000000000000000000").unwrap();
        let err = reservation.cancel(pricing, rate).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert!(reservation.is_booked());
        assert!(reservation.cancellation_fee_rate.is_none());
        assert!(reservation.cancellation_fee.is_none());
    }

    #[test]
    fn test_browsing_flags() {
        let mut reservation = family_booking(1);
        reservation.pick_up().unwrap();

        let picked_up = ReservationBrowsingParams {
            is_picked_up: Some(true),
            ..Default::default()
        };
        let booked = ReservationBrowsingParams {
            is_booked: Some(true),
            ..Default::default()
        };
        assert!(picked_up.matches_reservation(&reservation));
        assert!(!booked.matches_reservation(&reservation));

        reservation.return_car().unwrap();
        let returned = ReservationBrowsingParams {
            is_returned: Some(true),
            ..Default::default()
        };
        assert!(picked_up.matches_reservation(&reservation));
        assert!(returned.matches_reservation(&reservation));
    }

    #[test]
    fn test_browsing_date_range_is_inclusive() {
        let reservation = family_booking(1);
        let params = ReservationBrowsingParams {
            pick_up_date_from: Some(reservation.pick_up_date),
            pick_up_date_to: Some(reservation.pick_up_date),
            ..Default::default()
        };
        assert!(params.matches_reservation(&reservation));

        let params = ReservationBrowsingParams {
            pick_up_date_from: Some(reservation.pick_up_date + Duration::seconds(1)),
            ..Default::default()
        };
        assert!(!params.matches_reservation(&reservation));
    }

    #[test]
    fn test_cancellation_params_accept_legacy_field_name() {
        let params: ReservationCancellationParams =
            serde_json::from_str(r#"{"rezervation_id": 4, "cancellation_fee_rate": "1.5"}"#)
                .unwrap();
        assert_eq!(params.reservation_id, 4);
        assert_eq!(params.cancellation_fee_rate, dec!(1.5));
    }
}
