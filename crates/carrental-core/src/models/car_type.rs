//! Car type catalog
//!
//! Pricing parameters per car type. The table is built once on first use and
//! never mutated afterwards, so lookups need no locking.

use crate::error::AppError;
use crate::AppResult;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Car type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarType {
    Economy,
    Compact,
    Family,
    Premium,
    Luxury,
}

impl fmt::Display for CarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarType::Economy => write!(f, "economy"),
            CarType::Compact => write!(f, "compact"),
            CarType::Family => write!(f, "family"),
            CarType::Premium => write!(f, "premium"),
            CarType::Luxury => write!(f, "luxury"),
        }
    }
}

impl CarType {
    /// All catalog variants in code order
    pub const ALL: [CarType; 5] = [
        CarType::Economy,
        CarType::Compact,
        CarType::Family,
        CarType::Premium,
        CarType::Luxury,
    ];

    /// Storage code
    pub fn code(&self) -> i32 {
        match self {
            CarType::Economy => 1,
            CarType::Compact => 2,
            CarType::Family => 3,
            CarType::Premium => 4,
            CarType::Luxury => 5,
        }
    }

    /// Resolve a stored code back to a variant.
    ///
    /// An unknown code means the stored data and the catalog disagree, which is
    /// reported as a configuration error rather than bad input.
    pub fn from_code(code: i32) -> AppResult<Self> {
        CarType::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or_else(|| AppError::Configuration(format!("Unknown car type code: {}", code)))
    }
}

/// Pricing parameters for one car type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarTypePricing {
    pub car_type: CarType,

    /// Rental rate per hour
    pub rental_rate_fee: Decimal,

    /// Deposit as a percentage (0-100) of the rental fee
    pub deposit_fee_percentage: Decimal,

    /// Flat fee charged on cancellation, scaled by the cancellation rate
    pub cancellation_fee: Decimal,
}

impl CarTypePricing {
    /// Rental fee for a duration expressed in hours
    pub fn rental_fee(&self, hours: Decimal) -> AppResult<Decimal> {
        self.rental_rate_fee
            .checked_mul(hours)
            .ok_or_else(|| overflow("Rental fee", self.car_type))
    }

    /// Deposit held for a given rental fee
    pub fn deposit_fee(&self, rental_fee: Decimal) -> AppResult<Decimal> {
        self.deposit_fee_percentage
            .checked_div(Decimal::ONE_HUNDRED)
            .and_then(|share| rental_fee.checked_mul(share))
            .ok_or_else(|| overflow("Deposit fee", self.car_type))
    }

    /// Cancellation fee for a caller-supplied rate
    pub fn cancellation_fee_for(&self, rate: Decimal) -> AppResult<Decimal> {
        self.cancellation_fee
            .checked_mul(rate)
            .ok_or_else(|| overflow("Cancellation fee", self.car_type))
    }
}

fn overflow(fee: &str, car_type: CarType) -> AppError {
    AppError::invalid(format!(
        "{} for car type {} is out of the representable range",
        fee, car_type
    ))
}

static CATALOG: Lazy<HashMap<CarType, CarTypePricing>> = Lazy::new(|| {
    let entries = [
        (CarType::Economy, dec!(10.00), dec!(10), dec!(15.00)),
        (CarType::Compact, dec!(16.00), dec!(12), dec!(20.00)),
        (CarType::Family, dec!(24.00), dec!(15), dec!(25.00)),
        (CarType::Premium, dec!(40.00), dec!(20), dec!(50.00)),
        (CarType::Luxury, dec!(75.00), dec!(30), dec!(100.00)),
    ];

    entries
        .into_iter()
        .map(|(car_type, rate, deposit, cancellation)| {
            (
                car_type,
                CarTypePricing {
                    car_type,
                    rental_rate_fee: rate,
                    deposit_fee_percentage: deposit,
                    cancellation_fee: cancellation,
                },
            )
        })
        .collect()
});

/// Look up the pricing for a car type
pub fn get_car_type(car_type: CarType) -> AppResult<&'static CarTypePricing> {
    CATALOG.get(&car_type).ok_or_else(|| {
        AppError::Configuration(format!("Car type {} is missing from the catalog", car_type))
    })
}
