//! Client account model
//!
//! Identity of a renting client plus the parameter objects used to create and
//! modify it, and the fee balance aggregated over the client's reservations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::reservation::Reservation;
use crate::error::AppError;
use crate::validation::require_text;
use crate::AppResult;

/// Client account entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientAccount {
    /// Unique identifier, assigned by storage on creation
    pub client_id: i32,

    /// Contact email
    pub email: String,

    /// Client full name
    pub full_name: String,

    /// Contact phone
    pub phone: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl ClientAccount {
    /// Build an unsaved account from validated contact fields
    pub fn new(contact: ClientContact) -> Self {
        let now = Utc::now();
        Self {
            client_id: 0,
            email: contact.email,
            full_name: contact.full_name,
            phone: contact.phone,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the mutable contact fields
    pub fn apply(&mut self, contact: ClientContact) {
        self.email = contact.email;
        self.full_name = contact.full_name;
        self.phone = contact.phone;
        self.updated_at = Utc::now();
    }
}

/// Trimmed, non-empty contact fields extracted from parameter objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientContact {
    pub email: String,
    pub full_name: String,
    pub phone: String,
}

impl ClientContact {
    fn from_fields(
        email: &Option<String>,
        full_name: &Option<String>,
        phone: &Option<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            email: require_text(email.as_deref(), "email")?,
            full_name: require_text(full_name.as_deref(), "full name")?,
            phone: require_text(phone.as_deref(), "phone")?,
        })
    }
}

/// Client account creation parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ClientAccountCreationParams {
    #[validate(
        required(message = "email is required"),
        length(min = 1, max = 254, message = "email must be 1-254 characters")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "full name is required"),
        length(min = 1, max = 200, message = "full name must be 1-200 characters")
    )]
    pub full_name: Option<String>,

    #[validate(
        required(message = "phone is required"),
        length(min = 1, max = 50, message = "phone must be 1-50 characters")
    )]
    pub phone: Option<String>,
}

impl ClientAccountCreationParams {
    /// Validate and extract trimmed contact fields
    pub fn contact(&self) -> AppResult<ClientContact> {
        self.validate()?;
        ClientContact::from_fields(&self.email, &self.full_name, &self.phone)
    }
}

/// Client account modification parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ClientAccountModificationParams {
    /// Account being modified
    #[validate(range(min = 1, message = "client id must be positive"))]
    pub client_id: i32,

    #[validate(
        required(message = "email is required"),
        length(min = 1, max = 254, message = "email must be 1-254 characters")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "full name is required"),
        length(min = 1, max = 200, message = "full name must be 1-200 characters")
    )]
    pub full_name: Option<String>,

    #[validate(
        required(message = "phone is required"),
        length(min = 1, max = 50, message = "phone must be 1-50 characters")
    )]
    pub phone: Option<String>,
}

impl ClientAccountModificationParams {
    /// Validate and extract trimmed contact fields
    pub fn contact(&self) -> AppResult<ClientContact> {
        self.validate()?;
        ClientContact::from_fields(&self.email, &self.full_name, &self.phone)
    }
}

/// Fee totals across all reservations of one client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAccountBalance {
    pub client_id: i32,

    /// Rental fees of reservations that were not cancelled
    pub total_rental_fee: Decimal,

    /// Cancellation fees of cancelled reservations
    pub total_cancellation_fee: Decimal,

    /// Sum of both totals
    pub total_fees: Decimal,
}

impl ClientAccountBalance {
    /// Aggregate the balance of `client_id` over its reservations.
    ///
    /// Reservations of other clients in `reservations` are ignored. Totals
    /// that exceed the `Decimal` range fail with `AppError::Internal`.
    pub fn aggregate<'a, I>(client_id: i32, reservations: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = &'a Reservation>,
    {
        let mut total_rental_fee = Decimal::ZERO;
        let mut total_cancellation_fee = Decimal::ZERO;

        for reservation in reservations
            .into_iter()
            .filter(|r| r.client_id == client_id)
        {
            if reservation.is_cancelled {
                let fee = reservation.cancellation_fee.unwrap_or(Decimal::ZERO);
                total_cancellation_fee = add_fee(total_cancellation_fee, fee, client_id)?;
            } else {
                total_rental_fee = add_fee(total_rental_fee, reservation.rental_fee, client_id)?;
            }
        }

        Ok(Self {
            client_id,
            total_rental_fee,
            total_cancellation_fee,
            total_fees: add_fee(total_rental_fee, total_cancellation_fee, client_id)?,
        })
    }
}

fn add_fee(total: Decimal, fee: Decimal, client_id: i32) -> AppResult<Decimal> {
    total
        .checked_add(fee)
        .ok_or_else(|| AppError::Internal(format!("Fee balance of client {} overflowed", client_id)))
}
