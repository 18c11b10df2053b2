//! Client account DTOs

use carrental_core::models::{ClientAccount, ClientAccountBalance};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Client account response
#[derive(Debug, Clone, Serialize)]
pub struct ClientAccountResponse {
    pub client_id: i32,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ClientAccount> for ClientAccountResponse {
    fn from(account: ClientAccount) -> Self {
        Self {
            client_id: account.client_id,
            email: account.email,
            full_name: account.full_name,
            phone: account.phone,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Client fee balance response
#[derive(Debug, Clone, Serialize)]
pub struct ClientAccountBalanceResponse {
    pub client_id: i32,
    pub total_rental_fee: Decimal,
    pub total_cancellation_fee: Decimal,
    pub total_fees: Decimal,
}

impl From<ClientAccountBalance> for ClientAccountBalanceResponse {
    fn from(balance: ClientAccountBalance) -> Self {
        Self {
            client_id: balance.client_id,
            total_rental_fee: balance.total_rental_fee,
            total_cancellation_fee: balance.total_cancellation_fee,
            total_fees: balance.total_fees,
        }
    }
}
