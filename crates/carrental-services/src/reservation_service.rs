//! Reservation service
//!
//! Drives the reservation lifecycle:
//! - Book a car for a client, creating the client on the fly when needed
//! - Hand the car over and take it back
//! - Cancel a booking with a scaled cancellation fee
//! - Search reservations by client, pick-up date and state

use carrental_core::{
    models::{
        get_car_type, ClientAccount, Reservation, ReservationBrowsingParams,
        ReservationCreationParams,
    },
    traits::{ClientAccountRepository, Pagination, ReservationRepository},
    validation::{require, require_id, require_text, require_valid},
    AppError, AppResult,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::client_account_service::ClientAccountService;

/// Reservation service
pub struct ReservationService<C: ?Sized, R: ?Sized> {
    client_service: Arc<ClientAccountService<C, R>>,
    reservation_repo: Arc<R>,
}

impl<C, R> ReservationService<C, R>
where
    C: ClientAccountRepository + ?Sized,
    R: ReservationRepository + ?Sized,
{
    /// Create a new reservation service
    pub fn new(client_service: Arc<ClientAccountService<C, R>>, reservation_repo: Arc<R>) -> Self {
        Self {
            client_service,
            reservation_repo,
        }
    }

    /// Book a car
    ///
    /// The client is referenced by `client_id` or created from the embedded
    /// `client_account` parameters. All input is validated before anything is
    /// written, and a new client is stored together with the reservation in
    /// one repository call, so a failed booking never leaves a client behind.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if params are absent, neither client reference is
    ///   given, the plate is blank, the car type is missing, or the pick-up date
    ///   is not before the return date
    /// - `ClientNotFound` if `client_id` does not resolve
    #[instrument(skip(self, params))]
    pub async fn create_booking(
        &self,
        params: Option<ReservationCreationParams>,
    ) -> AppResult<Reservation> {
        let params = require_valid(params, "reservation creation parameters")?;
        let (client, mut reservation) = Self::validate_booking(params).map_err(|e| {
            warn!("Booking rejected: {}", e);
            e
        })?;

        let created = match client {
            ClientReference::Existing(client_id) => {
                reservation.client_id = self.client_service.get(client_id).await?.client_id;
                self.reservation_repo.create(&reservation).await?
            }
            ClientReference::New(account) => {
                let (account, created) = self
                    .reservation_repo
                    .create_with_client(&account, &reservation)
                    .await?;
                info!(
                    client_id = account.client_id,
                    "Client account created for {}", account.email
                );
                created
            }
        };

        info!(
            reservation_id = created.reservation_id,
            client_id = created.client_id,
            "Booked {} car {}: rental fee {}, deposit {}",
            created.car_type,
            created.car_plate_number,
            created.rental_fee,
            created.deposit_fee
        );
        Ok(created)
    }

    /// Check every booking input and price the reservation, without storage access
    fn validate_booking(
        params: ReservationCreationParams,
    ) -> AppResult<(ClientReference, Reservation)> {
        let client = match (params.client_id, params.client_account) {
            (Some(client_id), _) => ClientReference::Existing(require_id(client_id, "client")?),
            (None, Some(account)) => ClientReference::New(ClientAccount::new(account.contact()?)),
            (None, None) => {
                return Err(AppError::invalid(
                    "either client id or client account must be provided",
                ))
            }
        };

        let plate = require_text(params.car_plate_number.as_deref(), "car plate number")?;
        let car_type = require(params.car_type, "car type")?;
        let pick_up_date = require(params.pick_up_date, "pick-up date")?;
        let return_date = require(params.return_date, "return date")?;
        let pricing = get_car_type(car_type)?;

        let reservation = Reservation::book(0, plate, pricing, pick_up_date, return_date)?;
        Ok((client, reservation))
    }

    /// Hand the car over to the client
    #[instrument(skip(self))]
    pub async fn pick_up_car(&self, reservation_id: i32) -> AppResult<bool> {
        let mut reservation = self.load(reservation_id).await?;
        reservation.pick_up().map_err(|e| {
            warn!("Pick-up rejected: {}", e);
            e
        })?;

        self.reservation_repo.update(&reservation).await?;
        info!(reservation_id, "Car {} picked up", reservation.car_plate_number);
        Ok(true)
    }

    /// Take the car back from the client
    #[instrument(skip(self))]
    pub async fn return_car(&self, reservation_id: i32) -> AppResult<bool> {
        let mut reservation = self.load(reservation_id).await?;
        reservation.return_car().map_err(|e| {
            warn!("Return rejected: {}", e);
            e
        })?;

        self.reservation_repo.update(&reservation).await?;
        info!(reservation_id, "Car {} returned", reservation.car_plate_number);
        Ok(true)
    }

    /// Cancel a booking, charging the car type's flat fee times `cancellation_fee_rate`
    #[instrument(skip(self))]
    pub async fn cancel_reservation(
        &self,
        reservation_id: i32,
        cancellation_fee_rate: Decimal,
    ) -> AppResult<bool> {
        if cancellation_fee_rate < Decimal::ZERO {
            return Err(AppError::invalid(format!(
                "Cancellation fee rate must not be negative, got {}",
                cancellation_fee_rate
            )));
        }

        let mut reservation = self.load(reservation_id).await?;
        let pricing = get_car_type(reservation.car_type)?;
        reservation
            .cancel(pricing, cancellation_fee_rate)
            .map_err(|e| {
                warn!("Cancellation rejected: {}", e);
                e
            })?;

        let updated = self.reservation_repo.update(&reservation).await?;
        info!(
            reservation_id,
            "Reservation cancelled with fee {}",
            updated.cancellation_fee.unwrap_or(Decimal::ZERO)
        );
        Ok(true)
    }

    /// Search reservations
    ///
    /// Matches are ordered by reservation id, then `start_index` matches are
    /// skipped and at most `max_items` are returned.
    #[instrument(skip(self, params))]
    pub async fn find_reservations(
        &self,
        params: Option<ReservationBrowsingParams>,
    ) -> AppResult<Vec<Reservation>> {
        let params = require(params, "reservation browsing parameters")?;

        let mut matches: Vec<Reservation> = self
            .reservation_repo
            .list_all()
            .await?
            .into_iter()
            .filter(|r| params.matches_reservation(r))
            .collect();

        if params.filters_by_client() && !matches.is_empty() {
            let mut client_ids: Vec<i32> = matches.iter().map(|r| r.client_id).collect();
            client_ids.sort_unstable();
            client_ids.dedup();

            let clients: HashMap<i32, ClientAccount> = self
                .client_service
                .get_many(&client_ids)
                .await?
                .into_iter()
                .map(|c| (c.client_id, c))
                .collect();

            matches.retain(|r| {
                clients
                    .get(&r.client_id)
                    .is_some_and(|c| client_matches(&params, c))
            });
        }

        let page = Pagination::new(params.start_index, params.max_items);
        let result = page.apply(matches);

        debug!("Found {} reservations", result.len());
        Ok(result)
    }

    async fn load(&self, reservation_id: i32) -> AppResult<Reservation> {
        require_id(reservation_id, "reservation")?;

        self.reservation_repo
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| {
                warn!("Reservation {} not found", reservation_id);
                AppError::ReservationNotFound(reservation_id)
            })
    }
}

/// How a booking identifies its client
enum ClientReference {
    Existing(i32),
    /// Unsaved account built from the embedded contact details
    New(ClientAccount),
}

/// Trimmed, case-insensitive exact match on every non-blank client criterion
fn client_matches(params: &ReservationBrowsingParams, client: &ClientAccount) -> bool {
    let criteria = [
        (&params.client_email, &client.email),
        (&params.client_full_name, &client.full_name),
        (&params.client_phone, &client.phone),
    ];

    criteria.iter().all(|(wanted, actual)| match wanted.as_deref().map(str::trim) {
        Some(wanted) if !wanted.is_empty() => wanted.to_lowercase() == actual.trim().to_lowercase(),
        _ => true,
    })
}
