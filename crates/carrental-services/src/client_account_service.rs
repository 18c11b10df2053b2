//! Client account service
//!
//! Creates, modifies and looks up client accounts and aggregates the fee
//! balance over a client's reservations.

use carrental_core::{
    models::{
        ClientAccount, ClientAccountBalance, ClientAccountCreationParams,
        ClientAccountModificationParams,
    },
    traits::{ClientAccountRepository, ReservationRepository},
    validation::{require, require_id},
    AppError, AppResult,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Client account service
pub struct ClientAccountService<C: ?Sized, R: ?Sized> {
    client_repo: Arc<C>,
    reservation_repo: Arc<R>,
}

impl<C, R> ClientAccountService<C, R>
where
    C: ClientAccountRepository + ?Sized,
    R: ReservationRepository + ?Sized,
{
    /// Create a new client account service
    pub fn new(client_repo: Arc<C>, reservation_repo: Arc<R>) -> Self {
        Self {
            client_repo,
            reservation_repo,
        }
    }

    /// Register a new client account
    ///
    /// # Errors
    ///
    /// `InvalidParameter` when `params` is absent or any of email, full name
    /// and phone is missing or blank.
    #[instrument(skip(self, params))]
    pub async fn add(
        &self,
        params: Option<ClientAccountCreationParams>,
    ) -> AppResult<ClientAccount> {
        let params = require(params, "client account creation parameters")?;
        let contact = params.contact().map_err(|e| {
            warn!("Client account creation rejected: {}", e);
            e
        })?;

        let account = self.client_repo.create(&ClientAccount::new(contact)).await?;

        info!(
            client_id = account.client_id,
            "Client account created for {}", account.email
        );
        Ok(account)
    }

    /// Overwrite the contact fields of an existing account
    #[instrument(skip(self, params))]
    pub async fn update(
        &self,
        params: Option<ClientAccountModificationParams>,
    ) -> AppResult<ClientAccount> {
        let params = require(params, "client account modification parameters")?;
        let contact = params.contact().map_err(|e| {
            warn!("Client account modification rejected: {}", e);
            e
        })?;

        let mut account = self.get(params.client_id).await?;
        account.apply(contact);

        let updated = self.client_repo.update(&account).await?;
        info!(client_id = updated.client_id, "Client account updated");
        Ok(updated)
    }

    /// Look up an account by id
    #[instrument(skip(self))]
    pub async fn get(&self, client_id: i32) -> AppResult<ClientAccount> {
        require_id(client_id, "client")?;

        self.client_repo
            .find_by_id(client_id)
            .await?
            .ok_or_else(|| {
                warn!("Client account {} not found", client_id);
                AppError::ClientNotFound(client_id)
            })
    }

    /// Accounts for the given ids; unknown ids are skipped
    pub async fn get_many(&self, client_ids: &[i32]) -> AppResult<Vec<ClientAccount>> {
        self.client_repo.find_by_ids(client_ids).await
    }

    /// Aggregate rental and cancellation fees over the client's reservations
    #[instrument(skip(self))]
    pub async fn get_client_account_balance(
        &self,
        client_id: i32,
    ) -> AppResult<ClientAccountBalance> {
        let account = self.get(client_id).await?;
        let reservations = self.reservation_repo.list_by_client(account.client_id).await?;

        debug!(
            "Aggregating balance of client {} over {} reservations",
            client_id,
            reservations.len()
        );

        ClientAccountBalance::aggregate(client_id, &reservations)
    }
}
