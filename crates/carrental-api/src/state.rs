//! Shared application state

use std::sync::Arc;

use carrental_core::traits::{ClientAccountRepository, ReservationRepository};
use carrental_services::{ClientAccountService, ReservationService};

/// Client account service over whichever storage backend was configured
pub type DynClientAccountService =
    ClientAccountService<dyn ClientAccountRepository, dyn ReservationRepository>;

/// Reservation service over whichever storage backend was configured
pub type DynReservationService =
    ReservationService<dyn ClientAccountRepository, dyn ReservationRepository>;

/// Services shared by every worker
#[derive(Clone)]
pub struct AppState {
    pub clients: Arc<DynClientAccountService>,
    pub reservations: Arc<DynReservationService>,
}

impl AppState {
    /// Wire both services on top of the given repositories
    pub fn new(
        client_repo: Arc<dyn ClientAccountRepository>,
        reservation_repo: Arc<dyn ReservationRepository>,
    ) -> Self {
        let clients = Arc::new(ClientAccountService::new(
            client_repo,
            reservation_repo.clone(),
        ));
        let reservations = Arc::new(ReservationService::new(clients.clone(), reservation_repo));

        Self {
            clients,
            reservations,
        }
    }
}
