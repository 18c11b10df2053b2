//! Reservation service tests against the in-memory repositories

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use carrental_core::models::{
    get_car_type, CarType, ClientAccount, ClientAccountCreationParams, Reservation,
    ReservationBrowsingParams, ReservationCreationParams,
};
use carrental_core::traits::{Repository, ReservationRepository};
use carrental_core::{AppResult, ErrorKind};
use carrental_db::{InMemoryClientAccountRepository, InMemoryReservationRepository};
use carrental_services::{ClientAccountService, ReservationService};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

type Clients = ClientAccountService<InMemoryClientAccountRepository, InMemoryReservationRepository>;
type Reservations =
    ReservationService<InMemoryClientAccountRepository, InMemoryReservationRepository>;

struct Fixture {
    clients: Arc<Clients>,
    reservations: Reservations,
    reservation_repo: Arc<InMemoryReservationRepository>,
}

fn fixture() -> Fixture {
    let client_repo = Arc::new(InMemoryClientAccountRepository::new());
    let reservation_repo = Arc::new(InMemoryReservationRepository::new(client_repo.clone()));
    let clients = Arc::new(ClientAccountService::new(
        client_repo,
        reservation_repo.clone(),
    ));
    let reservations = ReservationService::new(clients.clone(), reservation_repo.clone());
    Fixture {
        clients,
        reservations,
        reservation_repo,
    }
}

fn base_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 10, 0, 0, 0).unwrap()
}

fn client(n: u32) -> ClientAccountCreationParams {
    ClientAccountCreationParams {
        email: Some(format!("client{}@mail.com", n)),
        full_name: Some(format!("Client Name {}", n)),
        phone: Some(format!("+{}", 11111 * n)),
    }
}

fn booking_for(client_id: i32, pick_up: DateTime<Utc>, days: i64) -> ReservationCreationParams {
    ReservationCreationParams {
        client_id: Some(client_id),
        client_account: None,
        car_plate_number: Some("CA1234AC".to_string()),
        car_type: Some(CarType::Family),
        pick_up_date: Some(pick_up),
        return_date: Some(pick_up + Duration::days(days)),
    }
}

#[tokio::test]
async fn test_create_booking() {
    let f = fixture();
    let pick_up = base_date() + Duration::days(1);

    let params = ReservationCreationParams {
        client_id: None,
        client_account: Some(ClientAccountCreationParams {
            email: Some("client_rez_1@mail.com".to_string()),
            full_name: Some("Client_Rez_1".to_string()),
            phone: Some("+12345".to_string()),
        }),
        car_plate_number: Some("CA1234AC".to_string()),
        car_type: Some(CarType::Family),
        pick_up_date: Some(pick_up),
        return_date: Some(pick_up + Duration::days(4)),
    };

    let reservation = f.reservations.create_booking(Some(params)).await.unwrap();

    assert!(reservation.reservation_id > 0);
    assert!(reservation.client_id > 0);
    assert_eq!(reservation.pick_up_date, pick_up);
    assert_eq!(reservation.return_date, pick_up + Duration::days(4));
    assert_eq!(reservation.car_plate_number, "CA1234AC");
    assert_eq!(reservation.car_type, CarType::Family);
    assert!(!reservation.is_picked_up);
    assert!(!reservation.is_returned);
    assert!(!reservation.is_cancelled);
    assert!(reservation.cancellation_fee_rate.is_none());
    assert!(reservation.cancellation_fee.is_none());

    let pricing = get_car_type(CarType::Family).unwrap();
    let rental_fee = pricing.rental_rate_fee * Decimal::from(96);
    let deposit_fee = rental_fee * pricing.deposit_fee_percentage / Decimal::ONE_HUNDRED;
    assert_eq!(reservation.rental_fee, rental_fee);
    assert_eq!(reservation.deposit_fee, deposit_fee);

    let again = f
        .reservations
        .create_booking(Some(booking_for(reservation.client_id, pick_up, 4)))
        .await
        .unwrap();
    assert!(again.reservation_id > reservation.reservation_id);
    assert_eq!(again.client_id, reservation.client_id);
}

#[tokio::test]
async fn test_create_booking_requires_a_client() {
    let f = fixture();

    let mut params = booking_for(1, base_date(), 4);
    params.client_id = None;

    let err = f.reservations.create_booking(Some(params)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);

    let err = f.reservations.create_booking(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);

    let err = f
        .reservations
        .create_booking(Some(booking_for(42, base_date(), 4)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert!(f.reservation_repo.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_booking_rejects_bad_input() {
    let f = fixture();
    let account = f.clients.add(Some(client(1))).await.unwrap();

    let mut inverted = booking_for(account.client_id, base_date(), 4);
    inverted.return_date = Some(base_date() - Duration::hours(1));

    let mut no_plate = booking_for(account.client_id, base_date(), 4);
    no_plate.car_plate_number = None;

    let mut no_car_type = booking_for(account.client_id, base_date(), 4);
    no_car_type.car_type = None;

    for params in [inverted, no_plate, no_car_type] {
        let err = f.reservations.create_booking(Some(params)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    assert!(f.reservation_repo.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_pick_up_car() {
    let f = fixture();
    let account = f.clients.add(Some(client(1))).await.unwrap();
    let reservation = f
        .reservations
        .create_booking(Some(booking_for(account.client_id, base_date(), 2)))
        .await
        .unwrap();

    assert!(f.reservations.pick_up_car(reservation.reservation_id).await.unwrap());

    let stored = f
        .reservation_repo
        .find_by_id(reservation.reservation_id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_picked_up);

    let err = f
        .reservations
        .pick_up_car(reservation.reservation_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StateConflict);

    let err = f.reservations.pick_up_car(999).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_return_car() {
    let f = fixture();
    let account = f.clients.add(Some(client(1))).await.unwrap();
    let reservation = f
        .reservations
        .create_booking(Some(booking_for(account.client_id, base_date(), 2)))
        .await
        .unwrap();
    let id = reservation.reservation_id;

    let err = f.reservations.return_car(id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StateConflict);

    f.reservations.pick_up_car(id).await.unwrap();
    assert!(f.reservations.return_car(id).await.unwrap());

    let stored = f.reservation_repo.find_by_id(id).await.unwrap().unwrap();
    assert!(stored.is_returned);

    let err = f.reservations.return_car(id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StateConflict);

    let err = f.reservations.cancel_reservation(id, dec!(1)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StateConflict);
}

#[tokio::test]
async fn test_cancel_reservation() {
    let f = fixture();
    let account = f.clients.add(Some(client(1))).await.unwrap();
    let reservation = f
        .reservations
        .create_booking(Some(booking_for(account.client_id, base_date(), 2)))
        .await
        .unwrap();
    let id = reservation.reservation_id;
    let rate = dec!(2.00);

    let err = f.reservations.cancel_reservation(id, dec!(-0.5)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);

    assert!(f.reservations.cancel_reservation(id, rate).await.unwrap());

    let pricing = get_car_type(CarType::Family).unwrap();
    let stored = f.reservation_repo.find_by_id(id).await.unwrap().unwrap();
    assert!(stored.is_cancelled);
    assert_eq!(stored.cancellation_fee_rate, Some(rate));
    assert_eq!(stored.cancellation_fee, Some(pricing.cancellation_fee * rate));

    let err = f.reservations.cancel_reservation(id, rate).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StateConflict);

    let err = f.reservations.pick_up_car(id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StateConflict);

    let err = f.reservations.cancel_reservation(999, rate).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_cancel_with_oversized_rate_is_rejected() {
    let f = fixture();
    let account = f.clients.add(Some(client(1))).await.unwrap();
    let mut params = booking_for(account.client_id, base_date(), 2);
    params.car_type = Some(CarType::Luxury);
    let reservation = f.reservations.create_booking(Some(params)).await.unwrap();
    let id = reservation.reservation_id;

    let rate = Decimal::from_str("1000000000000000000000000000").unwrap();
    let err = f.reservations.cancel_reservation(id, rate).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);

    let stored = f.reservation_repo.find_by_id(id).await.unwrap().unwrap();
    assert!(stored.is_booked());
    assert_eq!(stored.version, 0);
}

/// Yields to the scheduler after every read, so transitions started together
/// all load the reservation before any of them writes it back
struct YieldingReservationRepo {
    inner: InMemoryReservationRepository,
}

#[async_trait]
impl Repository<Reservation, i32> for YieldingReservationRepo {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Reservation>> {
        let found = self.inner.find_by_id(id).await;
        tokio::task::yield_now().await;
        found
    }

    async fn list_all(&self) -> AppResult<Vec<Reservation>> {
        self.inner.list_all().await
    }

    async fn create(&self, entity: &Reservation) -> AppResult<Reservation> {
        self.inner.create(entity).await
    }

    async fn update(&self, entity: &Reservation) -> AppResult<Reservation> {
        self.inner.update(entity).await
    }
}

#[async_trait]
impl ReservationRepository for YieldingReservationRepo {
    async fn list_by_client(&self, client_id: i32) -> AppResult<Vec<Reservation>> {
        self.inner.list_by_client(client_id).await
    }

    async fn create_with_client(
        &self,
        client: &ClientAccount,
        reservation: &Reservation,
    ) -> AppResult<(ClientAccount, Reservation)> {
        self.inner.create_with_client(client, reservation).await
    }
}

#[tokio::test]
async fn test_interleaved_transitions_hit_the_version_check() {
    let client_repo = Arc::new(InMemoryClientAccountRepository::new());
    let reservation_repo = Arc::new(YieldingReservationRepo {
        inner: InMemoryReservationRepository::new(client_repo.clone()),
    });
    let clients = Arc::new(ClientAccountService::new(
        client_repo,
        reservation_repo.clone(),
    ));
    let reservations = ReservationService::new(clients.clone(), reservation_repo.clone());

    let account = clients.add(Some(client(1))).await.unwrap();
    let id = reservations
        .create_booking(Some(booking_for(account.client_id, base_date(), 2)))
        .await
        .unwrap()
        .reservation_id;

    // Both calls read version 0 and pass the lifecycle check before either
    // writes, so only the version comparison can stop the second write
    let (picked_up, cancelled) = tokio::join!(
        reservations.pick_up_car(id),
        reservations.cancel_reservation(id, dec!(1))
    );

    let failures: Vec<_> = [picked_up, cancelled]
        .into_iter()
        .filter_map(Result::err)
        .collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind(), ErrorKind::StateConflict);
    assert!(failures[0].to_string().contains("modified concurrently"));

    let stored = reservation_repo.find_by_id(id).await.unwrap().unwrap();
    assert_ne!(stored.is_picked_up, stored.is_cancelled);
    assert_eq!(stored.version, 1);
}

/// Six reservations over two clients:
///
/// | id | client | pick-up  | state     |
/// |----|--------|----------|-----------|
/// | 1  | 1      | base     | booked    |
/// | 2  | 1      | base +1d | picked up |
/// | 3  | 1      | base     | returned  |
/// | 4  | 1      | base +9d | booked    |
/// | 5  | 2      | base     | cancelled |
/// | 6  | 2      | base +1d | returned  |
async fn seed_search_data(f: &Fixture) {
    let first = f.clients.add(Some(client(1))).await.unwrap();
    let second = f.clients.add(Some(client(2))).await.unwrap();
    let base = base_date();

    let plan = [
        (first.client_id, base),
        (first.client_id, base + Duration::days(1)),
        (first.client_id, base),
        (first.client_id, base + Duration::days(9)),
        (second.client_id, base),
        (second.client_id, base + Duration::days(1)),
    ];
    for (client_id, pick_up) in plan {
        f.reservations
            .create_booking(Some(booking_for(client_id, pick_up, 3)))
            .await
            .unwrap();
    }

    f.reservations.pick_up_car(2).await.unwrap();
    f.reservations.pick_up_car(3).await.unwrap();
    f.reservations.return_car(3).await.unwrap();
    f.reservations.cancel_reservation(5, dec!(1)).await.unwrap();
    f.reservations.pick_up_car(6).await.unwrap();
    f.reservations.return_car(6).await.unwrap();
}

fn first_client_in_range() -> ReservationBrowsingParams {
    ReservationBrowsingParams {
        client_email: Some("client1@mail.com".to_string()),
        client_full_name: Some("Client Name 1".to_string()),
        client_phone: Some("+11111".to_string()),
        pick_up_date_from: Some(base_date()),
        pick_up_date_to: Some(base_date() + Duration::days(1)),
        ..Default::default()
    }
}

async fn find_ids(f: &Fixture, params: ReservationBrowsingParams) -> Vec<i32> {
    f.reservations
        .find_reservations(Some(params))
        .await
        .unwrap()
        .iter()
        .map(|r| r.reservation_id)
        .collect()
}

#[tokio::test]
async fn test_find_reservations() {
    let f = fixture();
    seed_search_data(&f).await;

    let booked = ReservationBrowsingParams {
        is_booked: Some(true),
        ..first_client_in_range()
    };
    assert_eq!(find_ids(&f, booked).await, vec![1]);

    let picked_up = ReservationBrowsingParams {
        is_picked_up: Some(true),
        ..first_client_in_range()
    };
    assert_eq!(find_ids(&f, picked_up).await, vec![2, 3]);

    let cancelled = ReservationBrowsingParams {
        is_cancelled: Some(true),
        ..Default::default()
    };
    assert_eq!(find_ids(&f, cancelled).await, vec![5]);

    let returned = ReservationBrowsingParams {
        is_returned: Some(true),
        ..Default::default()
    };
    assert_eq!(find_ids(&f, returned).await, vec![3, 6]);

    let page = ReservationBrowsingParams {
        start_index: Some(1),
        max_items: Some(2),
        ..Default::default()
    };
    assert_eq!(find_ids(&f, page).await, vec![2, 3]);

    let err = f.reservations.find_reservations(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

#[tokio::test]
async fn test_find_reservations_client_filters() {
    let f = fixture();
    seed_search_data(&f).await;

    let by_email = ReservationBrowsingParams {
        client_email: Some(" CLIENT2@mail.com ".to_string()),
        ..Default::default()
    };
    assert_eq!(find_ids(&f, by_email).await, vec![5, 6]);

    let blank = ReservationBrowsingParams {
        client_phone: Some("  ".to_string()),
        ..Default::default()
    };
    assert_eq!(find_ids(&f, blank).await.len(), 6);

    let unknown = ReservationBrowsingParams {
        client_full_name: Some("Nobody".to_string()),
        ..Default::default()
    };
    assert!(find_ids(&f, unknown).await.is_empty());

    let not_cancelled = ReservationBrowsingParams {
        is_cancelled: Some(false),
        client_email: Some("client2@mail.com".to_string()),
        ..Default::default()
    };
    assert_eq!(find_ids(&f, not_cancelled).await, vec![6]);

    let past_end = ReservationBrowsingParams {
        start_index: Some(10),
        ..Default::default()
    };
    assert!(find_ids(&f, past_end).await.is_empty());
}
