//! Reservation handlers
//!
//! HTTP handlers for booking, lifecycle transitions and reservation search.

use crate::dto::{optional_json, ApiResponse, ReservationResponse, TransitionResponse};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use carrental_core::models::{
    ReservationBrowsingParams, ReservationCancellationParams, ReservationCreationParams,
};
use carrental_core::validation::require;
use carrental_core::AppError;
use tracing::{debug, instrument};

/// Book a car
///
/// POST /api/v1/reservations
#[instrument(skip(state, body))]
pub async fn create_booking(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let params = optional_json::<ReservationCreationParams>(&body)?;
    let reservation = state.reservations.create_booking(params).await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        ReservationResponse::from(reservation),
        "Reservation booked",
    )))
}

/// Search reservations
///
/// GET /api/v1/reservations
#[instrument(skip(state, query))]
pub async fn find_reservations(
    state: web::Data<AppState>,
    query: web::Query<ReservationBrowsingParams>,
) -> Result<HttpResponse, AppError> {
    let reservations = state
        .reservations
        .find_reservations(Some(query.into_inner()))
        .await?;

    debug!(count = reservations.len(), "Reservations found");

    let data: Vec<ReservationResponse> = reservations.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

/// Hand the car over
///
/// POST /api/v1/reservations/{id}/pickup
#[instrument(skip(state))]
pub async fn pick_up_car(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let reservation_id = path.into_inner();
    let success = state.reservations.pick_up_car(reservation_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        TransitionResponse {
            reservation_id,
            success,
        },
        "Car picked up",
    )))
}

/// Take the car back
///
/// POST /api/v1/reservations/{id}/return
#[instrument(skip(state))]
pub async fn return_car(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let reservation_id = path.into_inner();
    let success = state.reservations.return_car(reservation_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        TransitionResponse {
            reservation_id,
            success,
        },
        "Car returned",
    )))
}

/// Cancel a booking
///
/// POST /api/v1/reservations/cancel
#[instrument(skip(state, body))]
pub async fn cancel_reservation(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let params = require(
        optional_json::<ReservationCancellationParams>(&body)?,
        "reservation cancellation parameters",
    )?;

    let success = state
        .reservations
        .cancel_reservation(params.reservation_id, params.cancellation_fee_rate)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        TransitionResponse {
            reservation_id: params.reservation_id,
            success,
        },
        "Reservation cancelled",
    )))
}

/// Configure reservation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reservations")
            .route("", web::post().to(create_booking))
            .route("", web::get().to(find_reservations))
            .route("/cancel", web::post().to(cancel_reservation))
            .route("/{id}/pickup", web::post().to(pick_up_car))
            .route("/{id}/return", web::post().to(return_car)),
    );
}
