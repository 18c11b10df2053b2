//! Client account handlers
//!
//! HTTP handlers for client account endpoints.

use crate::dto::{optional_json, ApiResponse, ClientAccountBalanceResponse, ClientAccountResponse};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use carrental_core::models::{ClientAccountCreationParams, ClientAccountModificationParams};
use carrental_core::AppError;
use tracing::{debug, instrument};

/// Register a client account
///
/// POST /api/v1/clients
#[instrument(skip(state, body))]
pub async fn add_client(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let params = optional_json::<ClientAccountCreationParams>(&body)?;
    let account = state.clients.add(params).await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        ClientAccountResponse::from(account),
        "Client account created",
    )))
}

/// Modify a client account
///
/// PUT /api/v1/clients
#[instrument(skip(state, body))]
pub async fn update_client(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let params = optional_json::<ClientAccountModificationParams>(&body)?;
    let account = state.clients.update(params).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        ClientAccountResponse::from(account),
        "Client account updated",
    )))
}

/// Get a client account
///
/// GET /api/v1/clients/{id}
#[instrument(skip(state))]
pub async fn get_client(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let client_id = path.into_inner();
    debug!(client_id, "Fetching client account");

    let account = state.clients.get(client_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(ClientAccountResponse::from(account))))
}

/// Get the fee balance of a client
///
/// GET /api/v1/clients/{id}/balance
#[instrument(skip(state))]
pub async fn get_client_balance(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let balance = state
        .clients
        .get_client_account_balance(path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ClientAccountBalanceResponse::from(balance),
    )))
}

/// Configure client account routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/clients")
            .route("", web::post().to(add_client))
            .route("", web::put().to(update_client))
            .route("/{id}", web::get().to(get_client))
            .route("/{id}/balance", web::get().to(get_client_balance)),
    );
}
