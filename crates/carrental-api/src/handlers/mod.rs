//! HTTP request handlers

pub mod client;
pub mod health;
pub mod reservation;

use actix_web::{error::InternalError, web, ResponseError};
use carrental_core::AppError;

pub use client::configure as configure_clients;
pub use health::health_check;
pub use reservation::configure as configure_reservations;

/// Configure every API route under `/api/v1`
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(configure_clients)
            .configure(configure_reservations),
    );
}

/// Query string extractor config reporting malformed queries as invalid parameters
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let response = AppError::invalid(err.to_string()).error_response();
        InternalError::from_response(err, response).into()
    })
}
