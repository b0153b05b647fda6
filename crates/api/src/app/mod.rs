//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: adapter selection and use-case construction
//! - `routes/`: handlers, one file per resource
//! - `dto.rs`: request/response bodies and their domain mapping
//! - `errors.rs`: notification and error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;

use backoffice_identity::Hs256JwtValidator;
use backoffice_infra::Settings;

use crate::middleware::AuthState;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppServices, ServicesError};

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Cancelling `shutdown` aborts the storage and remote steps of requests
/// still in flight.
pub async fn build_app(
    settings: &Settings,
    shutdown: CancellationToken,
) -> Result<Router, ServicesError> {
    let services = Arc::new(AppServices::build(settings, shutdown).await?);
    let auth = AuthState {
        jwt: Arc::new(Hs256JwtValidator::new(settings.jwt_secret.as_bytes())),
        required_group: settings.groups.admin.clone(),
    };
    Ok(router(services, auth))
}

pub fn router(services: Arc<AppServices>, auth: AuthState) -> Router {
    Router::new()
        .merge(routes::public_router())
        .merge(routes::protected_router(auth))
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
