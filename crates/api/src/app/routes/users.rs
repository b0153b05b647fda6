//! Sign-in and credential recovery, all anonymous.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};

use backoffice_application::{RequestContext, UseCaseError};
use backoffice_identity::TokenBundle;

use crate::app::dto::{
    CustomerSignInRequest, EmailVerificationRequest, EmployeeSignInRequest, PasswordRecoveryRequest,
    PasswordResetRequest,
};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/customer/sign-in", post(customer_sign_in))
        .route("/employee/sign-in", post(employee_sign_in))
        .route("/email-verification/confirm", post(confirm_email))
        .route("/password-recovery/request", post(request_password_recovery))
        .route("/password-recovery/reset", post(reset_password))
}

fn signed_in(ctx: &RequestContext, result: Result<Option<TokenBundle>, UseCaseError>) -> Response {
    match result {
        Ok(Some(tokens)) => Json(tokens).into_response(),
        Ok(None) => errors::unauthorized(ctx),
        Err(e) => errors::use_case_error(e),
    }
}

fn acknowledged(ctx: &RequestContext, result: Result<bool, UseCaseError>) -> Response {
    match result {
        Ok(true) => StatusCode::OK.into_response(),
        Ok(false) => errors::rejected(ctx),
        Err(e) => errors::use_case_error(e),
    }
}

pub async fn customer_sign_in(
    Extension(services): Extension<Arc<AppServices>>,
    body: Option<Json<CustomerSignInRequest>>,
) -> Response {
    let ctx = services.request_context();
    let request = body.map(|Json(b)| b.into());
    let result = services.identity.sign_in_customer(&ctx, request).await;
    signed_in(&ctx, result)
}

pub async fn employee_sign_in(
    Extension(services): Extension<Arc<AppServices>>,
    body: Option<Json<EmployeeSignInRequest>>,
) -> Response {
    let ctx = services.request_context();
    let request = body.map(|Json(b)| b.into());
    let result = services.identity.sign_in_employee(&ctx, request).await;
    signed_in(&ctx, result)
}

pub async fn confirm_email(
    Extension(services): Extension<Arc<AppServices>>,
    body: Option<Json<EmailVerificationRequest>>,
) -> Response {
    let ctx = services.request_context();
    let request = body.map(|Json(b)| b.into());
    let result = services.identity.confirm_email(&ctx, request).await;
    acknowledged(&ctx, result)
}

pub async fn request_password_recovery(
    Extension(services): Extension<Arc<AppServices>>,
    body: Option<Json<PasswordRecoveryRequest>>,
) -> Response {
    let ctx = services.request_context();
    let request = body.map(|Json(b)| b.into());
    let result = services.identity.request_password_recovery(&ctx, request).await;
    acknowledged(&ctx, result)
}

pub async fn reset_password(
    Extension(services): Extension<Arc<AppServices>>,
    body: Option<Json<PasswordResetRequest>>,
) -> Response {
    let ctx = services.request_context();
    let request = body.map(|Json(b)| b.into());
    let result = services.identity.reset_password(&ctx, request).await;
    acknowledged(&ctx, result)
}
