use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use backoffice_application::use_cases::{customer, product};
use backoffice_application::{Notification, RequestContext, UseCaseError};

const NOT_FOUND_MESSAGES: [&str; 2] = [customer::DOES_NOT_EXIST, product::DOES_NOT_EXIST];

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn use_case_error(err: UseCaseError) -> Response {
    match err {
        UseCaseError::InvalidArgument(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_argument", err.to_string())
        }
    }
}

/// Response for a flow that ended with notifications instead of a result.
pub fn rejected(ctx: &RequestContext) -> Response {
    let notifications = ctx.notifications();
    let not_found = notifications
        .iter()
        .any(|n| NOT_FOUND_MESSAGES.contains(&n.message.as_str()));
    if not_found {
        notifications_response(StatusCode::NOT_FOUND, "not_found", notifications)
    } else {
        notifications_response(StatusCode::BAD_REQUEST, "rejected", notifications)
    }
}

pub fn unauthorized(ctx: &RequestContext) -> Response {
    notifications_response(StatusCode::UNAUTHORIZED, "unauthorized", ctx.notifications())
}

pub fn invalid_category(raw: &str) -> Response {
    notifications_response(
        StatusCode::BAD_REQUEST,
        "rejected",
        vec![Notification {
            key: "category".to_string(),
            message: format!("unrecognized category: {raw}"),
        }],
    )
}

pub fn notifications_response(
    status: StatusCode,
    code: &'static str,
    notifications: Vec<Notification>,
) -> Response {
    let message = notifications
        .first()
        .map(|n| n.message.clone())
        .unwrap_or_else(|| "request was not applied".to_string());
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message,
            "notifications": notifications,
        })),
    )
        .into_response()
}
