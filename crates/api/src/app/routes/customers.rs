use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use backoffice_core::CustomerId;

use crate::app::dto::{CreatedResponse, CustomerResponse, RegisterCustomerRequest, UpdateCustomerRequest};
use crate::app::errors;
use crate::app::services::AppServices;

pub async fn register_customer(
    Extension(services): Extension<Arc<AppServices>>,
    body: Option<Json<RegisterCustomerRequest>>,
) -> Response {
    let ctx = services.request_context();
    let (customer, password) = match body {
        Some(Json(body)) => {
            let (customer, password) = body.into_domain();
            (Some(customer), password)
        }
        None => (None, String::new()),
    };
    let id = customer.as_ref().map(|c| c.id_typed());

    match services.customers.register(&ctx, customer, &password).await {
        Ok(true) => (StatusCode::CREATED, Json(CreatedResponse { id })).into_response(),
        Ok(false) => errors::rejected(&ctx),
        Err(e) => errors::use_case_error(e),
    }
}

pub async fn list_customers(Extension(services): Extension<Arc<AppServices>>) -> Response {
    let ctx = services.request_context();
    let customers = services.customers.list_all(&ctx).await;
    if ctx.has_notifications() {
        return errors::rejected(&ctx);
    }
    let body: Vec<CustomerResponse> = customers.iter().map(CustomerResponse::from).collect();
    Json(body).into_response()
}

pub async fn update_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<CustomerId>,
    body: Option<Json<UpdateCustomerRequest>>,
) -> Response {
    let ctx = services.request_context();
    let changes = body.map(|Json(body)| body);
    if let Some(changes) = &changes {
        if changes.id != id {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "id_mismatch",
                "the id in the body must match the id in the path",
            );
        }
    }

    match services.customers.update(&ctx, changes.map(Into::into)).await {
        Ok(true) => StatusCode::OK.into_response(),
        Ok(false) => errors::rejected(&ctx),
        Err(e) => errors::use_case_error(e),
    }
}

pub async fn delete_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<CustomerId>,
) -> Response {
    let ctx = services.request_context();
    match services.customers.delete(&ctx, id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::rejected(&ctx),
        Err(e) => errors::use_case_error(e),
    }
}
