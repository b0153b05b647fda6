use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};


use crate::app::dto::{CreatedResponse, RegisterEmployeeRequest};
use crate::app::errors;
use crate::app::services::AppServices;

pub async fn register_employee(
    Extension(services): Extension<Arc<AppServices>>,
    body: Option<Json<RegisterEmployeeRequest>>,
) -> Response {
    let ctx = services.request_context();
    let (employee, password) = match body {
        Some(Json(body)) => {
            let (employee, password) = body.into_domain();
            (Some(employee), password)
        }
        None => (None, String::new()),
    };
    let id = employee.as_ref().map(|e| e.id_typed());

    match services.employees.register(&ctx, employee, &password).await {
        Ok(true) => (StatusCode::CREATED, Json(CreatedResponse { id })).into_response(),
        Ok(false) => errors::rejected(&ctx),
        Err(e) => errors::use_case_error(e),
    }
}
