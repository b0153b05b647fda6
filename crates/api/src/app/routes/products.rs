use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use backoffice_application::RequestContext;
use backoffice_application::use_cases::product::{DOES_NOT_EXIST, KEY};
use backoffice_core::ProductId;
use backoffice_products::Product;

use crate::app::dto::{CategoryQuery, CreatedResponse, ProductRequest, ProductResponse};
use crate::app::errors;
use crate::app::services::AppServices;

fn listing(ctx: &RequestContext, products: Vec<Product>) -> Response {
    if ctx.has_notifications() {
        return errors::rejected(ctx);
    }
    let body: Vec<ProductResponse> = products.iter().map(ProductResponse::from).collect();
    Json(body).into_response()
}

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> Response {
    let ctx = services.request_context();
    let products = services.products.list_all(&ctx).await;
    listing(&ctx, products)
}

/// An unknown category yields an empty list, not an error.
pub async fn products_by_category(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<CategoryQuery>,
) -> Response {
    let ctx = services.request_context();
    let products = services.products.get_by_category(&ctx, &query.category).await;
    listing(&ctx, products)
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<ProductId>,
) -> Response {
    let ctx = services.request_context();
    match services.products.get(&ctx, id).await {
        Some(product) => Json(ProductResponse::from(&product)).into_response(),
        None if ctx.has_notifications() => errors::rejected(&ctx),
        None => {
            ctx.notify(KEY, DOES_NOT_EXIST);
            errors::rejected(&ctx)
        }
    }
}

pub async fn register_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Option<Json<ProductRequest>>,
) -> Response {
    let ctx = services.request_context();
    let product = match body {
        Some(Json(body)) => {
            let id = body.id.unwrap_or_default();
            match body.into_domain(id) {
                Ok(product) => Some(product),
                Err(raw) => return errors::invalid_category(&raw),
            }
        }
        None => None,
    };
    let id = product.as_ref().map(|p| p.id_typed());

    match services.products.register(&ctx, product).await {
        Ok(true) => (StatusCode::CREATED, Json(CreatedResponse { id })).into_response(),
        Ok(false) => errors::rejected(&ctx),
        Err(e) => errors::use_case_error(e),
    }
}

/// The path id wins over any id in the body.
pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<ProductId>,
    body: Option<Json<ProductRequest>>,
) -> Response {
    let ctx = services.request_context();
    let product = match body {
        Some(Json(body)) => match body.into_domain(id) {
            Ok(product) => Some(product),
            Err(raw) => return errors::invalid_category(&raw),
        },
        None => None,
    };

    match services.products.update(&ctx, product).await {
        Ok(true) => StatusCode::OK.into_response(),
        Ok(false) => errors::rejected(&ctx),
        Err(e) => errors::use_case_error(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<ProductId>,
) -> Response {
    let ctx = services.request_context();
    match services.products.delete(&ctx, id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::rejected(&ctx),
        Err(e) => errors::use_case_error(e),
    }
}
