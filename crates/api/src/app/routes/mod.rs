use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};

use crate::middleware::{AuthState, auth_middleware};

pub mod customers;
pub mod employees;
pub mod products;
pub mod system;
pub mod users;

/// Routes open to anonymous callers.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/customers", post(customers::register_customer))
        .route("/employees", post(employees::register_employee))
        .route("/products", get(products::list_products))
        .route("/products/category", get(products::products_by_category))
        .route("/products/:id", get(products::get_product))
        .nest("/users", users::router())
}

/// Back-office routes; every one requires an admin bearer token.
pub fn protected_router(auth: AuthState) -> Router {
    Router::new()
        .route("/customers", get(customers::list_customers))
        .route(
            "/customers/:id",
            put(customers::update_customer).delete(customers::delete_customer),
        )
        .route("/products", post(products::register_product))
        .route(
            "/products/:id",
            put(products::update_product).delete(products::delete_product),
        )
        .route_layer(from_fn_with_state(auth, auth_middleware))
}
