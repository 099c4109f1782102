//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                    - Liveness check
//!
//! # Customers
//! GET    /api/customers                             - List customers
//! POST   /api/customers                             - Create customer
//! GET    /api/customers/{id}                        - Customer by id
//! PUT    /api/customers/{id}                        - Replace name and cpf
//! PATCH  /api/customers/{id}                        - Patch name and/or cpf
//! DELETE /api/customers/{id}                        - Delete customer and its addresses
//! GET    /api/customers/cpf/{cpf}                   - Customer by national id
//!
//! # Customers with addresses
//! GET    /api/customers/with-addresses              - List with addresses
//! POST   /api/customers/with-addresses              - Create with addresses
//! GET    /api/customers/with-addresses/{customerId} - One with addresses
//! PUT    /api/customers/with-addresses/{customerId} - Replace fields and address list
//! ```

pub mod customers;
pub mod with_addresses;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the customer routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(customers::index).post(customers::create))
        .route(
            "/{id}",
            get(customers::show)
                .put(customers::update)
                .patch(customers::patch)
                .delete(customers::delete),
        )
        .route("/cpf/{cpf}", get(customers::show_by_cpf))
        .route(
            "/with-addresses",
            get(with_addresses::index).post(with_addresses::create),
        )
        .route(
            "/with-addresses/{customer_id}",
            get(with_addresses::show).put(with_addresses::update),
        )
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/customers", customer_routes())
}

/// Build the full application: routes, state, and request tracing.
///
/// Used by the binary and by tests, so both exercise the same stack.
pub fn app(state: AppState) -> Router {
    routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. The store is in-process, so
/// there are no dependencies to check.
async fn health() -> &'static str {
    "ok"
}
