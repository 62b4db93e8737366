//! # Routes
//!
//! Axum router configuration for the cart API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET    /health
/// - GET    /api/v1/pricing - Active pricing config
/// - POST   /api/v1/carts - Create cart
/// - GET    /api/v1/carts/{cart_id} - Rows and summary
/// - DELETE /api/v1/carts/{cart_id} - Clear cart
/// - GET    /api/v1/carts/{cart_id}/summary - Summary with display strings
/// - POST   /api/v1/carts/{cart_id}/items - Add or merge item
/// - PATCH  /api/v1/carts/{cart_id}/items - Set quantity
/// - DELETE /api/v1/carts/{cart_id}/items?id=&size=&color= - Remove item
/// - POST   /api/v1/carts/{cart_id}/checkout - Create order, clear cart
pub fn create_router(state: AppState) -> Router {
    // The storefront is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/pricing", get(handlers::get_pricing))
        .route("/carts", post(handlers::create_cart))
        .route(
            "/carts/{cart_id}",
            get(handlers::get_cart).delete(handlers::clear_cart),
        )
        .route("/carts/{cart_id}/summary", get(handlers::get_summary))
        .route(
            "/carts/{cart_id}/items",
            post(handlers::add_item)
                .patch(handlers::set_quantity)
                .delete(handlers::remove_item),
        )
        .route("/carts/{cart_id}/checkout", post(handlers::checkout))
}
