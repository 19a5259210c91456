//! Router configuration for the HTTP API.

use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::auth;
use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Every hotel route requires a session
    let hotels = Router::new()
        .route("/hotels", get(handlers::list_hotels))
        .route("/hotels/", get(handlers::missing_hotel_id))
        .route("/hotels/{hotel_id}", get(handlers::get_hotel_with_rooms))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(hotels)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
