//! The REST/RPC and WebSocket surface.

mod rest;
mod state;
mod ws;

pub use state::AppState;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/charge-points", get(rest::get_all_charge_points))
        .route("/charge-points/{id}/commands", post(rest::send_command))
        .route("/charge-points/{id}/enable", post(rest::enable))
        .route("/charge-points/{id}/disable", post(rest::disable))
        .route("/charge-points/{id}/start", post(rest::start))
        .route("/charge-points/{id}/stop", post(rest::stop))
        .route("/charge-points/{id}/charging-current", post(rest::set_charging_current))
        .route("/charge-points/{id}/configuration", get(rest::get_configuration))
        .route("/charge-points/{id}/set-alias", put(rest::set_alias))
        .route("/charge-points/{id}/settings", get(rest::get_settings))
        .route("/ocpp/{identity}", get(ws::ocpp_upgrade))
        .route("/frontend", get(ws::frontend_upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
