//! REST API routes configuration

use crate::api::handlers::{self, ApiState};
use crate::api::websocket::ws_handler;
use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Fallback handler returning a JSON 404
async fn fallback_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "application/json")],
        r#"{"error":"Not Found"}"#,
    )
}

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // WebSocket for real-time updates
        .route("/ws", get(ws_handler))
        // Wallet endpoints
        .route("/api/wallet", get(handlers::get_wallet_info))
        .route("/api/principals", get(handlers::get_principals))
        .route("/api/events", get(handlers::get_events))
        .route("/api/deposit", post(handlers::post_deposit))
        .route("/api/quorum", post(handlers::change_quorum))
        // Proposals
        .route("/api/proposals", get(handlers::list_proposals))
        .route("/api/proposals", post(handlers::submit_proposal))
        .route("/api/proposals/{id}", get(handlers::get_proposal))
        .route(
            "/api/proposals/{id}/confirmations",
            get(handlers::get_confirmations),
        )
        .route(
            "/api/proposals/{id}/confirm",
            post(handlers::confirm_proposal),
        )
        .route("/api/proposals/{id}/revoke", post(handlers::revoke_proposal))
        .route(
            "/api/proposals/{id}/execute",
            post(handlers::execute_proposal),
        )
        .fallback(fallback_handler)
        // Add state and middleware
        .with_state(state)
        .layer(cors)
}
