//! Router setup with all API routes and middleware.

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(handlers::root))
        .route("/ui", get(handlers::ui))
        .route("/voice-agent/parse", post(handlers::parse))
        .route("/voice-agent/intent-only", post(handlers::intent_only))
        .route("/voice-agent/entities-only", post(handlers::entities_only))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the given address.
pub async fn start_server(host: &str, port: u16, state: AppState) -> std::io::Result<()> {
    let addr = format!("{}:{}", host, port);
    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await
}
