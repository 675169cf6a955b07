//! Route handler functions for all API endpoints.
//!
//! Each handler extracts the JSON request via axum extractors, runs the
//! engine from AppState, and returns JSON responses.

use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::Json;
use serde::{Deserialize, Serialize};

use logistics_nlu_lib::ontology::{Entities, IntentClassifierResult, QueryResult};

use crate::error::ApiError;
use crate::state::AppState;
use crate::ui;

/// Request body of the voice-agent endpoints.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub text: String,
}

/// Service descriptor returned by the root route.
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// `GET /` - health check and service descriptor.
pub async fn root() -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "running".to_string(),
        service: "Voice-to-Action AI Pipeline".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /voice-agent/parse` - full pipeline: intent, entities, next action.
pub async fn parse(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResult>, ApiError> {
    let result = state.engine.parse(&request.text, None)?;
    Ok(Json(result))
}

/// `POST /voice-agent/intent-only` - classification result only.
pub async fn intent_only(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<IntentClassifierResult>, ApiError> {
    let best_intent = state
        .engine
        .get_intents(&request.text)?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Internal("Classifier returned no intents".to_string()))?;
    Ok(Json(best_intent))
}

/// `POST /voice-agent/entities-only` - entity extraction only.
pub async fn entities_only(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<Entities>, ApiError> {
    let entities = state.engine.extract_entities(&request.text)?;
    Ok(Json(entities))
}

/// `GET /ui` - minimal embedded query page.
pub async fn ui() -> impl IntoResponse {
    Html(ui::UI_HTML)
}
