//! HTTP API for the logistics voice-to-action NLU engine.
//!
//! Exposes the parse pipeline plus the intent-only and entities-only
//! endpoints over axum, mirroring the service description returned by the
//! root route.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod ui;

pub use crate::routes::create_router;
pub use crate::state::AppState;
