//! HTTP surface for inspecting and manipulating the open tabs of browser
//! profiles. Routes are thin: each one resolves a profile, runs one browser
//! operation, and maps failure to a JSON error with the right status.

mod error;
mod state;
mod tabs;

pub use error::ErrorEnvelope;
pub use state::{AppState, DEFAULT_PROFILE, ProfileRegistry, ProfileRouting};
pub use tabs::PROFILE_HEADER;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

/// Assemble the full router over the given state
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(tabs::router())
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
