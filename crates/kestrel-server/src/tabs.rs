//! Tab routes: list, open, focus, close, and the action dispatcher.
//!
//! Every route follows the same orchestration shape, centralized in
//! [`with_profile`]: resolve the profile (or short-circuit with the
//! resolver's error), run one browser operation, and on failure either ask
//! the routing context to classify the error or fall back to a generic 500.
//! A handler writes exactly one response on exactly one of those paths.

use crate::{AppState, ErrorEnvelope};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::Json;
use kestrel_browser::{Error, ProfileContext, Tab};
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Budget for the "is the browser up at all" probe. Slower operations
/// (enumerate, open, close) are not bounded by this.
const REACHABILITY_TIMEOUT: Duration = Duration::from_millis(300);

/// Header naming the profile a request targets; absent means the default
/// profile.
pub const PROFILE_HEADER: &str = "x-kestrel-profile";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/tabs", get(list_tabs))
        .route("/tabs/open", post(open_tab))
        .route("/tabs/focus", post(focus_tab))
        .route("/tabs/action", post(tab_action))
        .route("/tabs/:target_id", delete(close_tab))
}

/// Profile resolution guard. "No such profile" is an expected outcome and
/// comes back as a ready-to-write envelope, not a panic or transport error.
async fn resolve_profile(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Arc<dyn ProfileContext>, ErrorEnvelope> {
    let name = headers.get(PROFILE_HEADER).and_then(|v| v.to_str().ok());
    state.routing().profile_context(name).await
}

/// Tab operation orchestrator: resolve, run, classify-on-failure.
///
/// When `map_tab_error` is set and the routing context recognizes the
/// failure, its status/message wins; otherwise the failure collapses to a
/// 500 carrying the error's display text. No retries on any path.
async fn with_profile<F, Fut>(
    state: &AppState,
    headers: &HeaderMap,
    map_tab_error: bool,
    body: F,
) -> Response
where
    F: FnOnce(Arc<dyn ProfileContext>) -> Fut,
    Fut: Future<Output = Result<Response, Error>>,
{
    let profile = match resolve_profile(state, headers).await {
        Ok(profile) => profile,
        Err(envelope) => return envelope.into_response(),
    };

    match body(profile).await {
        Ok(response) => response,
        Err(err) => {
            if map_tab_error {
                if let Some(envelope) = state.routing().map_tab_error(&err) {
                    return envelope.into_response();
                }
            }
            tracing::debug!("tab operation failed: {}", err);
            ErrorEnvelope::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
                .into_response()
        }
    }
}

/// Non-empty string field from a JSON body; empty and missing are the same.
fn scalar_field(body: Option<&Value>, key: &str) -> Option<String> {
    let value = body?.get(key)?.as_str()?;
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Coerce a JSON value to an index. Numbers and numeric strings count;
/// anything else is treated as absent, not as an error. Negative values
/// survive coercion and fail the lookup instead.
fn coerce_index(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Positional lookup; out-of-range and negative both come up empty.
fn tab_at(tabs: &[Tab], index: i64) -> Option<&Tab> {
    usize::try_from(index).ok().and_then(|i| tabs.get(i))
}

/// GET /tabs — report whether the browser runs, and its tabs if so.
/// An absent browser is a normal, reportable state, not an error.
async fn list_tabs(State(state): State<AppState>, headers: HeaderMap) -> Response {
    with_profile(&state, &headers, false, |profile| async move {
        if !profile.is_reachable(REACHABILITY_TIMEOUT).await {
            return Ok(Json(json!({ "running": false, "tabs": [] })).into_response());
        }
        let tabs = profile.list_tabs().await?;
        Ok(Json(json!({ "running": true, "tabs": tabs })).into_response())
    })
    .await
}

/// POST /tabs/open — open a tab at the requested url, starting the browser
/// if needed.
async fn open_tab(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<Value>>,
) -> Response {
    let body = body.map(|Json(v)| v);
    let Some(url) = scalar_field(body.as_ref(), "url") else {
        return ErrorEnvelope::bad_request("url is required").into_response();
    };

    with_profile(&state, &headers, false, |profile| async move {
        profile.ensure_browser_available().await?;
        let tab = profile.open_tab(&url).await?;
        Ok(Json(tab).into_response())
    })
    .await
}

/// POST /tabs/focus — bring a tab to the front. Requires a running browser.
async fn focus_tab(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<Value>>,
) -> Response {
    let body = body.map(|Json(v)| v);
    let Some(target_id) = scalar_field(body.as_ref(), "targetId") else {
        return ErrorEnvelope::bad_request("targetId is required").into_response();
    };

    with_profile(&state, &headers, true, |profile| async move {
        if !profile.is_reachable(REACHABILITY_TIMEOUT).await {
            return Ok(ErrorEnvelope::conflict("browser not running").into_response());
        }
        profile.focus_tab(&target_id).await?;
        Ok(Json(json!({ "ok": true })).into_response())
    })
    .await
}

/// DELETE /tabs/:target_id — close a tab. Requires a running browser.
async fn close_tab(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(target_id): Path<String>,
) -> Response {
    if target_id.is_empty() {
        return ErrorEnvelope::bad_request("targetId is required").into_response();
    }

    with_profile(&state, &headers, true, |profile| async move {
        if !profile.is_reachable(REACHABILITY_TIMEOUT).await {
            return Ok(ErrorEnvelope::conflict("browser not running").into_response());
        }
        profile.close_tab(&target_id).await?;
        Ok(Json(json!({ "ok": true })).into_response())
    })
    .await
}

/// POST /tabs/action — resolve an abstract action (+ optional index) to one
/// concrete tab operation.
///
/// `close` without an index degrades to the first enumerated tab; `select`
/// insists on an explicit index. That asymmetry is deliberate.
async fn tab_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<Value>>,
) -> Response {
    let body = body.map(|Json(v)| v);
    let action = body
        .as_ref()
        .and_then(|b| b.get("action"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let index = body
        .as_ref()
        .and_then(|b| b.get("index"))
        .and_then(coerce_index);

    with_profile(&state, &headers, true, |profile| async move {
        match action.as_str() {
            "list" => {
                if !profile.is_reachable(REACHABILITY_TIMEOUT).await {
                    return Ok(Json(json!({ "ok": true, "tabs": [] })).into_response());
                }
                let tabs = profile.list_tabs().await?;
                Ok(Json(json!({ "ok": true, "tabs": tabs })).into_response())
            }
            "new" => {
                profile.ensure_browser_available().await?;
                let tab = profile.open_tab("about:blank").await?;
                Ok(Json(json!({ "ok": true, "tab": tab })).into_response())
            }
            "close" => {
                let tabs = profile.list_tabs().await?;
                let target = match index {
                    Some(index) => tab_at(&tabs, index),
                    None => tabs.first(),
                };
                let Some(target) = target else {
                    return Ok(ErrorEnvelope::not_found("tab not found").into_response());
                };
                let target_id = target.target_id.clone();
                profile.close_tab(&target_id).await?;
                Ok(Json(json!({ "ok": true, "targetId": target_id })).into_response())
            }
            "select" => {
                let Some(index) = index else {
                    return Ok(ErrorEnvelope::bad_request("index is required").into_response());
                };
                let tabs = profile.list_tabs().await?;
                let Some(target) = tab_at(&tabs, index) else {
                    return Ok(ErrorEnvelope::not_found("tab not found").into_response());
                };
                let target_id = target.target_id.clone();
                profile.focus_tab(&target_id).await?;
                Ok(Json(json!({ "ok": true, "targetId": target_id })).into_response())
            }
            _ => Ok(ErrorEnvelope::bad_request("unknown tab action").into_response()),
        }
    })
    .await
}
