//! Per-session visit counter.

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::routes::{COUNT_KEY, found};
use crate::state::AppState;

/// `GET /count` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

/// `GET /count`: bump the session's counter, or send visitors without a
/// session to `/login`.
pub async fn count_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let Some(session) = state.sessions.fetch(&headers)? else {
        return Ok(found("/login", HeaderMap::new()));
    };

    let count = session
        .get(COUNT_KEY)
        .and_then(|v| v.as_u64())
        .map_or(1, |n| n.saturating_add(1));
    session.set(COUNT_KEY, Value::from(count));

    tracing::debug!(session_id = %session.id(), count, "Counted visit");

    Ok(Json(CountResponse { count }).into_response())
}
