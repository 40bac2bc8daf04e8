//! Liveness echo.

use std::collections::HashMap;

use axum::extract::{Query, RawForm, rejection::RawFormRejection};

const PONG: &str = "pong!";

/// `GET /ping`: log the query parameters and answer `pong!`.
pub async fn ping_get_handler(Query(params): Query<HashMap<String, String>>) -> &'static str {
    log_params(&params, "");
    PONG
}

/// `POST /ping`: log query and form parameters and answer `pong!`.
pub async fn ping_post_handler(
    Query(params): Query<HashMap<String, String>>,
    form: Result<RawForm, RawFormRejection>,
) -> &'static str {
    // Bodies that are not url-encoded forms are ignored.
    let body = form
        .map(|RawForm(bytes)| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default();
    log_params(&params, &body);
    PONG
}

fn log_params(params: &HashMap<String, String>, form: &str) {
    for (key, value) in params {
        tracing::debug!(key = %key, value = %value, "Ping parameter");
    }
    tracing::info!(params = params.len(), form = %form, "Ping");
}
