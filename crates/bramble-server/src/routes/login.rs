//! Login and logout.

use axum::{
    Form, Json,
    extract::State,
    http::HeaderMap,
    response::Response,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ServerError};
use crate::routes::{USERNAME_KEY, cookie_headers, found};
use crate::state::AppState;

/// `POST /login` form body.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
}

/// `GET /login` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Name stored in the session, if the user has logged in.
    pub username: Option<String>,
}

/// `GET /login`: start a session and report who it belongs to.
pub async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(HeaderMap, Json<LoginResponse>)> {
    let start = state.sessions.start(&headers)?;
    let username = start
        .session
        .get(USERNAME_KEY)
        .and_then(|v| v.as_str().map(str::to_string));

    Ok((cookie_headers(start.set_cookie), Json(LoginResponse { username })))
}

/// `POST /login`: store the submitted user name and go to `/count`.
pub async fn login_form_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let username = form.username.trim();
    if username.is_empty() {
        return Err(ServerError::BadRequest("username is required".to_string()));
    }

    let start = state.sessions.start(&headers)?;
    start
        .session
        .set(USERNAME_KEY, Value::String(username.to_string()));
    tracing::info!(username = %username, session_id = %start.session.id(), "User logged in");

    Ok(found("/count", cookie_headers(start.set_cookie)))
}

/// `POST /logout`: destroy the session and clear its cookie.
pub async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let removal = state.sessions.destroy(&headers);
    if removal.is_some() {
        tracing::info!("User logged out");
    }
    found("/login", cookie_headers(removal))
}
