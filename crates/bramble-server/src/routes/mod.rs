//! HTTP routes.

pub mod count;
pub mod demo;
pub mod health;
pub mod login;
pub mod ping;
pub mod upload;

pub use count::{CountResponse, count_handler};
pub use demo::{EchoResponse, middleware_routes};
pub use health::{HealthResponse, health_routes};
pub use login::{LoginForm, LoginResponse, login_form_handler, login_handler, logout_handler};
pub use ping::{ping_get_handler, ping_post_handler};
pub use upload::{TokenResponse, UploadResponse, upload_form_handler, upload_handler, upload_routes};

use axum::{
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{LOCATION, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use cookie::Cookie;

/// Session key holding the logged-in user name.
pub const USERNAME_KEY: &str = "username";

/// Session key holding the `/count` visit counter.
pub const COUNT_KEY: &str = "countnum";

/// Response headers carrying `cookie`, if any.
pub(crate) fn cookie_headers(cookie: Option<Cookie<'static>>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(cookie) = cookie {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(error = %e, "Dropping unrepresentable cookie"),
        }
    }
    headers
}

/// `302 Found` to `location`, keeping any headers already collected.
pub(crate) fn found(location: &'static str, mut headers: HeaderMap) -> Response {
    headers.insert(LOCATION, HeaderValue::from_static(location));
    (StatusCode::FOUND, headers).into_response()
}
