//! Route that runs behind the full [`DEFAULT_CHAIN`].

use axum::{Json, Router, http::Uri, routing::get};
use serde::{Deserialize, Serialize};

use crate::middleware::{DEFAULT_CHAIN, apply_middlewares};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct EchoResponse {
    pub path: String,
}

async fn echo_path(uri: Uri) -> Json<EchoResponse> {
    Json(EchoResponse {
        path: uri.path().to_string(),
    })
}

/// `GET /middleware`, wrapped in recovery, logging and timing.
pub fn middleware_routes() -> Router<AppState> {
    apply_middlewares(
        Router::new().route("/middleware", get(echo_path)),
        &DEFAULT_CHAIN,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::middleware::RESPONSE_TIME_HEADER;
    use crate::state::test_support::test_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_echoes_path_through_chain() {
        let app = middleware_routes().with_state(test_state(ServerConfig::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/middleware?x=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(RESPONSE_TIME_HEADER));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let echo: EchoResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(echo.path, "/middleware");
    }
}
