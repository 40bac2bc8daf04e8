//! Integration tests for the cookie-backed session flow.

mod common;

use std::time::Duration;

use anyhow::Result;
use bramble_session::ManagerConfig;
use common::{TestServer, cookie_pair};
use reqwest::{
    StatusCode,
    header::{COOKIE, LOCATION, SET_COOKIE},
};

#[tokio::test]
async fn test_count_without_session_redirects_to_login() -> Result<()> {
    let server = TestServer::start().await?;

    let resp = server.get("/count").send().await?;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers()[LOCATION], "/login");
    assert!(server.sessions.provider().is_empty());

    server.stop().await
}

#[tokio::test]
async fn test_login_count_logout() -> Result<()> {
    let server = TestServer::start().await?;

    let resp = server
        .post("/login")
        .form(&[("username", "astaxie")])
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers()[LOCATION], "/count");

    let set_cookie = resp.headers()[SET_COOKIE].to_str()?.to_string();
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("HttpOnly"));
    let cookie = cookie_pair(&resp).expect("login sets a session cookie");

    for expected in 1..=3 {
        let body: serde_json::Value = server
            .get("/count")
            .header(COOKIE, &cookie)
            .send()
            .await?
            .json()
            .await?;
        assert_eq!(body["count"], expected);
    }

    let body: serde_json::Value = server
        .get("/login")
        .header(COOKIE, &cookie)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["username"], "astaxie");

    let resp = server.post("/logout").header(COOKIE, &cookie).send().await?;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers()[LOCATION], "/login");
    assert!(resp.headers()[SET_COOKIE].to_str()?.contains("Max-Age=0"));
    assert!(server.sessions.provider().is_empty());

    server.stop().await
}

#[tokio::test]
async fn test_clients_get_distinct_sessions() -> Result<()> {
    let server = TestServer::start().await?;

    let first = server.get("/login").send().await?;
    let second = server.get("/login").send().await?;

    let a = cookie_pair(&first).expect("cookie");
    let b = cookie_pair(&second).expect("cookie");
    assert_ne!(a, b);
    assert_eq!(server.sessions.provider().len(), 2);

    server.stop().await
}

#[tokio::test]
async fn test_expired_session_is_collected() -> Result<()> {
    let server = TestServer::start_with(
        |config| config,
        ManagerConfig::new().with_max_lifetime(Duration::from_secs(1)),
    )
    .await?;

    let resp = server.get("/login").send().await?;
    let cookie = cookie_pair(&resp).expect("cookie");
    assert_eq!(server.sessions.provider().len(), 1);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(server.sessions.gc(), 1);
    assert!(server.sessions.provider().is_empty());

    // The stale cookie still resolves, to a fresh empty session.
    let body: serde_json::Value = server
        .get("/count")
        .header(COOKIE, &cookie)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["count"], 1);

    server.stop().await
}
