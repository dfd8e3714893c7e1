use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{extract::Request, http::header, routing::get, Json, Router};
use serde_json::{json, Value};
use url::Url;

use survey_gate::session::HttpSessionLookup;
use survey_gate::GateState;

/// Spawn an in-process stand-in for the external auth provider. Sessions
/// are keyed off the `auth-token` cookie value; unknown tokens answer
/// `null` like the real provider. `latency` delays every lookup, which the
/// timeout tests use.
pub async fn spawn_mock_auth(latency: Duration) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;

    let app = Router::new().route(
        "/api/auth/get-session",
        get(move |request: Request| async move {
            tokio::time::sleep(latency).await;
            Json(session_for(&request))
        }),
    );

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind mock auth listener")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("http://127.0.0.1:{}", port))
}

fn session_for(request: &Request) -> Value {
    let cookie_header = request
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    let token = cookie_header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix("auth-token="));

    match token {
        Some("creator") => json!({
            "user": {"id": "usr_creator", "role": "CREATOR", "emailVerified": true}
        }),
        Some("creator-unverified") => json!({
            "user": {"id": "usr_unverified", "role": "CREATOR", "emailVerified": false}
        }),
        Some("respondent") => json!({
            "user": {"id": "usr_respondent", "role": "RESPONDENT", "emailVerified": true}
        }),
        Some("badrole") => json!({
            "user": {"id": "usr_bad", "role": "ADMIN", "emailVerified": true}
        }),
        _ => Value::Null,
    }
}

/// Spawn the gate app against the given auth provider URL.
pub async fn spawn_gate(auth_base: &str, lookup_timeout: Duration) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;

    let lookup = HttpSessionLookup::new(
        Url::parse(auth_base).context("invalid auth base url")?,
        lookup_timeout,
        Duration::from_secs(2),
    );
    let app = survey_gate::app(GateState::new(Arc::new(lookup)));

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind gate listener")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("http://127.0.0.1:{}", port))
}

/// Mock auth provider plus gate, with the default 10s lookup bound.
pub async fn spawn_stack() -> Result<String> {
    let auth_base = spawn_mock_auth(Duration::ZERO).await?;
    spawn_gate(&auth_base, Duration::from_secs(10)).await
}

/// Client with redirects disabled so gate redirects stay observable.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("failed to build test client")
}
