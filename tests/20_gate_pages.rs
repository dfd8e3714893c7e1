mod common;

use anyhow::Result;
use reqwest::StatusCode;
use std::time::{Duration, Instant};

fn location(res: &reqwest::Response) -> &str {
    res.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

#[tokio::test]
async fn unauthenticated_dashboard_redirects_to_signin() -> Result<()> {
    let base_url = common::spawn_stack().await?;
    let client = common::client();

    let res = client.get(format!("{}/dashboard", base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/signin");
    Ok(())
}

#[tokio::test]
async fn unauthenticated_whitelist_passes() -> Result<()> {
    let base_url = common::spawn_stack().await?;
    let client = common::client();

    for path in ["/about", "/signin", "/forgot-password", "/survey/abc", "/email-verified"] {
        let res = client.get(format!("{}{}", base_url, path)).send().await?;
        assert_eq!(res.status(), StatusCode::OK, "path {}", path);

        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["data"]["forwarded"], true, "path {}", path);
        assert_eq!(body["data"]["authenticated"], false, "path {}", path);
    }
    Ok(())
}

#[tokio::test]
async fn unknown_page_fails_closed() -> Result<()> {
    let base_url = common::spawn_stack().await?;
    let client = common::client();

    let res = client.get(format!("{}/admin", base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/signin");
    Ok(())
}

#[tokio::test]
async fn respondent_is_redirected_off_creator_routes() -> Result<()> {
    let base_url = common::spawn_stack().await?;
    let client = common::client();

    let res = client
        .get(format!("{}/dashboard", base_url))
        .header("cookie", "auth-token=respondent")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/respondent");
    Ok(())
}

#[tokio::test]
async fn creator_is_redirected_off_auth_routes() -> Result<()> {
    let base_url = common::spawn_stack().await?;
    let client = common::client();

    let res = client
        .get(format!("{}/signin", base_url))
        .header("cookie", "auth-token=creator")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/dashboard");
    Ok(())
}

#[tokio::test]
async fn creator_reaches_creator_routes() -> Result<()> {
    let base_url = common::spawn_stack().await?;
    let client = common::client();

    let res = client
        .get(format!("{}/dashboard", base_url))
        .header("cookie", "auth-token=creator")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["authenticated"], true);
    // Page routes do not carry the API context headers.
    assert_eq!(body["data"]["user_id"], serde_json::Value::Null);
    Ok(())
}

#[tokio::test]
async fn creator_is_redirected_off_respondent_routes() -> Result<()> {
    let base_url = common::spawn_stack().await?;
    let client = common::client();

    let res = client
        .get(format!("{}/respondent", base_url))
        .header("cookie", "auth-token=creator")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/dashboard");
    Ok(())
}

#[tokio::test]
async fn unverified_user_is_parked_on_check_email() -> Result<()> {
    let base_url = common::spawn_stack().await?;
    let client = common::client();

    // Role matches the route, yet verification still gates it.
    let res = client
        .get(format!("{}/surveys", base_url))
        .header("cookie", "auth-token=creator-unverified")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/check-email");

    // The check-email page itself stays reachable.
    let res = client
        .get(format!("{}/check-email", base_url))
        .header("cookie", "auth-token=creator-unverified")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn invalid_role_forces_signin() -> Result<()> {
    let base_url = common::spawn_stack().await?;
    let client = common::client();

    let res = client
        .get(format!("{}/dashboard", base_url))
        .header("cookie", "auth-token=badrole")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/signin");
    Ok(())
}

#[tokio::test]
async fn slow_session_lookup_is_treated_as_no_session() -> Result<()> {
    // Lookup takes 5s, the gate bounds it at 1s.
    let auth_base = common::spawn_mock_auth(Duration::from_secs(5)).await?;
    let base_url = common::spawn_gate(&auth_base, Duration::from_secs(1)).await?;
    let client = common::client();

    let started = Instant::now();
    let res = client
        .get(format!("{}/dashboard", base_url))
        .header("cookie", "auth-token=creator")
        .send()
        .await?;
    let elapsed = started.elapsed();

    // Identical to "no session found", and answered within the bound.
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/signin");
    assert!(elapsed < Duration::from_secs(3), "gate hung for {:?}", elapsed);
    Ok(())
}
