use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::config::AuthConfig;

/// Lookup endpoint exposed by the external auth provider.
const GET_SESSION_PATH: &str = "/api/auth/get-session";

/// Session issued by the external auth provider. Opaque to the gate beyond
/// the user fields consulted for access decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    /// Raw role string. The gate parses it; anything outside the closed
    /// CREATOR/RESPONDENT set is treated as a corrupt session.
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub email_verified: bool,
}

/// Injected session-lookup seam so the gate can be exercised against a fake
/// provider in tests.
#[async_trait]
pub trait SessionLookup: Send + Sync {
    /// Resolve the session for an inbound request's cookies.
    ///
    /// Never errors: any network failure, timeout, non-2xx status, or
    /// malformed body is "no session" for this request. The next request
    /// re-resolves independently; there is no retry and no caching here.
    async fn resolve(&self, cookie_header: &str) -> Option<Session>;

    /// Liveness probe for the provider, surfaced by the health endpoint.
    async fn healthy(&self) -> bool {
        true
    }
}

/// `SessionLookup` backed by the auth provider's HTTP endpoint. Forwards the
/// raw `Cookie` header and bounds each call with the configured timeout.
pub struct HttpSessionLookup {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    health_timeout: Duration,
}

impl HttpSessionLookup {
    pub fn new(base_url: Url, timeout: Duration, health_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            timeout,
            health_timeout,
        }
    }

    pub fn from_config(auth: &AuthConfig) -> Result<Self, url::ParseError> {
        Ok(Self::new(
            Url::parse(&auth.service_url)?,
            Duration::from_secs(auth.lookup_timeout_secs),
            Duration::from_secs(auth.health_timeout_secs),
        ))
    }

    fn session_url(&self) -> Option<Url> {
        match self.base_url.join(GET_SESSION_PATH) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::error!("invalid auth service URL {}: {}", self.base_url, e);
                None
            }
        }
    }
}

#[async_trait]
impl SessionLookup for HttpSessionLookup {
    async fn resolve(&self, cookie_header: &str) -> Option<Session> {
        let url = self.session_url()?;

        let response = match self
            .client
            .get(url)
            .header(header::COOKIE, cookie_header)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("session lookup failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("session lookup returned {}", response.status());
            return None;
        }

        // The provider answers `null` when no session exists for the cookie.
        match response.json::<Option<Session>>().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("malformed session payload: {}", e);
                None
            }
        }
    }

    async fn healthy(&self) -> bool {
        let Some(url) = self.session_url() else {
            return false;
        };

        match self.client.get(url).timeout(self.health_timeout).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
