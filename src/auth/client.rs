use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::{Validate, ValidationError};

use super::User;
use crate::config::AuthConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

static PASSWORD_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new("[a-zA-Z0-9]").expect("static password pattern"));

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(length(min = 3))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(
        length(min = 6, message = "Password must be at least 6 characters long"),
        regex(path = *PASSWORD_CHARS, message = "Password must be alphanumeric")
    )]
    pub password: String,
    /// Requested role; empty lets the server pick its default.
    #[serde(default)]
    #[validate(custom(function = validate_role_choice))]
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email)]
    pub email: String,
    #[validate(
        length(min = 6, message = "Password must be at least 6 characters long"),
        regex(path = *PASSWORD_CHARS, message = "Password must be alphanumeric")
    )]
    pub password: String,
}

fn validate_role_choice(role: &str) -> Result<(), ValidationError> {
    match role {
        "" | "CREATOR" | "RESPONDENT" => Ok(()),
        _ => Err(ValidationError::new("role")),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthClientError {
    #[error("invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("{0}")]
    Api(String),
    #[error("auth service unreachable: {0}")]
    Network(#[from] reqwest::Error),
}

/// Client for the platform auth REST API (register/login/logout). Payloads
/// are validated before anything goes on the wire; error bodies surface
/// their `message` field.
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(auth: &AuthConfig) -> Self {
        Self::new(auth.api_url.clone())
    }

    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthResponse, AuthClientError> {
        request.validate()?;
        self.post_auth("/register", request).await
    }

    pub async fn sign_in(&self, request: &SignInRequest) -> Result<AuthResponse, AuthClientError> {
        request.validate()?;
        self.post_auth("/login", request).await
    }

    pub async fn sign_out(&self, token: &str) -> Result<(), AuthClientError> {
        let response = self
            .http
            .post(format!("{}/logout", self.base_url))
            .bearer_auth(token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn post_auth<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<AuthResponse, AuthClientError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json::<AuthResponse>().await?)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, AuthClientError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        Err(AuthClientError::Api(message))
    }
}
