use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::auth::UserRole;
use crate::config::GateConfig;
use crate::error::ApiError;
use crate::routes::{is_api_path, RouteKind, RouteTable};
use crate::session::{HttpSessionLookup, Session, SessionLookup};

const SIGNIN: &str = "/signin";
const CHECK_EMAIL: &str = "/check-email";

/// Outcome of the access gate for one request. A request either proceeds to
/// its handler unmodified or terminates here; there is no partial
/// processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Redirect { target: String, reason: &'static str },
    Reject { status: StatusCode, message: &'static str },
}

impl Decision {
    fn redirect(target: impl Into<String>, reason: &'static str) -> Self {
        Decision::Redirect {
            target: target.into(),
            reason,
        }
    }

    fn reject(message: &'static str) -> Self {
        // Role mismatches also answer 401, never 403: the observed client
        // contract treats both as "re-authenticate".
        Decision::Reject {
            status: StatusCode::UNAUTHORIZED,
            message,
        }
    }
}

/// Shared gate dependencies: the injected session lookup and the fixed
/// route table.
#[derive(Clone)]
pub struct GateState {
    pub lookup: Arc<dyn SessionLookup>,
    pub table: Arc<RouteTable>,
}

impl GateState {
    pub fn new(lookup: Arc<dyn SessionLookup>) -> Self {
        Self {
            lookup,
            table: Arc::new(RouteTable::default()),
        }
    }

    pub fn from_config(config: &GateConfig) -> Result<Self, url::ParseError> {
        Ok(Self::new(Arc::new(HttpSessionLookup::from_config(&config.auth)?)))
    }
}

/// Authenticated caller context injected into request extensions when the
/// gate lets an authenticated request through.
#[derive(Debug, Clone)]
pub struct GateUser {
    pub id: String,
    pub role: UserRole,
}

/// Pure access rules: (path, session) -> decision. Rules fire in priority
/// order; the first applicable one wins.
pub fn decide(table: &RouteTable, path: &str, session: Option<&Session>) -> Decision {
    let kind = table.classify(path);
    let api = is_api_path(path);

    // Auth-service and public-API prefixes bypass the gate entirely.
    if matches!(kind, RouteKind::ApiAuth | RouteKind::ApiPublic) {
        return Decision::Continue;
    }

    // A session carrying a role outside the closed set is corrupt or stale:
    // force re-authentication instead of guessing.
    let role = match session {
        Some(session) => match session.user.role.parse::<UserRole>() {
            Ok(role) => Some(role),
            Err(_) => {
                return if api {
                    Decision::reject("Invalid user role")
                } else {
                    Decision::redirect(SIGNIN, "invalid role")
                };
            }
        },
        None => None,
    };

    // Unverified accounts are parked on the check-email page. API paths and
    // the verification landing page are exempt, and a request already on
    // the check-email page continues rather than redirecting to itself.
    if let Some(session) = session {
        if !session.user.email_verified && !api && kind != RouteKind::Verification {
            if path != CHECK_EMAIL {
                return Decision::redirect(CHECK_EMAIL, "email not verified");
            }
            return Decision::Continue;
        }
    }

    // Unauthenticated requests pass only on whitelisted kinds; everything
    // else fails closed.
    let Some(role) = role else {
        return match kind {
            RouteKind::Public
            | RouteKind::Auth
            | RouteKind::Password
            | RouteKind::SurveyResponse
            | RouteKind::Verification => Decision::Continue,
            _ if api => Decision::reject("Authentication required"),
            _ => Decision::redirect(SIGNIN, "authentication required"),
        };
    };

    match kind {
        // Signed-in users are bounced off the auth and password flows to
        // their role's landing page.
        RouteKind::Auth | RouteKind::Password => {
            Decision::redirect(role.home(), "already authenticated")
        }
        // Role-gated page trees; the wrong role lands on its own home.
        RouteKind::Creator if role == UserRole::Respondent => {
            Decision::redirect(UserRole::Respondent.home(), "creator route")
        }
        RouteKind::Respondent if role == UserRole::Creator => {
            Decision::redirect(UserRole::Creator.home(), "respondent route")
        }
        // ApiProtected needs authentication only, which is guaranteed by
        // this point; Public, SurveyResponse, Verification and Unknown all
        // continue for authenticated users.
        _ => Decision::Continue,
    }
}

/// Gate middleware: classify, resolve the session, decide, and either
/// forward the request (with security headers and user context) or answer
/// with the redirect/rejection.
pub async fn gate_middleware(
    State(state): State<GateState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    let method = request.method().clone();
    let kind = state.table.classify(&path);

    // The bypass kinds never trigger a session lookup.
    if matches!(kind, RouteKind::ApiAuth | RouteKind::ApiPublic) {
        let mut response = next.run(request).await;
        apply_security_headers(response.headers_mut());
        return response;
    }

    let cookie_header = request
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_owned();

    let session = state.lookup.resolve(&cookie_header).await;

    match decide(&state.table, &path, session.as_ref()) {
        Decision::Continue => {
            if let Some(session) = &session {
                if let Ok(role) = session.user.role.parse::<UserRole>() {
                    attach_user_context(&mut request, &session.user.id, role, is_api_path(&path));
                }
            }
            let mut response = next.run(request).await;
            apply_security_headers(response.headers_mut());
            response
        }
        Decision::Redirect { target, reason } => {
            tracing::debug!(
                %method, %path, kind = kind.as_str(), target = %target, reason,
                "gate redirect"
            );
            Redirect::temporary(&target).into_response()
        }
        Decision::Reject { status, message } => {
            tracing::debug!(
                %method, %path, kind = kind.as_str(), status = %status, message,
                "gate reject"
            );
            ApiError::unauthorized(message).into_response()
        }
    }
}

/// Propagate the authenticated caller to downstream handlers: request
/// headers for API paths (consumed by the platform API), a typed extension
/// for in-process handlers.
fn attach_user_context(request: &mut Request, user_id: &str, role: UserRole, api: bool) {
    if api {
        let headers = request.headers_mut();
        if let Ok(value) = HeaderValue::from_str(user_id) {
            headers.insert("x-user-id", value);
        }
        headers.insert("x-user-role", HeaderValue::from_static(role.as_str()));
    }

    request.extensions_mut().insert(GateUser {
        id: user_id.to_owned(),
        role,
    });
}

fn apply_security_headers(headers: &mut HeaderMap) {
    headers.insert("x-content-type-options", HeaderValue::from_static("nosniff"));
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert("x-xss-protection", HeaderValue::from_static("1; mode=block"));
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
}
