use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, GateState, GateUser};

/// Root info endpoint describing the gated route surface.
pub async fn root() -> ApiResponse<Value> {
    let version = env!("CARGO_PKG_VERSION");

    ApiResponse::success(json!({
        "name": "Survey Gate",
        "version": version,
        "description": "Edge authentication gate for the survey platform",
        "routes": {
            "public": "/, /about, /features (no session required)",
            "auth": "/signin, /signup, /check-email (signed-in users are redirected home)",
            "password": "/reset-password, /forgot-password",
            "verification": "/email-verified",
            "creator": "/dashboard, /surveys, /responses, /analytics (CREATOR role)",
            "respondent": "/respondent (RESPONDENT role)",
            "survey_response": "/survey (open to respondents and anonymous users)",
            "api_auth": "/api/auth (bypasses the gate)",
            "api_public": "/api/surveys/public (bypasses the gate)",
            "api_protected": "/api/surveys, /api/responses, /api/questions (session required)",
        }
    }))
}

/// Liveness endpoint, mounted outside the gate. Degrades when the auth
/// provider stops answering session lookups.
pub async fn health(State(state): State<GateState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    if state.lookup.healthy().await {
        (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "auth_service": "ok"
                }
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "auth service unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now
                }
            })),
        )
    }
}

/// Stand-in downstream responder used when the gate runs standalone. Echoes
/// what the gate forwarded so operators and integration tests can observe
/// the propagated context.
pub async fn forwarded(request: Request) -> ApiResponse<Value> {
    let user = request.extensions().get::<GateUser>();

    ApiResponse::success(json!({
        "forwarded": true,
        "method": request.method().as_str(),
        "path": request.uri().path(),
        "user_id": request.headers().get("x-user-id").and_then(|v| v.to_str().ok()),
        "user_role": request.headers().get("x-user-role").and_then(|v| v.to_str().ok()),
        "authenticated": user.is_some(),
    }))
}
