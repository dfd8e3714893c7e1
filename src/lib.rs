pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod session;

pub use middleware::{gate_middleware, GateState};

use axum::{middleware::from_fn_with_state, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Standalone gate router: the gate-owned endpoints plus a stand-in
/// downstream responder, with the gate layered over everything except
/// `/health`.
pub fn app(state: GateState) -> Router {
    let gated = Router::new()
        .route("/", get(handlers::root))
        .fallback(handlers::forwarded)
        .layer(from_fn_with_state(state.clone(), gate_middleware));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(gated)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Apply the gate in front of an existing application router.
pub fn protect(router: Router, state: GateState) -> Router {
    router.layer(from_fn_with_state(state, gate_middleware))
}
