use tracing_subscriber::EnvFilter;

use survey_gate::{app, config, GateState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up AUTH_SERVICE_URL, PORT, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if config.server.enable_request_logging {
                EnvFilter::new("survey_gate=debug,tower_http=debug")
            } else {
                EnvFilter::new("survey_gate=info")
            }
        }))
        .init();

    tracing::info!("Starting survey gate in {:?} mode", config.environment);

    let state = GateState::from_config(config)
        .unwrap_or_else(|e| panic!("invalid auth service URL {}: {}", config.auth.service_url, e));

    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("survey gate listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
