//! HTTP server for the Salary Engine.
//!
//! Usage: `salary-engine-server [CONFIG.yaml]`. Without a path the
//! `SALARY_CONFIG` environment variable is consulted; settings can always
//! be overridden with `SALARY_*` variables.

use std::path::PathBuf;

use salary_engine::api::{AppState, create_router};
use salary_engine::config::AppConfig;
use salary_engine::session::Session;
use salary_engine::telemetry::init_tracing;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SALARY_CONFIG").ok())
        .map(PathBuf::from);

    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log_level);
    info!(
        bind_addr = %config.bind_addr,
        backend = ?config.storage.backend,
        "Starting salary-engine-server"
    );

    let session = match Session::from_config(&config) {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "Failed to set up session");
            std::process::exit(1);
        }
    };
    session.load().await;

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(bind_addr = %config.bind_addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };

    let router = create_router(AppState::new(session));
    if let Err(e) = axum::serve(listener, router).await {
        error!(error = %e, "Server stopped");
        std::process::exit(1);
    }
}
