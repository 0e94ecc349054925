//! Parichay Server - REST API for identity QR payload decoding
//!
//! Exposes parichay-core functionality via HTTP endpoints:
//! - POST /decode-qr-string - Decode a scanned QR string
//! - POST /verify-qr - Decode plus optional identity checks

use parichay_server::{create_router_with_config, AppState, Config};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let addr = config.socket_addr();

    let app = create_router_with_config(&config, AppState::default());

    tracing::info!("Parichay server listening on http://{}", addr);
    tracing::info!("  POST /decode-qr-string - Decode a scanned QR string");
    tracing::info!("  POST /verify-qr        - Decode plus identity checks");
    tracing::info!("  POST /verify-email     - Check one email against a payload");
    tracing::info!("  POST /verify-mobile    - Check one mobile number against a payload");
    tracing::info!("  GET  /health           - Health check");
    tracing::info!("  GET  /ready            - Readiness probe");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    axum::serve(listener, app)
        .await
        .expect("Server error");
}
