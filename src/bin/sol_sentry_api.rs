//! Sol Sentry Audit API server
//!
//! REST API over the audit engine: single audits, bounded batch audits,
//! stats, and health.
//!
//! Usage:
//!   cargo run --bin sol_sentry_api
//!
//! Environment:
//!   SENTRY_PORT    - server port (default: 8080; PORT also honored)
//!   SENTRY_HOST    - server host (default: 0.0.0.0)
//!   SOLANA_RPC_URL - JSON-RPC endpoint for evidence collection
//!   RUST_LOG       - log filter (default: info)

use sol_sentry::api::{create_router, handlers::AppState, start_cleanup_task};
use sol_sentry::{AuditConfig, AuditTelemetry};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    print_banner();

    let telemetry = Arc::new(AuditTelemetry::new());
    let telemetry_for_shutdown = telemetry.clone();

    let config = AuditConfig::from_env();
    let state = Arc::new(
        AppState::new(config, telemetry).map_err(|e| eyre::eyre!(e.to_string()))?,
    );

    start_cleanup_task();

    let app = create_router(state);

    let host = std::env::var("SENTRY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("SENTRY_PORT"))
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("🚀 Sol Sentry API starting on http://{}", addr);
    info!("");
    info!("Endpoints:");
    info!("  POST /v1/audit        - Audit one program or transaction");
    info!("  POST /v1/audit/batch  - Audit up to 50 subjects");
    info!("  GET  /v1/stats        - Audit statistics");
    info!("  GET  /v1/health       - Health check");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("");
    info!("🛑 Shutdown signal received");

    let stats = telemetry_for_shutdown.snapshot();
    info!("   Audits run:       {}", stats.total_audits);
    info!("   High risk:        {}", stats.high_risk);
    info!("   Escalated:        {}", stats.total_escalated);
    info!("   Avg latency:      {:.2}ms", stats.avg_latency_ms);
    info!("🛑 Sol Sentry API shutdown complete");

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ╔══════════════════════════════════════════════╗
    ║                                              ║
    ║   S O L   S E N T R Y   A P I   v{}       ║
    ║   On-Chain Trust Auditing Service            ║
    ║                                              ║
    ╚══════════════════════════════════════════════╝
    "#,
        env!("CARGO_PKG_VERSION")
    );
}
