//! Sol Sentry - on-chain trust auditor CLI
//!
//! Audits a single program or transaction against the configured RPC
//! endpoint and prints the trust score, risk tier, and warnings.
//!
//! Usage:
//!   sol_sentry <program|transaction> <identifier>
//!
//! Environment:
//!   SOLANA_RPC_URL - JSON-RPC endpoint (default: public mainnet)
//!   RUST_LOG       - log filter (default: info)

use sol_sentry::{AuditConfig, AuditSubjectType, Auditor, SolanaClient};

use eyre::{eyre, Result};
use std::str::FromStr;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let mut args = std::env::args().skip(1);
    let (subject_arg, id) = match (args.next(), args.next()) {
        (Some(subject), Some(id)) => (subject, id),
        _ => {
            eprintln!("Usage: sol_sentry <program|transaction> <identifier>");
            std::process::exit(2);
        }
    };

    let subject = AuditSubjectType::from_str(&subject_arg).map_err(|e| eyre!(e.to_string()))?;

    println!(
        r#"
    ╔════════════════════════════════════════╗
    ║   S O L   S E N T R Y   v{}         ║
    ║   On-Chain Trust Auditor               ║
    ╚════════════════════════════════════════╝
    "#,
        env!("CARGO_PKG_VERSION")
    );

    let config = AuditConfig::from_env();
    println!("    RPC endpoint: {}\n", config.rpc_url);

    let client = SolanaClient::new(&config).map_err(|e| eyre!(e.to_string()))?;
    let auditor = Auditor::new(client, config);

    let result = auditor.audit(subject, &id).await;
    println!("{}", result.summary());

    // A risky subject is still a successful audit; only usage errors are
    // non-zero exits
    Ok(())
}
