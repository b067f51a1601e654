//! Configuration for the audit engine and its RPC collector
//!
//! Values come from the environment with sane defaults; no endpoint URLs
//! are hardcoded outside this module and `utils::constants`.

use std::time::Duration;
use tracing::info;

use crate::utils::constants::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_MAX_CONCURRENT_AUDITS, DEFAULT_RPC_TIMEOUT_SECS,
    DEFAULT_SIGNATURE_LIMIT, PUBLIC_MAINNET_RPC,
};

/// Configuration for an `Auditor` and its `SolanaClient`
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// JSON-RPC endpoint for evidence collection
    pub rpc_url: String,
    /// Timeout for individual RPC calls
    pub rpc_timeout: Duration,
    /// Bounded lookback window for signature history
    pub signature_lookback_limit: usize,
    /// TTL for cached audit results
    pub cache_ttl_secs: u64,
    /// Bound on concurrent audits in the batch endpoint
    pub max_concurrent_audits: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            rpc_url: PUBLIC_MAINNET_RPC.to_string(),
            rpc_timeout: Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS),
            signature_lookback_limit: DEFAULT_SIGNATURE_LIMIT,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            max_concurrent_audits: DEFAULT_MAX_CONCURRENT_AUDITS,
        }
    }
}

impl AuditConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// - `SOLANA_RPC_URL` - collector endpoint
    /// - `SENTRY_RPC_TIMEOUT_SECS` - per-call timeout
    /// - `SENTRY_SIGNATURE_LIMIT` - signature lookback window
    /// - `SENTRY_CACHE_TTL_SECS` - audit result cache TTL
    /// - `SENTRY_MAX_CONCURRENT` - batch concurrency bound
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let rpc_url = std::env::var("SOLANA_RPC_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.rpc_url);

        let config = Self {
            rpc_url,
            rpc_timeout: Duration::from_secs(env_parse(
                "SENTRY_RPC_TIMEOUT_SECS",
                DEFAULT_RPC_TIMEOUT_SECS,
            )),
            signature_lookback_limit: env_parse("SENTRY_SIGNATURE_LIMIT", DEFAULT_SIGNATURE_LIMIT),
            cache_ttl_secs: env_parse("SENTRY_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS),
            max_concurrent_audits: env_parse(
                "SENTRY_MAX_CONCURRENT",
                DEFAULT_MAX_CONCURRENT_AUDITS,
            ),
        };

        info!(
            rpc_timeout_secs = config.rpc_timeout.as_secs(),
            signature_limit = config.signature_lookback_limit,
            "Audit config loaded"
        );

        config
    }
}

/// Parse an env var, falling back to `default` when unset or malformed
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuditConfig::default();
        assert_eq!(config.signature_lookback_limit, 1000);
        assert!(config.rpc_url.starts_with("https://"));
        assert!(config.max_concurrent_audits > 0);
    }

    #[test]
    fn test_env_parse_fallback() {
        // Unset var falls back
        assert_eq!(env_parse("SENTRY_TEST_UNSET_VAR", 42u64), 42);
    }
}
