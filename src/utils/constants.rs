//! Ledger constants and rule thresholds
//!
//! Every threshold the risk engine applies lives here, so the rule set stays
//! auditable in one place. No magic numbers inside `core::rules`.

/// Lamports per SOL (the ledger's smallest-unit convention)
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Seconds in one day, the "very recent program" horizon
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Public mainnet JSON-RPC endpoint (fallback when SOLANA_RPC_URL is unset)
pub const PUBLIC_MAINNET_RPC: &str = "https://api.mainnet-beta.solana.com";

// ============================================
// COLLECTOR DEFAULTS
// ============================================

/// Default signature history lookback window
pub const DEFAULT_SIGNATURE_LIMIT: usize = 1000;

/// Default per-call RPC timeout (seconds)
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;

/// Default TTL for cached audit results (seconds)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Default bound on concurrent audits in the batch endpoint
pub const DEFAULT_MAX_CONCURRENT_AUDITS: usize = 10;

/// Maximum RPC retry attempts before a collection failure escalates
pub const MAX_RPC_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds)
pub const BASE_RETRY_DELAY_MS: u64 = 100;

// ============================================
// RISK ENGINE THRESHOLDS
// ============================================

/// Cumulative risk score that maps to trust 0 (also the not-found weight)
pub const MAX_RISK_SCORE: u32 = 10;

/// Programs smaller than this (bytes) look suspiciously minimal
pub const MIN_PROGRAM_DATA_LEN: u64 = 100;

/// Programs younger than this (seconds) are flagged as very recent
pub const RECENT_AGE_SECS: i64 = SECONDS_PER_DAY;

/// Signature rate (per day) above which activity looks abnormal
pub const HIGH_FREQUENCY_PER_DAY: f64 = 100.0;

/// Guard against zero or negative age in the frequency denominator
pub const AGE_EPSILON_DAYS: f64 = 1e-6;

/// Program balances above this (lamports) are unusually large
pub const HIGH_BALANCE_LAMPORTS: u64 = 1000 * LAMPORTS_PER_SOL;

/// Per-account balance delta (lamports) considered a large shift
pub const LARGE_SHIFT_LAMPORTS: i128 = 100 * LAMPORTS_PER_SOL as i128;

/// Transactions with more instructions than this are flagged
pub const MAX_PLAIN_INSTRUCTIONS: u64 = 5;

/// Case-sensitive substrings that mark a log line as suspicious
pub const SUSPICIOUS_LOG_MARKERS: [&str; 3] = ["error", "failed", "invalid"];

/// Convert lamports to whole SOL for display
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lamports_conversion() {
        assert_eq!(lamports_to_sol(LAMPORTS_PER_SOL), 1.0);
        assert_eq!(lamports_to_sol(500_000_000), 0.5);
    }

    #[test]
    fn test_threshold_consistency() {
        assert_eq!(HIGH_BALANCE_LAMPORTS, 1_000_000_000_000);
        assert_eq!(LARGE_SHIFT_LAMPORTS, 100_000_000_000);
        assert_eq!(RECENT_AGE_SECS, 86_400);
    }
}
