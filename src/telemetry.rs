//! In-process audit telemetry
//!
//! Lock-free counters for monitoring: audits run, tier distribution,
//! escalated failures, rolling average latency. Exposed on the /v1/stats
//! endpoint and printed at shutdown. No identifiers are recorded.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::types::{AuditResult, RiskLevel};

/// Aggregated counters since process start
pub struct AuditTelemetry {
    total_audits: AtomicU64,
    total_escalated: AtomicU64,
    very_low: AtomicU64,
    low: AtomicU64,
    moderate: AtomicU64,
    high: AtomicU64,
    total_latency_ms: AtomicU64,
    session_start: u64,
}

impl Default for AuditTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditTelemetry {
    pub fn new() -> Self {
        Self {
            total_audits: AtomicU64::new(0),
            total_escalated: AtomicU64::new(0),
            very_low: AtomicU64::new(0),
            low: AtomicU64::new(0),
            moderate: AtomicU64::new(0),
            high: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            session_start: current_timestamp(),
        }
    }

    pub fn record_audit(&self, result: &AuditResult, latency_ms: u64) {
        self.total_audits.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);

        if result.escalated {
            self.total_escalated.fetch_add(1, Ordering::Relaxed);
        }

        let tier_counter = match result.risk_level {
            RiskLevel::VeryLow => &self.very_low,
            RiskLevel::Low => &self.low,
            RiskLevel::Moderate => &self.moderate,
            RiskLevel::High => &self.high,
        };
        tier_counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TelemetryStats {
        let total = self.total_audits.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        TelemetryStats {
            total_audits: total,
            total_escalated: self.total_escalated.load(Ordering::Relaxed),
            very_low_risk: self.very_low.load(Ordering::Relaxed),
            low_risk: self.low.load(Ordering::Relaxed),
            moderate_risk: self.moderate.load(Ordering::Relaxed),
            high_risk: self.high.load(Ordering::Relaxed),
            avg_latency_ms: if total > 0 {
                total_latency as f64 / total as f64
            } else {
                0.0
            },
            uptime_seconds: current_timestamp().saturating_sub(self.session_start),
        }
    }
}

/// Snapshot of telemetry counters
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryStats {
    pub total_audits: u64,
    /// Audits where evidence collection failed and risk was forced to max
    pub total_escalated: u64,
    pub very_low_risk: u64,
    pub low_risk: u64,
    pub moderate_risk: u64,
    pub high_risk: u64,
    pub avg_latency_ms: f64,
    pub uptime_seconds: u64,
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::score::finalize;

    #[test]
    fn test_records_tier_distribution() {
        let telemetry = AuditTelemetry::new();
        telemetry.record_audit(&finalize("a", 0, vec![], false), 20);
        telemetry.record_audit(&finalize("b", 9, vec![], false), 40);
        telemetry.record_audit(&finalize("c", 10, vec![], true), 60);

        let stats = telemetry.snapshot();
        assert_eq!(stats.total_audits, 3);
        assert_eq!(stats.very_low_risk, 1);
        assert_eq!(stats.high_risk, 2);
        assert_eq!(stats.total_escalated, 1);
        assert_eq!(stats.avg_latency_ms, 40.0);
    }

    #[test]
    fn test_empty_snapshot() {
        let stats = AuditTelemetry::new().snapshot();
        assert_eq!(stats.total_audits, 0);
        assert_eq!(stats.avg_latency_ms, 0.0);
    }
}
