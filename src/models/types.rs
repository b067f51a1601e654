//! Type definitions for Sol Sentry
//! Core data structures for program and transaction audits

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::errors::AppError;

/// What kind of on-chain entity is being audited.
///
/// Always supplied explicitly by the caller - never inferred from the
/// identifier shape, since account keys and transaction signatures can be
/// confusable in format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSubjectType {
    /// Deployed executable account, addressed by pubkey
    Program,
    /// Submitted transaction, addressed by signature
    Transaction,
}

impl AuditSubjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditSubjectType::Program => "program",
            AuditSubjectType::Transaction => "transaction",
        }
    }
}

impl fmt::Display for AuditSubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditSubjectType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "program" => Ok(AuditSubjectType::Program),
            "transaction" | "tx" => Ok(AuditSubjectType::Transaction),
            other => Err(AppError::invalid_subject(format!(
                "unknown subject type '{}', expected 'program' or 'transaction'",
                other
            ))),
        }
    }
}

/// Risk tier derived from the cumulative risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Very Low Risk")]
    VeryLow,
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Moderate Risk")]
    Moderate,
    #[serde(rename = "High Risk")]
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "Very Low Risk",
            RiskLevel::Low => "Low Risk",
            RiskLevel::Moderate => "Moderate Risk",
            RiskLevel::High => "High Risk",
        }
    }

    /// Fixed human-readable sentence per tier
    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "Seems safe, but always verify.",
            RiskLevel::Low => "Not many issues, but exercise caution.",
            RiskLevel::Moderate => "Further review recommended.",
            RiskLevel::High => "Careful review strongly recommended.",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "✅",
            RiskLevel::Low => "🟡",
            RiskLevel::Moderate => "🟠",
            RiskLevel::High => "🔴",
        }
    }
}

/// Snapshot of one on-chain account at query time.
///
/// Constructed once per audit from collector responses, immutable, and
/// discarded after scoring.
#[derive(Debug, Clone, Default)]
pub struct ProgramEvidence {
    pub exists: bool,
    /// Account data size in bytes
    pub data_length: u64,
    pub executable: bool,
    /// Best-effort age derived from block time; None when clock sources are
    /// unavailable. May be negative when upstream scales disagree.
    pub age_seconds: Option<i64>,
    /// Signatures observed within the bounded lookback window
    pub recent_signature_count: u64,
    pub balance_lamports: u64,
}

impl ProgramEvidence {
    /// Evidence bundle for an account that does not exist on-chain
    pub fn missing() -> Self {
        Self::default()
    }
}

/// Snapshot of one transaction at query time
#[derive(Debug, Clone, Default)]
pub struct TransactionEvidence {
    pub found: bool,
    pub instruction_count: u64,
    pub signer_count: u64,
    /// Index-aligned with post_balances; unequal lengths are tolerated and a
    /// missing entry reads as 0
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
    /// Present when the transaction failed on-chain; kept opaque
    pub execution_error: Option<serde_json::Value>,
    pub log_messages: Vec<String>,
}

impl TransactionEvidence {
    /// Evidence bundle for a transaction the ledger has no record of
    pub fn missing() -> Self {
        Self::default()
    }
}

/// Final audit output. Always well-formed, even when evidence collection
/// failed (the engine escalates failures to maximum risk instead of erroring).
#[derive(Debug, Clone, Serialize)]
pub struct AuditResult {
    /// Input identifier, echoed verbatim
    pub id: String,
    /// Trust percentage 0-100, inversely related to the risk score.
    /// Kept numeric internally; rendered as text only at the API boundary.
    pub trust_score: u8,
    pub risk_level: RiskLevel,
    pub risk_desc: &'static str,
    /// Warnings in rule evaluation order, for reproducibility
    pub warnings: Vec<String>,
    /// Set when evidence collection failed and the score was forced to
    /// maximum. Not part of the wire format; used to skip caching.
    #[serde(skip)]
    pub escalated: bool,
}

impl AuditResult {
    /// Pretty print for CLI / log output
    pub fn summary(&self) -> String {
        let mut output = format!(
            "\n{} {} | Trust: {}% | {}\n",
            self.risk_level.emoji(),
            self.risk_level.as_str(),
            self.trust_score,
            self.id,
        );
        output.push_str(&format!("   {}\n", self.risk_desc));

        if !self.warnings.is_empty() {
            output.push_str("   Warnings:\n");
            for warning in &self.warnings {
                output.push_str(&format!("     - {}\n", warning));
            }
        }

        output
    }
}

// ============================================
// COLLECTOR SNAPSHOT TYPES
// ============================================

/// Raw account view returned by the evidence collector
#[derive(Debug, Clone)]
pub struct AccountSnapshot {
    pub lamports: u64,
    /// Account data size in bytes
    pub data_len: u64,
    pub executable: bool,
    /// Epoch marker used for best-effort age derivation
    pub rent_epoch: u64,
}

/// One entry from the signature history lookback window
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRecord {
    pub signature: String,
    pub slot: u64,
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    #[serde(default)]
    pub block_time: Option<i64>,
}

/// Raw transaction view returned by the evidence collector
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub instruction_count: u64,
    pub signer_count: u64,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
    pub err: Option<serde_json::Value>,
    pub log_messages: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_type_parsing() {
        assert_eq!(
            "program".parse::<AuditSubjectType>().unwrap(),
            AuditSubjectType::Program
        );
        assert_eq!(
            "Transaction".parse::<AuditSubjectType>().unwrap(),
            AuditSubjectType::Transaction
        );
        assert!("account".parse::<AuditSubjectType>().is_err());
    }

    #[test]
    fn test_risk_level_labels() {
        assert_eq!(RiskLevel::High.as_str(), "High Risk");
        assert_eq!(
            RiskLevel::High.description(),
            "Careful review strongly recommended."
        );
        assert_eq!(
            RiskLevel::VeryLow.description(),
            "Seems safe, but always verify."
        );
    }

    #[test]
    fn test_missing_evidence_defaults() {
        let program = ProgramEvidence::missing();
        assert!(!program.exists);
        assert_eq!(program.recent_signature_count, 0);

        let tx = TransactionEvidence::missing();
        assert!(!tx.found);
        assert!(tx.log_messages.is_empty());
    }

    #[test]
    fn test_result_summary_contains_warnings() {
        let result = AuditResult {
            id: "abc".to_string(),
            trust_score: 80,
            risk_level: RiskLevel::VeryLow,
            risk_desc: RiskLevel::VeryLow.description(),
            warnings: vec!["very small program size".to_string()],
            escalated: false,
        };
        let summary = result.summary();
        assert!(summary.contains("Trust: 80%"));
        assert!(summary.contains("very small program size"));
    }
}
