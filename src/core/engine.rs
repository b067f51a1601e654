//! Top-level audit dispatch
//!
//! `Auditor` glues the evidence collector to the rule engine: fetch one
//! evidence bundle, run the matching rule set, translate the score. Evidence
//! collection is the only suspension point; rule evaluation is synchronous
//! and side-effect free, so independent audits can run in parallel.
//!
//! Fail-safe-to-untrusted: `audit` has no error exit. Any collection failure
//! is caught here, forced to maximum risk, and still produces a well-formed
//! result.

use tracing::{debug, warn};

use crate::core::rules::{evaluate_program, evaluate_transaction};
use crate::core::score::finalize;
use crate::models::config::AuditConfig;
use crate::models::errors::AppResult;
use crate::models::types::{
    AccountSnapshot, AuditResult, AuditSubjectType, ProgramEvidence, TransactionEvidence,
};
use crate::providers::EvidenceSource;
use crate::utils::constants::MAX_RISK_SCORE;

/// Audit engine over an injected evidence collector
#[derive(Clone)]
pub struct Auditor<C> {
    source: C,
    config: AuditConfig,
}

impl<C: EvidenceSource> Auditor<C> {
    pub fn new(source: C, config: AuditConfig) -> Self {
        Self { source, config }
    }

    /// Audit one subject. Never fails: collection errors degrade the result
    /// to High Risk / trust 0 with a warning naming the failure.
    pub async fn audit(&self, subject: AuditSubjectType, id: &str) -> AuditResult {
        let outcome = match subject {
            AuditSubjectType::Program => self
                .collect_program(id)
                .await
                .map(|ev| evaluate_program(&ev)),
            AuditSubjectType::Transaction => self
                .collect_transaction(id)
                .await
                .map(|ev| evaluate_transaction(&ev)),
        };

        match outcome {
            Ok((score, warnings)) => {
                debug!(subject = %subject, id, score, "Audit scored");
                finalize(id, score, warnings, false)
            }
            Err(e) => {
                warn!(subject = %subject, id, code = e.code_str(), "Evidence collection failed, escalating");
                finalize(
                    id,
                    MAX_RISK_SCORE,
                    vec![format!("error auditing {}: {}", subject, e)],
                    true,
                )
            }
        }
    }

    async fn collect_program(&self, address: &str) -> AppResult<ProgramEvidence> {
        let Some(account) = self.source.fetch_account(address).await? else {
            return Ok(ProgramEvidence::missing());
        };

        let age_seconds = self.program_age_seconds(&account).await;

        let signatures = self
            .source
            .fetch_recent_signatures(address, self.config.signature_lookback_limit)
            .await?;

        Ok(ProgramEvidence {
            exists: true,
            data_length: account.data_len,
            executable: account.executable,
            age_seconds,
            recent_signature_count: signatures.len() as u64,
            balance_lamports: account.lamports,
        })
    }

    /// Best-effort program age: block time of the current slot minus the
    /// account's epoch marker. The two are not guaranteed to share a scale,
    /// so the result is a weak signal and may even be negative. Any failure
    /// along this path degrades to `None` rather than aborting the audit.
    async fn program_age_seconds(&self, account: &AccountSnapshot) -> Option<i64> {
        let slot = match self.source.current_slot().await {
            Ok(slot) => slot,
            Err(e) => {
                debug!(code = e.code_str(), "Slot lookup failed, skipping age rules");
                return None;
            }
        };

        match self.source.block_time(slot).await {
            Ok(Some(timestamp)) => Some(timestamp - account.rent_epoch as i64),
            Ok(None) => {
                debug!(slot, "No block time for slot, skipping age rules");
                None
            }
            Err(e) => {
                debug!(code = e.code_str(), "Block time lookup failed, skipping age rules");
                None
            }
        }
    }

    async fn collect_transaction(&self, signature: &str) -> AppResult<TransactionEvidence> {
        let Some(record) = self.source.fetch_transaction(signature).await? else {
            return Ok(TransactionEvidence::missing());
        };

        Ok(TransactionEvidence {
            found: true,
            instruction_count: record.instruction_count,
            signer_count: record.signer_count,
            pre_balances: record.pre_balances,
            post_balances: record.post_balances,
            execution_error: record.err,
            log_messages: record.log_messages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::AppError;
    use crate::models::types::{RiskLevel, SignatureRecord, TransactionRecord};

    /// Collector double: every call fails
    struct FailingSource;

    impl EvidenceSource for FailingSource {
        async fn fetch_account(&self, _: &str) -> AppResult<Option<AccountSnapshot>> {
            Err(AppError::rpc_connection_failed("node unreachable"))
        }
        async fn current_slot(&self) -> AppResult<u64> {
            Err(AppError::rpc_connection_failed("node unreachable"))
        }
        async fn block_time(&self, _: u64) -> AppResult<Option<i64>> {
            Err(AppError::rpc_connection_failed("node unreachable"))
        }
        async fn fetch_recent_signatures(
            &self,
            _: &str,
            _: usize,
        ) -> AppResult<Vec<SignatureRecord>> {
            Err(AppError::rpc_connection_failed("node unreachable"))
        }
        async fn fetch_transaction(&self, _: &str) -> AppResult<Option<TransactionRecord>> {
            Err(AppError::rpc_connection_failed("node unreachable"))
        }
    }

    /// Collector double: account exists but clock calls fail
    struct BrokenClockSource;

    impl EvidenceSource for BrokenClockSource {
        async fn fetch_account(&self, _: &str) -> AppResult<Option<AccountSnapshot>> {
            Ok(Some(AccountSnapshot {
                lamports: 1_000_000_000,
                data_len: 4096,
                executable: true,
                rent_epoch: 300,
            }))
        }
        async fn current_slot(&self) -> AppResult<u64> {
            Err(AppError::rpc_timeout("slot lookup timed out"))
        }
        async fn block_time(&self, _: u64) -> AppResult<Option<i64>> {
            Err(AppError::rpc_timeout("block time timed out"))
        }
        async fn fetch_recent_signatures(
            &self,
            _: &str,
            _: usize,
        ) -> AppResult<Vec<SignatureRecord>> {
            Ok(vec![])
        }
        async fn fetch_transaction(&self, _: &str) -> AppResult<Option<TransactionRecord>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_collection_failure_escalates_to_high_risk() {
        let auditor = Auditor::new(FailingSource, AuditConfig::default());
        let result = auditor.audit(AuditSubjectType::Program, "SomeKey").await;

        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.trust_score, 0);
        assert!(result.escalated);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("error auditing program"));
    }

    #[tokio::test]
    async fn test_transaction_collection_failure_names_subject() {
        let auditor = Auditor::new(FailingSource, AuditConfig::default());
        let result = auditor.audit(AuditSubjectType::Transaction, "SomeSig").await;

        assert_eq!(result.trust_score, 0);
        assert!(result.warnings[0].contains("error auditing transaction"));
    }

    #[tokio::test]
    async fn test_broken_clock_degrades_without_escalation() {
        let auditor = Auditor::new(BrokenClockSource, AuditConfig::default());
        let result = auditor.audit(AuditSubjectType::Program, "SomeKey").await;

        // Age rules skipped, everything else clean
        assert!(!result.escalated);
        assert_eq!(result.trust_score, 100);
        assert!(result.warnings.is_empty());
    }
}
