//! Risk Engine rule set
//!
//! Each rule is an independent pure check over one evidence bundle: it either
//! contributes its fixed weight plus a warning, contributes nothing, or is
//! skipped when the evidence it needs is unavailable. The cumulative score is
//! the plain sum of fired weights; warnings come out in table order so results
//! are reproducible.
//!
//! Existence is the one prerequisite rule: a subject that does not exist
//! short-circuits to the maximum score, since no other evidence about it is
//! meaningful.

use crate::models::types::{ProgramEvidence, TransactionEvidence};
use crate::utils::constants::{
    AGE_EPSILON_DAYS, HIGH_BALANCE_LAMPORTS, HIGH_FREQUENCY_PER_DAY, LARGE_SHIFT_LAMPORTS,
    MAX_PLAIN_INSTRUCTIONS, MAX_RISK_SCORE, MIN_PROGRAM_DATA_LEN, RECENT_AGE_SECS,
    SECONDS_PER_DAY, SUSPICIOUS_LOG_MARKERS,
};

/// One entry in a rule table.
///
/// `triggered` returns `None` when the evidence the rule needs is missing;
/// the rule is then skipped without affecting the rest of the audit.
pub struct RiskRule<E> {
    pub weight: u32,
    pub warning: &'static str,
    pub triggered: fn(&E) -> Option<bool>,
}

fn run_rules<E>(rules: &[RiskRule<E>], evidence: &E) -> (u32, Vec<String>) {
    let mut score = 0;
    let mut warnings = Vec::new();

    for rule in rules {
        if (rule.triggered)(evidence) == Some(true) {
            score += rule.weight;
            warnings.push(rule.warning.to_string());
        }
    }

    (score, warnings)
}

// ============================================
// PROGRAM RULES
// ============================================

fn small_program(ev: &ProgramEvidence) -> Option<bool> {
    Some(ev.data_length < MIN_PROGRAM_DATA_LEN)
}

fn not_executable(ev: &ProgramEvidence) -> Option<bool> {
    Some(!ev.executable)
}

fn very_recent(ev: &ProgramEvidence) -> Option<bool> {
    // Skipped entirely when clock sources were unavailable
    ev.age_seconds.map(|age| age < RECENT_AGE_SECS)
}

fn high_frequency(ev: &ProgramEvidence) -> Option<bool> {
    ev.age_seconds.map(|age| {
        let age_days = (age as f64 / SECONDS_PER_DAY as f64).max(AGE_EPSILON_DAYS);
        ev.recent_signature_count as f64 / age_days > HIGH_FREQUENCY_PER_DAY
    })
}

fn high_balance(ev: &ProgramEvidence) -> Option<bool> {
    Some(ev.balance_lamports > HIGH_BALANCE_LAMPORTS)
}

const PROGRAM_RULES: [RiskRule<ProgramEvidence>; 5] = [
    RiskRule {
        weight: 2,
        warning: "very small program size",
        triggered: small_program,
    },
    RiskRule {
        weight: 3,
        warning: "program is not executable",
        triggered: not_executable,
    },
    RiskRule {
        weight: 2,
        warning: "very recent program",
        triggered: very_recent,
    },
    RiskRule {
        weight: 1,
        warning: "high transaction frequency",
        triggered: high_frequency,
    },
    RiskRule {
        weight: 2,
        warning: "very high program balance",
        triggered: high_balance,
    },
];

/// Evaluate all program rules against one evidence bundle
pub fn evaluate_program(evidence: &ProgramEvidence) -> (u32, Vec<String>) {
    if !evidence.exists {
        return (MAX_RISK_SCORE, vec!["program not found".to_string()]);
    }
    run_rules(&PROGRAM_RULES, evidence)
}

// ============================================
// TRANSACTION RULES
// ============================================

fn many_instructions(ev: &TransactionEvidence) -> Option<bool> {
    Some(ev.instruction_count > MAX_PLAIN_INSTRUCTIONS)
}

fn multiple_signers(ev: &TransactionEvidence) -> Option<bool> {
    Some(ev.signer_count > 1)
}

fn large_balance_shift(ev: &TransactionEvidence) -> Option<bool> {
    // Index-aligned pairwise deltas; a missing entry on either side reads as
    // 0 so unequal-length sequences never panic
    let len = ev.pre_balances.len().max(ev.post_balances.len());
    let shifted = (0..len).any(|i| {
        let pre = ev.pre_balances.get(i).copied().unwrap_or(0) as i128;
        let post = ev.post_balances.get(i).copied().unwrap_or(0) as i128;
        (post - pre).abs() > LARGE_SHIFT_LAMPORTS
    });
    Some(shifted)
}

fn execution_failed(ev: &TransactionEvidence) -> Option<bool> {
    Some(ev.execution_error.is_some())
}

fn suspicious_logs(ev: &TransactionEvidence) -> Option<bool> {
    // Fires at most once no matter how many lines match
    let suspicious = ev
        .log_messages
        .iter()
        .any(|log| SUSPICIOUS_LOG_MARKERS.iter().any(|m| log.contains(m)));
    Some(suspicious)
}

const TRANSACTION_RULES: [RiskRule<TransactionEvidence>; 5] = [
    RiskRule {
        weight: 2,
        warning: "transaction with many instructions",
        triggered: many_instructions,
    },
    RiskRule {
        weight: 2,
        warning: "transaction with multiple signers",
        triggered: multiple_signers,
    },
    RiskRule {
        weight: 3,
        warning: "transaction with large balance shifts",
        triggered: large_balance_shift,
    },
    RiskRule {
        weight: 3,
        warning: "transaction simulation failed",
        triggered: execution_failed,
    },
    RiskRule {
        weight: 2,
        warning: "suspicious log messages detected",
        triggered: suspicious_logs,
    },
];

/// Evaluate all transaction rules against one evidence bundle
pub fn evaluate_transaction(evidence: &TransactionEvidence) -> (u32, Vec<String>) {
    if !evidence.found {
        return (MAX_RISK_SCORE, vec!["transaction not found".to_string()]);
    }
    run_rules(&TRANSACTION_RULES, evidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_program() -> ProgramEvidence {
        ProgramEvidence {
            exists: true,
            data_length: 4096,
            executable: true,
            age_seconds: Some(90 * 86_400),
            recent_signature_count: 10,
            balance_lamports: 5_000_000_000,
        }
    }

    fn clean_transaction() -> TransactionEvidence {
        TransactionEvidence {
            found: true,
            instruction_count: 2,
            signer_count: 1,
            pre_balances: vec![10_000_000_000, 2_000_000_000],
            post_balances: vec![9_000_000_000, 3_000_000_000],
            execution_error: None,
            log_messages: vec!["Program log: Instruction: Transfer".to_string()],
        }
    }

    #[test]
    fn test_clean_program_scores_zero() {
        let (score, warnings) = evaluate_program(&clean_program());
        assert_eq!(score, 0);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_missing_program_short_circuits() {
        let (score, warnings) = evaluate_program(&ProgramEvidence::missing());
        assert_eq!(score, MAX_RISK_SCORE);
        assert_eq!(warnings, vec!["program not found".to_string()]);
    }

    #[test]
    fn test_small_program_fires_size_rule_only() {
        let mut ev = clean_program();
        ev.data_length = 50;
        let (score, warnings) = evaluate_program(&ev);
        assert_eq!(score, 2);
        assert_eq!(warnings, vec!["very small program size".to_string()]);
    }

    #[test]
    fn test_non_executable_program() {
        let mut ev = clean_program();
        ev.executable = false;
        let (score, warnings) = evaluate_program(&ev);
        assert_eq!(score, 3);
        assert_eq!(warnings, vec!["program is not executable".to_string()]);
    }

    #[test]
    fn test_missing_age_skips_age_rules() {
        let mut ev = clean_program();
        ev.age_seconds = None;
        // A fresh program with huge signature volume would fire both age
        // rules, but without clock data they must contribute nothing
        ev.recent_signature_count = 1000;
        let (score, warnings) = evaluate_program(&ev);
        assert_eq!(score, 0);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_recent_program_fires_age_rule() {
        let mut ev = clean_program();
        ev.age_seconds = Some(3600);
        ev.recent_signature_count = 0;
        let (score, warnings) = evaluate_program(&ev);
        assert_eq!(score, 2);
        assert_eq!(warnings, vec!["very recent program".to_string()]);
    }

    #[test]
    fn test_negative_age_clamps_frequency_denominator() {
        let mut ev = clean_program();
        ev.age_seconds = Some(-5);
        ev.recent_signature_count = 500;
        // Negative age: recent rule fires and the epsilon clamp makes the
        // frequency enormous, so both fire without dividing by zero
        let (score, warnings) = evaluate_program(&ev);
        assert_eq!(score, 3);
        assert!(warnings.contains(&"very recent program".to_string()));
        assert!(warnings.contains(&"high transaction frequency".to_string()));
    }

    #[test]
    fn test_high_balance_program() {
        let mut ev = clean_program();
        ev.balance_lamports = 2_000_000_000_000;
        let (score, warnings) = evaluate_program(&ev);
        assert_eq!(score, 2);
        assert_eq!(warnings, vec!["very high program balance".to_string()]);
    }

    #[test]
    fn test_all_program_rules_can_fire_together() {
        let ev = ProgramEvidence {
            exists: true,
            data_length: 10,
            executable: false,
            age_seconds: Some(100),
            recent_signature_count: 1000,
            balance_lamports: 5_000_000_000_000,
        };
        let (score, warnings) = evaluate_program(&ev);
        assert_eq!(score, 2 + 3 + 2 + 1 + 2);
        assert_eq!(warnings.len(), 5);
        // Warnings follow table order
        assert_eq!(warnings[0], "very small program size");
        assert_eq!(warnings[4], "very high program balance");
    }

    #[test]
    fn test_clean_transaction_scores_zero() {
        let (score, warnings) = evaluate_transaction(&clean_transaction());
        assert_eq!(score, 0);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_missing_transaction_short_circuits() {
        let (score, warnings) = evaluate_transaction(&TransactionEvidence::missing());
        assert_eq!(score, MAX_RISK_SCORE);
        assert_eq!(warnings, vec!["transaction not found".to_string()]);
    }

    #[test]
    fn test_instruction_count_boundary() {
        let mut ev = clean_transaction();
        ev.instruction_count = 5;
        assert_eq!(evaluate_transaction(&ev).0, 0);
        ev.instruction_count = 6;
        let (score, warnings) = evaluate_transaction(&ev);
        assert_eq!(score, 2);
        assert_eq!(warnings, vec!["transaction with many instructions".to_string()]);
    }

    #[test]
    fn test_large_shift_with_unequal_balance_lengths() {
        let mut ev = clean_transaction();
        // Post entry with no pre counterpart: missing pre reads as 0, so the
        // delta is the full post balance
        ev.pre_balances = vec![1_000_000_000];
        ev.post_balances = vec![1_000_000_000, 150_000_000_000];
        let (score, warnings) = evaluate_transaction(&ev);
        assert_eq!(score, 3);
        assert_eq!(warnings, vec!["transaction with large balance shifts".to_string()]);
    }

    #[test]
    fn test_shift_exactly_at_threshold_does_not_fire() {
        let mut ev = clean_transaction();
        ev.pre_balances = vec![0];
        ev.post_balances = vec![100_000_000_000];
        assert_eq!(evaluate_transaction(&ev).0, 0);
    }

    #[test]
    fn test_suspicious_logs_fire_once() {
        let mut ev = clean_transaction();
        ev.log_messages = vec![
            "custom program error: 0x1".to_string(),
            "Instruction failed".to_string(),
            "invalid account data".to_string(),
        ];
        let (score, warnings) = evaluate_transaction(&ev);
        assert_eq!(score, 2);
        assert_eq!(warnings, vec!["suspicious log messages detected".to_string()]);
    }

    #[test]
    fn test_log_matching_is_case_sensitive() {
        let mut ev = clean_transaction();
        ev.log_messages = vec!["Transfer FAILED".to_string(), "Error: none".to_string()];
        assert_eq!(evaluate_transaction(&ev).0, 0);
    }

    #[test]
    fn test_failed_noisy_transaction() {
        // instruction_count=6, signer_count=2, execution error present,
        // suspicious log: rules 2+2+3+2 = 9
        let ev = TransactionEvidence {
            found: true,
            instruction_count: 6,
            signer_count: 2,
            pre_balances: vec![],
            post_balances: vec![],
            execution_error: Some(serde_json::json!({"InstructionError": [0, "Custom"]})),
            log_messages: vec!["tx failed".to_string()],
        };
        let (score, warnings) = evaluate_transaction(&ev);
        assert_eq!(score, 9);
        assert_eq!(warnings.len(), 4);
    }
}
