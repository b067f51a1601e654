//! Score Translator
//!
//! Maps a cumulative risk score to a trust percentage and a discrete risk
//! tier. Pure and deterministic: the same cumulative score always yields the
//! same (trust_score, risk_level, risk_desc) triple.

use crate::models::types::{AuditResult, RiskLevel};
use crate::utils::constants::MAX_RISK_SCORE;

/// Trust percentage for a cumulative risk score.
///
/// trust = (10 - score) / 10 * 100, floored at 0. Scores can exceed 10 when
/// several heavy rules fire together; they clamp so trust never goes negative.
pub fn trust_score(cumulative: u32) -> u8 {
    let capped = cumulative.min(MAX_RISK_SCORE);
    ((MAX_RISK_SCORE - capped) * 10) as u8
}

/// Tier for a cumulative risk score, evaluated high-to-low, first match wins
pub fn risk_level(cumulative: u32) -> RiskLevel {
    if cumulative > 7 {
        RiskLevel::High
    } else if cumulative > 4 {
        RiskLevel::Moderate
    } else if cumulative > 2 {
        RiskLevel::Low
    } else {
        RiskLevel::VeryLow
    }
}

/// Assemble the final result for a scored audit
pub fn finalize(id: &str, cumulative: u32, warnings: Vec<String>, escalated: bool) -> AuditResult {
    let level = risk_level(cumulative);
    AuditResult {
        id: id.to_string(),
        trust_score: trust_score(cumulative),
        risk_level: level,
        risk_desc: level.description(),
        warnings,
        escalated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trust_score_is_monotonically_decreasing() {
        let mut previous = 100;
        for score in 0..=12 {
            let trust = trust_score(score);
            assert!(trust <= previous, "trust rose at score {}", score);
            previous = trust;
        }
    }

    #[test]
    fn test_trust_score_values() {
        assert_eq!(trust_score(0), 100);
        assert_eq!(trust_score(2), 80);
        assert_eq!(trust_score(9), 10);
        assert_eq!(trust_score(10), 0);
        // Over-maximum scores clamp instead of going negative
        assert_eq!(trust_score(15), 0);
    }

    #[test]
    fn test_tier_boundaries_are_exact() {
        // Boundary at >7: exactly 7 is NOT High Risk, 8 is
        assert_ne!(risk_level(7), RiskLevel::High);
        assert_eq!(risk_level(7), RiskLevel::Moderate);
        assert_eq!(risk_level(8), RiskLevel::High);

        assert_eq!(risk_level(2), RiskLevel::VeryLow);
        assert_eq!(risk_level(3), RiskLevel::Low);
        assert_eq!(risk_level(4), RiskLevel::Low);
        assert_eq!(risk_level(5), RiskLevel::Moderate);
    }

    #[test]
    fn test_translator_is_deterministic() {
        for score in 0..=12 {
            let a = finalize("x", score, vec![], false);
            let b = finalize("x", score, vec![], false);
            assert_eq!(a.trust_score, b.trust_score);
            assert_eq!(a.risk_level, b.risk_level);
            assert_eq!(a.risk_desc, b.risk_desc);
        }
    }

    #[test]
    fn test_finalize_echoes_id_verbatim() {
        let result = finalize("So11111111111111111111111111111111111111112", 0, vec![], false);
        assert_eq!(result.id, "So11111111111111111111111111111111111111112");
        assert_eq!(result.trust_score, 100);
    }
}
