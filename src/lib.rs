//! Sol Sentry Library
//!
//! Heuristic trust auditor for Solana programs and transactions. Combines
//! weighted signals over observable on-chain attributes - account metadata,
//! signature history, balance deltas, execution outcomes - into a bounded
//! risk score, a discrete risk tier, and ordered warnings, as a
//! pre-execution screening step before trusting an unfamiliar subject.

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod telemetry;
pub mod utils;

pub use crate::core::engine::Auditor;
pub use crate::core::rules::{evaluate_program, evaluate_transaction};
pub use crate::core::score::{risk_level, trust_score};
pub use crate::models::config::AuditConfig;
pub use crate::models::errors::{AppError, AppResult, ErrorCode};
pub use crate::models::types::{
    AuditResult, AuditSubjectType, ProgramEvidence, RiskLevel, TransactionEvidence,
};
pub use crate::providers::{EvidenceSource, SolanaClient};
pub use crate::telemetry::{AuditTelemetry, TelemetryStats};
pub use crate::utils::cache::{AuditCache, CacheStats};
