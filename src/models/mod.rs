//! Data models for Sol Sentry
//! Audit types, error taxonomy, and configuration

pub mod config;
pub mod errors;
pub mod types;

pub use config::AuditConfig;
pub use errors::{AppError, AppResult, ErrorCode};
pub use types::{
    AccountSnapshot, AuditResult, AuditSubjectType, ProgramEvidence, RiskLevel, SignatureRecord,
    TransactionEvidence, TransactionRecord,
};
