//! Core audit logic: rule engine, score translation, dispatch

pub mod engine;
pub mod rules;
pub mod score;

pub use engine::Auditor;
pub use rules::{evaluate_program, evaluate_transaction, RiskRule};
pub use score::{finalize, risk_level, trust_score};
