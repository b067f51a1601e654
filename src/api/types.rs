//! API request/response types

use serde::{Deserialize, Serialize};

use crate::models::types::AuditResult;

/// Response envelope shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "API_BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_subject(message: impl Into<String>) -> Self {
        Self {
            code: "AUDIT_INVALID_SUBJECT".to_string(),
            message: message.into(),
        }
    }
}

// ============================================
// Audit
// ============================================

#[derive(Debug, Clone, Deserialize)]
pub struct AuditRequest {
    /// "program" or "transaction" - never inferred from the identifier
    pub subject_type: String,
    /// Account pubkey or transaction signature
    pub id: String,
}

/// One finished audit on the wire. `trust_score` is rendered as decimal text
/// here at the serialization boundary; internally it stays numeric.
#[derive(Debug, Serialize)]
pub struct AuditData {
    pub id: String,
    pub trust_score: String,
    pub risk_level: String,
    pub risk_desc: String,
    pub warnings: Vec<String>,
    pub cached: bool,
}

impl AuditData {
    pub fn from_result(result: &AuditResult, cached: bool) -> Self {
        Self {
            id: result.id.clone(),
            trust_score: result.trust_score.to_string(),
            risk_level: result.risk_level.as_str().to_string(),
            risk_desc: result.risk_desc.to_string(),
            warnings: result.warnings.clone(),
            cached,
        }
    }
}

// ============================================
// Batch Audit
// ============================================

#[derive(Debug, Deserialize)]
pub struct BatchAuditRequest {
    pub subjects: Vec<AuditRequest>,
}

#[derive(Debug, Serialize)]
pub struct BatchAuditData {
    pub total_requested: usize,
    pub total_high_risk: usize,
    pub total_invalid: usize,
    pub results: Vec<BatchAuditEntry>,
    pub processing_time_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct BatchAuditEntry {
    pub id: String,
    pub status: String, // "ok" | "invalid_subject" | "error"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================
// Stats / Health
// ============================================

#[derive(Debug, Serialize)]
pub struct StatsData {
    pub audits: crate::telemetry::TelemetryStats,
    pub cache: crate::utils::cache::CacheStats,
    pub api_version: String,
}

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
