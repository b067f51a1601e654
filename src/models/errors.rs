//! Centralized error handling
//!
//! Every failure carries a unique string code so production logs can be
//! grouped and monitored without parsing free-form messages.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - RPC_xxx: collector / RPC errors
//! - API_xxx: HTTP API errors
//! - CFG_xxx: configuration errors
//! - AUDIT_xxx: audit usage errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // RPC / Evidence Collector Errors
    // ============================================
    /// RPC connection failed
    RpcConnectionFailed,
    /// RPC request timeout
    RpcTimeout,
    /// RPC rate limited (HTTP 429)
    RpcRateLimited,
    /// RPC returned an error response
    RpcError,
    /// RPC response could not be parsed
    RpcInvalidResponse,

    // ============================================
    // API Errors
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Internal server error
    ApiInternalError,
    /// Resource not found
    ApiNotFound,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Missing environment variable
    ConfigMissingEnv,
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Audit Usage Errors
    // ============================================
    /// Caller supplied an unknown subject type. A usage error, not an
    /// audit-subject risk signal, so it is never escalated into a score.
    AuditInvalidSubject,

    /// Unknown error
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RpcConnectionFailed => "RPC_CONNECTION_FAILED",
            Self::RpcTimeout => "RPC_TIMEOUT",
            Self::RpcRateLimited => "RPC_RATE_LIMITED",
            Self::RpcError => "RPC_ERROR",
            Self::RpcInvalidResponse => "RPC_INVALID_RESPONSE",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",
            Self::ApiNotFound => "API_NOT_FOUND",

            Self::ConfigMissingEnv => "CFG_MISSING_ENV",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            Self::AuditInvalidSubject => "AUDIT_INVALID_SUBJECT",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiBadRequest | Self::AuditInvalidSubject | Self::ConfigInvalidValue => 400,
            Self::ApiNotFound => 404,
            Self::ApiRateLimited | Self::RpcRateLimited => 429,
            _ => 500,
        }
    }

    /// Whether the collector may retry this failure
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RpcTimeout | Self::RpcRateLimited | Self::RpcConnectionFailed
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    pub fn rpc_connection_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcConnectionFailed, msg)
    }

    pub fn rpc_timeout(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcTimeout, msg)
    }

    pub fn rpc_rate_limited() -> Self {
        Self::new(ErrorCode::RpcRateLimited, "Rate limited (HTTP 429)")
    }

    pub fn rpc_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcError, msg)
    }

    pub fn rpc_invalid_response(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcInvalidResponse, msg)
    }

    pub fn invalid_subject(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuditInvalidSubject, msg)
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::RpcTimeout, "Request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::RpcConnectionFailed, "Connection failed")
        } else {
            Self::new(ErrorCode::Unknown, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::RpcInvalidResponse, "JSON parse error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::rpc_timeout("deadline exceeded");
        assert_eq!(err.code, ErrorCode::RpcTimeout);
        assert_eq!(err.code_str(), "RPC_TIMEOUT");
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::RpcTimeout.is_retryable());
        assert!(ErrorCode::RpcRateLimited.is_retryable());
        assert!(!ErrorCode::RpcError.is_retryable());
        assert!(!ErrorCode::AuditInvalidSubject.is_retryable());
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::AuditInvalidSubject.http_status(), 400);
        assert_eq!(ErrorCode::ApiRateLimited.http_status(), 429);
        assert_eq!(ErrorCode::RpcError.http_status(), 500);
    }

    #[test]
    fn test_display_includes_code() {
        let err = AppError::invalid_subject("unknown subject type 'wallet'");
        let rendered = err.to_string();
        assert!(rendered.contains("AUDIT_INVALID_SUBJECT"));
        assert!(rendered.contains("wallet"));
    }
}
