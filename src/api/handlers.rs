//! API request handlers

use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::info;

use super::types::*;
use crate::core::engine::Auditor;
use crate::models::config::AuditConfig;
use crate::models::errors::AppResult;
use crate::models::types::{AuditSubjectType, RiskLevel};
use crate::providers::SolanaClient;
use crate::telemetry::AuditTelemetry;
use crate::utils::cache::AuditCache;

/// Maximum subjects accepted by one batch request
const MAX_BATCH_SUBJECTS: usize = 50;

/// Shared application state
pub struct AppState {
    pub auditor: Auditor<SolanaClient>,
    pub telemetry: Arc<AuditTelemetry>,
    pub cache: AuditCache,
    pub start_time: Instant,
    pub batch_semaphore: Arc<Semaphore>,
}

impl AppState {
    pub fn new(config: AuditConfig, telemetry: Arc<AuditTelemetry>) -> AppResult<Self> {
        let client = SolanaClient::new(&config)?;
        let cache = AuditCache::with_ttl(config.cache_ttl_secs);

        // Background task: evict expired cache entries every 60 seconds
        let cache_clone = cache.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                let removed = cache_clone.cleanup_expired();
                if removed > 0 {
                    tracing::debug!(removed, "Cache cleanup");
                }
            }
        });

        let batch_semaphore = Arc::new(Semaphore::new(config.max_concurrent_audits));

        Ok(Self {
            auditor: Auditor::new(client, config),
            telemetry,
            cache,
            start_time: Instant::now(),
            batch_semaphore,
        })
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

// ============================================
// Health
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    ))
}

// ============================================
// Audit
// ============================================

pub async fn audit_subject(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AuditRequest>,
) -> Result<Json<ApiResponse<AuditData>>, (StatusCode, Json<ApiResponse<()>>)> {
    let start = Instant::now();

    // Invalid subject type is a caller usage error, rejected before any
    // evidence fetch - never folded into a risk score
    let subject = AuditSubjectType::from_str(&req.subject_type).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                ApiError::invalid_subject(e.message),
                start.elapsed().as_secs_f64() * 1000.0,
            )),
        )
    })?;

    if req.id.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                ApiError::bad_request("id must not be empty"),
                start.elapsed().as_secs_f64() * 1000.0,
            )),
        ));
    }

    let data = run_audit(&state, subject, &req.id).await;

    Ok(Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    )))
}

/// Cache-aware audit used by the single and batch endpoints
async fn run_audit(state: &AppState, subject: AuditSubjectType, id: &str) -> AuditData {
    if let Some(cached) = state.cache.get(subject, id) {
        return AuditData::from_result(&cached, true);
    }

    let start = Instant::now();
    let result = state.auditor.audit(subject, id).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    state.telemetry.record_audit(&result, latency_ms);
    info!(
        subject = %subject,
        id,
        risk_level = result.risk_level.as_str(),
        trust_score = result.trust_score,
        latency_ms,
        "Audit completed"
    );

    state.cache.set(subject, id, result.clone());
    AuditData::from_result(&result, false)
}

// ============================================
// Batch Audit
// ============================================

pub async fn batch_audit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchAuditRequest>,
) -> Result<Json<ApiResponse<BatchAuditData>>, (StatusCode, Json<ApiResponse<()>>)> {
    let start = Instant::now();

    if req.subjects.is_empty() || req.subjects.len() > MAX_BATCH_SUBJECTS {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                ApiError::bad_request(format!(
                    "subjects must contain 1..={} entries",
                    MAX_BATCH_SUBJECTS
                )),
                start.elapsed().as_secs_f64() * 1000.0,
            )),
        ));
    }

    let total_requested = req.subjects.len();
    let mut tasks: JoinSet<(usize, BatchAuditEntry)> = JoinSet::new();

    for (index, subject_req) in req.subjects.into_iter().enumerate() {
        let state = state.clone();
        tasks.spawn(async move {
            let entry = match AuditSubjectType::from_str(&subject_req.subject_type) {
                Ok(subject) => {
                    // Each audit holds a permit so batches stay bounded. The
                    // semaphore lives for the whole process, so acquisition
                    // only fails during shutdown.
                    match state.batch_semaphore.clone().acquire_owned().await {
                        Ok(_permit) => {
                            let audit = run_audit(&state, subject, &subject_req.id).await;
                            BatchAuditEntry {
                                id: subject_req.id,
                                status: "ok".to_string(),
                                audit: Some(audit),
                                error: None,
                            }
                        }
                        Err(_) => BatchAuditEntry {
                            id: subject_req.id,
                            status: "error".to_string(),
                            audit: None,
                            error: Some("service shutting down".to_string()),
                        },
                    }
                }
                Err(e) => BatchAuditEntry {
                    id: subject_req.id,
                    status: "invalid_subject".to_string(),
                    audit: None,
                    error: Some(e.message),
                },
            };
            (index, entry)
        });
    }

    let mut indexed = Vec::with_capacity(total_requested);
    while let Some(joined) = tasks.join_next().await {
        if let Ok(entry) = joined {
            indexed.push(entry);
        }
    }
    indexed.sort_by_key(|(index, _)| *index);

    let results: Vec<BatchAuditEntry> = indexed.into_iter().map(|(_, entry)| entry).collect();
    let total_high_risk = results
        .iter()
        .filter(|r| {
            r.audit
                .as_ref()
                .map(|a| a.risk_level == RiskLevel::High.as_str())
                .unwrap_or(false)
        })
        .count();
    let total_invalid = results.iter().filter(|r| r.status != "ok").count();

    let data = BatchAuditData {
        total_requested,
        total_high_risk,
        total_invalid,
        results,
        processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
    };

    Ok(Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    )))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();

    let data = StatsData {
        audits: state.telemetry.snapshot(),
        cache: state.cache.stats(),
        api_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    ))
}
