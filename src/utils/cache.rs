//! In-memory audit result cache
//!
//! Thread-safe TTL cache over DashMap so repeated audits of the same subject
//! skip the RPC round-trips. Keys are case-sensitive: base58 pubkeys and
//! signatures must never be normalized.
//!
//! Escalated (collection-failure) results are not stored - a transient
//! outage should not pin a subject at High Risk for the TTL window.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::models::types::{AuditResult, AuditSubjectType};
use crate::utils::constants::DEFAULT_CACHE_TTL_SECS;

#[derive(Clone, Debug)]
struct CacheEntry {
    result: AuditResult,
    created_at: Instant,
}

/// TTL cache of finished audits, keyed by (subject type, identifier)
#[derive(Clone)]
pub struct AuditCache {
    store: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl Default for AuditCache {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL_SECS)
    }
}

impl AuditCache {
    pub fn with_ttl(ttl_secs: u64) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            ttl: Duration::from_secs(ttl_secs),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    fn key(subject: AuditSubjectType, id: &str) -> String {
        format!("{}:{}", subject.as_str(), id)
    }

    pub fn get(&self, subject: AuditSubjectType, id: &str) -> Option<AuditResult> {
        let key = Self::key(subject, id);

        if let Some(entry) = self.store.get(&key) {
            if entry.created_at.elapsed() > self.ttl {
                drop(entry);
                self.store.remove(&key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key, "Cache miss (expired)");
                return None;
            }
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key, "Cache hit");
            return Some(entry.result.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key, "Cache miss");
        None
    }

    /// Store a finished audit. Escalated results are dropped silently.
    pub fn set(&self, subject: AuditSubjectType, id: &str, result: AuditResult) {
        if result.escalated {
            return;
        }
        let key = Self::key(subject, id);
        self.store.insert(
            key,
            CacheEntry {
                result,
                created_at: Instant::now(),
            },
        );
    }

    /// Drop expired entries; returns how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let before = self.store.len();
        let ttl = self.ttl;
        self.store.retain(|_, entry| entry.created_at.elapsed() <= ttl);
        before - self.store.len()
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStats {
            entries: self.store.len(),
            hits,
            misses,
            hit_rate: if total > 0 {
                hits as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            ttl_secs: self.ttl.as_secs(),
        }
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub ttl_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::score::finalize;

    fn sample_result(escalated: bool) -> AuditResult {
        finalize("SomeKey", 2, vec!["very small program size".to_string()], escalated)
    }

    #[test]
    fn test_set_get_roundtrip() {
        let cache = AuditCache::default();
        cache.set(AuditSubjectType::Program, "SomeKey", sample_result(false));

        let hit = cache.get(AuditSubjectType::Program, "SomeKey");
        assert!(hit.is_some());
        assert_eq!(hit.unwrap().trust_score, 80);
    }

    #[test]
    fn test_subject_types_do_not_collide() {
        let cache = AuditCache::default();
        cache.set(AuditSubjectType::Program, "SameId", sample_result(false));
        assert!(cache.get(AuditSubjectType::Transaction, "SameId").is_none());
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let cache = AuditCache::default();
        cache.set(AuditSubjectType::Program, "AbCd", sample_result(false));
        assert!(cache.get(AuditSubjectType::Program, "abcd").is_none());
    }

    #[test]
    fn test_escalated_results_are_not_cached() {
        let cache = AuditCache::default();
        cache.set(AuditSubjectType::Program, "Down", sample_result(true));
        assert!(cache.get(AuditSubjectType::Program, "Down").is_none());
    }

    #[test]
    fn test_expired_entries_are_evicted() {
        let cache = AuditCache::with_ttl(0);
        cache.set(AuditSubjectType::Program, "Old", sample_result(false));
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get(AuditSubjectType::Program, "Old").is_none());
        assert_eq!(cache.cleanup_expired(), 0); // already removed by get
    }

    #[test]
    fn test_stats_track_hits_and_misses() {
        let cache = AuditCache::default();
        cache.set(AuditSubjectType::Program, "Key", sample_result(false));
        cache.get(AuditSubjectType::Program, "Key");
        cache.get(AuditSubjectType::Program, "Nope");

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }
}
