//! API middleware: rate limiting and request logging

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Fixed-window in-memory rate limiter, keyed per client
pub struct RateLimiter {
    windows: DashMap<String, (u32, Instant)>,
    requests_per_window: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(requests_per_window: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            requests_per_window,
            window,
        }
    }

    /// Returns (allowed, remaining)
    pub fn check(&self, key: &str) -> (bool, u32) {
        let now = Instant::now();
        let mut entry = self.windows.entry(key.to_string()).or_insert((0, now));

        if now.duration_since(entry.1) > self.window {
            *entry = (0, now);
        }

        if entry.0 >= self.requests_per_window {
            return (false, 0);
        }

        entry.0 += 1;
        (true, self.requests_per_window - entry.0)
    }

    /// Drop windows idle for more than two periods
    pub fn cleanup(&self) {
        let now = Instant::now();
        let window = self.window;
        self.windows
            .retain(|_, (_, started)| now.duration_since(*started) < window * 2);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        let quota = std::env::var("SENTRY_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);
        Self::new(quota, Duration::from_secs(60))
    }
}

lazy_static::lazy_static! {
    pub static ref RATE_LIMITER: Arc<RateLimiter> = Arc::new(RateLimiter::default());
}

/// Spawn the periodic rate-limiter window cleanup
pub fn start_cleanup_task() {
    tokio::spawn(async {
        let mut interval = tokio::time::interval(Duration::from_secs(120));
        loop {
            interval.tick().await;
            RATE_LIMITER.cleanup();
        }
    });
}

/// Rate limiting middleware, keyed by forwarded client address
pub async fn rate_limit_middleware(
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // Health probes are exempt
    if request.uri().path().ends_with("/health") {
        return Ok(next.run(request).await);
    }

    let client = headers
        .get("X-Forwarded-For")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let (allowed, remaining) = RATE_LIMITER.check(&client);

    if !allowed {
        warn!(client = %client, "Rate limit exceeded");
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert("X-RateLimit-Remaining", remaining.into());

    Ok(response)
}

/// Request logging middleware
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    info!(
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        latency_ms = %start.elapsed().as_millis(),
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_exhausts_quota() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        assert!(limiter.check("client-a").0);
        assert!(limiter.check("client-a").0);
        assert!(!limiter.check("client-a").0);
        // Other clients unaffected
        assert!(limiter.check("client-b").0);
    }

    #[test]
    fn test_rate_limiter_window_reset() {
        let limiter = RateLimiter::new(1, Duration::from_millis(10));
        assert!(limiter.check("c").0);
        assert!(!limiter.check("c").0);
        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.check("c").0);
    }
}
