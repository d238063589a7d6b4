//! Sliding-window rate limiting for HTTP requests.
//!
//! Each client identity gets an ordered window of request timestamps.
//! Entries older than the window are pruned lazily on the next check from
//! that identity; nothing runs in the background and nothing persists
//! across restarts.

use crate::utils::ip_extraction::extract_client_ip;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Time source, injectable so tests can drive a deterministic timeline.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time; the production clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Request timestamps for one identity, oldest first.
#[derive(Debug, Default)]
struct RequestWindow {
    stamps: VecDeque<Instant>,
}

impl RequestWindow {
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.stamps.front() {
            if now.duration_since(oldest) >= window {
                self.stamps.pop_front();
            } else {
                break;
            }
        }
    }

    fn newest(&self) -> Option<Instant> {
        self.stamps.back().copied()
    }
}

/// Sharded sliding-window limiter.
///
/// Uses multiple shards (separate HashMaps) to distribute load and reduce
/// contention on a single mutex. Keys are hashed to determine which shard
/// to use. Memory is bounded: windows prune themselves on every check, and
/// a per-shard cap evicts the stalest identity when too many distinct
/// identities accumulate.
pub struct SlidingWindowLimiter {
    shards: Vec<Mutex<HashMap<String, RequestWindow>>>,
    shard_count: usize,
    limit: u32,
    window: Duration,
    max_identities_per_shard: usize,
    clock: Arc<dyn Clock>,
}

impl SlidingWindowLimiter {
    /// Create a limiter with the default shard count (16) and system clock.
    pub fn new(limit: u32, window: Duration) -> Self {
        Self::with_clock(limit, window, Arc::new(SystemClock), 16)
    }

    /// Create a limiter with an explicit clock and shard count.
    pub fn with_clock(
        limit: u32,
        window: Duration,
        clock: Arc<dyn Clock>,
        shard_count: usize,
    ) -> Self {
        let shard_count = shard_count.max(1);
        let shards = (0..shard_count).map(|_| Mutex::new(HashMap::new())).collect();
        Self {
            shards,
            shard_count,
            limit,
            window,
            max_identities_per_shard: 10_000,
            clock,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    fn shard_index(&self, key: &str) -> usize {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shard_count
    }

    /// Check and record one request for `key`.
    ///
    /// Admitted requests return the remaining allowance inside the current
    /// window; rejected requests return how long until the oldest recorded
    /// stamp ages out. Rejections are not recorded.
    pub async fn admit(&self, key: &str) -> Result<u32, Duration> {
        let now = self.clock.now();
        let shard = &self.shards[self.shard_index(key)];
        let mut windows = shard.lock().await;

        // Bound distinct identities: drop fully-aged windows first, then the
        // identity that has been quiet the longest.
        if windows.len() >= self.max_identities_per_shard && !windows.contains_key(key) {
            windows.retain(|_, w| {
                w.prune(now, self.window);
                !w.stamps.is_empty()
            });

            if windows.len() >= self.max_identities_per_shard {
                let stalest = windows
                    .iter()
                    .min_by_key(|(_, w)| w.newest())
                    .map(|(k, _)| k.clone());
                if let Some(stale_key) = stalest {
                    windows.remove(&stale_key);
                    tracing::debug!(
                        removed_key = %stale_key,
                        "Evicted stalest rate-limit window at capacity"
                    );
                }
            }
        }

        let entry = windows.entry(key.to_string()).or_default();
        entry.prune(now, self.window);

        if entry.stamps.len() >= self.limit as usize {
            let retry_in = entry
                .stamps
                .front()
                .map(|&oldest| (oldest + self.window).saturating_duration_since(now))
                .unwrap_or(self.window);
            return Err(retry_in);
        }

        entry.stamps.push_back(now);
        Ok(self.limit.saturating_sub(entry.stamps.len() as u32))
    }
}

/// HTTP rate limiting middleware.
///
/// Derives the client identity from forwarding headers (falling back to the
/// peer address) and rejects with `429 Too Many Requests` once the identity
/// exhausts its window. Admitted responses carry `X-RateLimit-Limit` and
/// `X-RateLimit-Remaining`; rejections add `Retry-After`.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<SlidingWindowLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let socket_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let ip = extract_client_ip(request.headers(), socket_addr.as_ref());
    let key = format!("ip:{}", ip);
    let limit = limiter.limit();

    match limiter.admit(&key).await {
        Ok(remaining) => {
            let mut response = next.run(request).await;
            if let Ok(value) = HeaderValue::from_str(&limit.to_string()) {
                response.headers_mut().insert("X-RateLimit-Limit", value);
            }
            if let Ok(value) = HeaderValue::from_str(&remaining.to_string()) {
                response.headers_mut().insert("X-RateLimit-Remaining", value);
            }
            response
        }
        Err(retry_in) => {
            tracing::warn!(
                client = %key,
                path = %request.uri().path(),
                "Rate limit exceeded"
            );

            let retry_seconds = retry_in.as_secs().max(1);
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                axum::Json(serde_json::json!({
                    "error": "Too many requests. Please slow down."
                })),
            )
                .into_response();

            if let Ok(value) = HeaderValue::from_str(&limit.to_string()) {
                response.headers_mut().insert("X-RateLimit-Limit", value);
            }
            response
                .headers_mut()
                .insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));
            if let Ok(value) = HeaderValue::from_str(&retry_seconds.to_string()) {
                response.headers_mut().insert("Retry-After", value);
            }

            response
        }
    }
}
