//! Per-provider request rate limiting.
//!
//! Each upstream provider gets one [`TokenBucket`] sized from the
//! `[rate_limits]` config table; the buckets live in a [`LimiterSet`]
//! owned by the aggregation engine and shared by all in-flight requests.
//!
//! A bucket refills continuously: after `elapsed` time it gains
//! `elapsed * capacity / window` tokens, clamped at capacity. Fractional
//! tokens persist between calls, so a 1-per-second bucket that waited
//! 500ms is half way to its next grant.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::RateLimit;
use crate::model::ProviderId;

/// Bucket accounting, guarded by a single mutex.
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl BucketState {
    fn refill(&mut self, capacity: f64, refill_per_sec: f64) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        if elapsed.is_zero() {
            return;
        }
        self.tokens = (self.tokens + elapsed.as_secs_f64() * refill_per_sec).min(capacity);
        self.last_refill = now;
    }
}

/// A token-bucket throttle for one provider.
///
/// Safe for concurrent callers; the token count and last-refill timestamp
/// are only touched under the internal mutex.
pub struct TokenBucket {
    capacity: f64,
    refill_per_sec: f64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Create a bucket allowing `capacity` requests per `window`.
    ///
    /// The bucket starts full, so a burst of up to `capacity` calls
    /// passes immediately.
    pub fn new(capacity: u32, window: Duration) -> Self {
        let capacity = f64::from(capacity.max(1));
        let window_secs = window.as_secs_f64().max(f64::EPSILON);
        Self {
            capacity,
            refill_per_sec: capacity / window_secs,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Take one token, waiting up to `timeout` for it to become available.
    ///
    /// Returns `false` when the deadline cannot be met. Denial is a normal
    /// outcome - the caller skips that provider for this request - not an
    /// error. Dropping the future mid-wait leaves the bucket consistent:
    /// the token is only consumed under the lock, in the same critical
    /// section that observes it.
    pub async fn acquire(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                state.refill(self.capacity, self.refill_per_sec);
                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return true;
                }
                Duration::from_secs_f64((1.0 - state.tokens) / self.refill_per_sec)
            };

            if Instant::now() + wait > deadline {
                return false;
            }
            tokio::time::sleep(wait).await;
        }
    }

    /// Current token count (after refill). Test/diagnostic accessor.
    pub async fn available(&self) -> f64 {
        let mut state = self.state.lock().await;
        state.refill(self.capacity, self.refill_per_sec);
        state.tokens
    }
}

/// Unconfigured providers get a conservative one-request-per-second bucket.
const DEFAULT_LIMIT: RateLimit = RateLimit {
    max_requests: 1,
    per_seconds: 1,
};

/// One token bucket per provider, built once at startup.
///
/// Keyed by [`ProviderId`] so the engine never has to guess which limiter
/// belongs to which gateway.
pub struct LimiterSet {
    buckets: HashMap<ProviderId, Arc<TokenBucket>>,
}

impl LimiterSet {
    /// Build buckets for `providers` from the configured limit table.
    ///
    /// The table is keyed by the provider's lowercase config name;
    /// providers without an entry fall back to [`DEFAULT_LIMIT`].
    pub fn from_config(
        limits: &HashMap<String, RateLimit>,
        providers: impl IntoIterator<Item = ProviderId>,
    ) -> Self {
        let buckets = providers
            .into_iter()
            .map(|id| {
                let limit = limits.get(id.as_str()).copied().unwrap_or(DEFAULT_LIMIT);
                let bucket = TokenBucket::new(
                    limit.max_requests,
                    Duration::from_secs(limit.per_seconds.max(1)),
                );
                (id, Arc::new(bucket))
            })
            .collect();
        Self { buckets }
    }

    /// Look up the bucket for a provider.
    pub fn get(&self, id: ProviderId) -> Option<&Arc<TokenBucket>> {
        self.buckets.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_up_to_capacity_succeeds() {
        let bucket = TokenBucket::new(5, Duration::from_secs(5));
        for _ in 0..5 {
            assert!(bucket.acquire(Duration::ZERO).await);
        }
        // Bucket drained - an instant acquisition must now be denied.
        assert!(!bucket.acquire(Duration::ZERO).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_token_arrives_after_window_over_capacity() {
        let bucket = TokenBucket::new(4, Duration::from_secs(8));
        for _ in 0..4 {
            assert!(bucket.acquire(Duration::ZERO).await);
        }

        // Refill rate is 4 tokens / 8s = one token every 2s.
        let start = Instant::now();
        assert!(bucket.acquire(Duration::from_secs(10)).await);
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(1900), "waited {waited:?}");
        assert!(waited <= Duration::from_millis(2100), "waited {waited:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokens_never_exceed_capacity() {
        let bucket = TokenBucket::new(3, Duration::from_secs(1));
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(bucket.available().await <= 3.0);
        assert!((bucket.available().await - 3.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fractional_tokens_persist() {
        let bucket = TokenBucket::new(1, Duration::from_secs(2));
        assert!(bucket.acquire(Duration::ZERO).await);

        // Half the refill interval: 0.5 tokens, still not enough.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!bucket.acquire(Duration::ZERO).await);

        // The other half tops it up to a full token.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(bucket.acquire(Duration::ZERO).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_when_deadline_cannot_be_met() {
        let bucket = TokenBucket::new(1, Duration::from_secs(10));
        assert!(bucket.acquire(Duration::ZERO).await);
        // Next token is 10s away but we only allow 1s of waiting.
        assert!(!bucket.acquire(Duration::from_secs(1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_acquirers_share_the_bucket() {
        let bucket = Arc::new(TokenBucket::new(2, Duration::from_secs(60)));
        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let bucket = Arc::clone(&bucket);
                tokio::spawn(async move { bucket.acquire(Duration::from_millis(10)).await })
            })
            .collect();

        let mut granted = 0;
        for task in tasks {
            if task.await.unwrap() {
                granted += 1;
            }
        }
        assert_eq!(granted, 2);
    }

    #[test]
    fn test_limiter_set_defaults_unconfigured_providers() {
        let mut limits = HashMap::new();
        limits.insert(
            "lastfm".to_string(),
            RateLimit {
                max_requests: 5,
                per_seconds: 1,
            },
        );

        let set = LimiterSet::from_config(&limits, [ProviderId::LastFm, ProviderId::MusicBrainz]);
        assert!(set.get(ProviderId::LastFm).is_some());
        // Unconfigured: present, with the conservative default bucket.
        assert!(set.get(ProviderId::MusicBrainz).is_some());
        assert!(set.get(ProviderId::LrcLib).is_none());
    }
}
