//! Per-bucket rate limiting
//!
//! The bucket map is only touched under its lock; waiting for a reset happens
//! after the lock is released so callers on other buckets never block.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use reqwest::Method;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RESET_HEADER: &str = "x-ratelimit-reset";
pub const RETRY_AFTER_HEADER: &str = "retry-after";

/// Bucket identity: request method plus full target URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey {
    method: Method,
    url: String,
}

impl BucketKey {
    #[must_use]
    pub fn new(method: &Method, url: &Url) -> Self {
        Self {
            method: method.clone(),
            url: url.to_string(),
        }
    }

    #[must_use]
    pub fn of(request: &reqwest::Request) -> Self {
        Self::new(request.method(), request.url())
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Rate limit headers that could not be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("missing {0} header")]
    Missing(&'static str),

    #[error("unparsable {header} header: {value:?}")]
    Invalid { header: &'static str, value: String },
}

/// Known state of one bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub remaining: u64,
    pub reset: DateTime<Utc>,
}

impl RateLimit {
    /// Parse `X-RateLimit-Remaining` and `X-RateLimit-Reset` (epoch seconds, fractions allowed)
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, HeaderError> {
        let remaining = header_str(headers, REMAINING_HEADER)?;
        let remaining = remaining.parse::<u64>().map_err(|_| HeaderError::Invalid {
            header: REMAINING_HEADER,
            value: remaining.to_string(),
        })?;

        let reset_raw = header_str(headers, RESET_HEADER)?;
        let reset = reset_raw
            .parse::<f64>()
            .ok()
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .and_then(|secs| DateTime::from_timestamp_millis((secs * 1000.0).round() as i64))
            .ok_or_else(|| HeaderError::Invalid {
                header: RESET_HEADER,
                value: reset_raw.to_string(),
            })?;

        Ok(Self { remaining, reset })
    }

    /// How long a caller has to wait at `now`, if at all
    #[must_use]
    pub fn wait_time(&self, now: DateTime<Utc>) -> Option<Duration> {
        if self.remaining > 0 {
            return None;
        }
        (self.reset - now).to_std().ok().filter(|d| !d.is_zero())
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, HeaderError> {
    let value = headers.get(name).ok_or(HeaderError::Missing(name))?;
    value
        .to_str()
        .map(str::trim)
        .map_err(|_| HeaderError::Invalid {
            header: name,
            value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
        })
}

/// `Retry-After` in seconds, as sent with 429 responses
#[must_use]
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    header_str(headers, RETRY_AFTER_HEADER)
        .ok()?
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
}

/// Shared bucket map
#[derive(Debug, Default)]
pub struct RateLimiter {
    buckets: Mutex<HashMap<BucketKey, RateLimit>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &BucketKey) -> Option<RateLimit> {
        self.buckets.lock().get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.buckets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.lock().is_empty()
    }

    /// Time left until `key` may be used again
    pub fn wait_time(&self, key: &BucketKey) -> Option<Duration> {
        let limit = self.get(key)?;
        limit.wait_time(Utc::now())
    }

    /// Block until `key` has calls left; returns immediately for unknown buckets
    pub async fn wait(&self, key: &BucketKey) {
        if let Some(wait) = self.wait_time(key) {
            tracing::info!(
                bucket = %key,
                wait_ms = wait.as_millis(),
                "Hit rate limit, waiting for reset"
            );
            tokio::time::sleep(wait).await;
        }
    }

    pub fn update(&self, key: BucketKey, limit: RateLimit) {
        tracing::trace!(
            bucket = %key,
            remaining = limit.remaining,
            reset = %limit.reset,
            "Rate limit bucket updated"
        );
        self.buckets.lock().insert(key, limit);
    }

    /// Refresh `key` from response headers
    ///
    /// On missing or malformed headers the bucket keeps its previous state.
    pub fn update_from_headers(&self, key: &BucketKey, headers: &HeaderMap) -> bool {
        match RateLimit::from_headers(headers) {
            Ok(limit) => {
                self.update(key.clone(), limit);
                true
            }
            Err(e) => {
                tracing::warn!(bucket = %key, error = %e, "Rate limit headers unusable, bucket unchanged");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use std::sync::Arc;
    use std::time::Instant;

    fn key(method: Method, url: &str) -> BucketKey {
        BucketKey::new(&method, &Url::parse(url).unwrap())
    }

    fn headers(remaining: &str, reset: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(REMAINING_HEADER, HeaderValue::from_str(remaining).unwrap());
        map.insert(RESET_HEADER, HeaderValue::from_str(reset).unwrap());
        map
    }

    #[test]
    fn test_bucket_key_distinguishes_method_and_url() {
        let post = key(Method::POST, "https://api.example/channels/1/messages");
        let get = key(Method::GET, "https://api.example/channels/1/messages");
        let other = key(Method::POST, "https://api.example/channels/2/messages");

        assert_ne!(post, get);
        assert_ne!(post, other);
        assert_eq!(post.to_string(), "POST https://api.example/channels/1/messages");
    }

    #[test]
    fn test_parse_headers() {
        let limit = RateLimit::from_headers(&headers("4", "1470173023")).unwrap();
        assert_eq!(limit.remaining, 4);
        assert_eq!(limit.reset.timestamp(), 1_470_173_023);

        let limit = RateLimit::from_headers(&headers("0", "1470173023.123")).unwrap();
        assert_eq!(limit.reset.timestamp_millis(), 1_470_173_023_123);
    }

    #[test]
    fn test_parse_headers_rejects_bad_values() {
        assert_eq!(
            RateLimit::from_headers(&HeaderMap::new()),
            Err(HeaderError::Missing(REMAINING_HEADER))
        );

        let mut only_remaining = HeaderMap::new();
        only_remaining.insert(REMAINING_HEADER, HeaderValue::from_static("1"));
        assert_eq!(
            RateLimit::from_headers(&only_remaining),
            Err(HeaderError::Missing(RESET_HEADER))
        );

        assert!(matches!(
            RateLimit::from_headers(&headers("many", "1470173023")),
            Err(HeaderError::Invalid { header: REMAINING_HEADER, .. })
        ));
        assert!(matches!(
            RateLimit::from_headers(&headers("1", "soon")),
            Err(HeaderError::Invalid { header: RESET_HEADER, .. })
        ));
        assert!(matches!(
            RateLimit::from_headers(&headers("1", "-5")),
            Err(HeaderError::Invalid { header: RESET_HEADER, .. })
        ));
    }

    #[test]
    fn test_wait_time() {
        let now = Utc::now();
        let later = now + chrono::Duration::milliseconds(500);

        let open = RateLimit { remaining: 1, reset: later };
        assert_eq!(open.wait_time(now), None);

        let exhausted = RateLimit { remaining: 0, reset: later };
        assert_eq!(exhausted.wait_time(now), Some(Duration::from_millis(500)));

        let expired = RateLimit { remaining: 0, reset: now - chrono::Duration::seconds(1) };
        assert_eq!(expired.wait_time(now), None);
    }

    #[test]
    fn test_malformed_headers_leave_bucket_unchanged() {
        let limiter = RateLimiter::new();
        let k = key(Method::GET, "https://api.example/gateway/bot");

        assert!(limiter.update_from_headers(&k, &headers("3", "1470173023")));
        let before = limiter.get(&k).unwrap();

        assert!(!limiter.update_from_headers(&k, &headers("oops", "1470173099")));
        assert!(!limiter.update_from_headers(&k, &HeaderMap::new()));
        assert_eq!(limiter.get(&k), Some(before));
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn test_retry_after() {
        let mut map = HeaderMap::new();
        assert_eq!(retry_after(&map), None);

        map.insert(RETRY_AFTER_HEADER, HeaderValue::from_static("1.5"));
        assert_eq!(retry_after(&map), Some(Duration::from_millis(1500)));
    }

    #[tokio::test]
    async fn test_exhausted_bucket_blocks_until_reset() {
        let limiter = RateLimiter::new();
        let k = key(Method::POST, "https://api.example/channels/1/messages");
        limiter.update(
            k.clone(),
            RateLimit {
                remaining: 0,
                reset: Utc::now() + chrono::Duration::milliseconds(250),
            },
        );

        let start = Instant::now();
        limiter.wait(&k).await;
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(200), "waited only {elapsed:?}");
        assert!(elapsed < Duration::from_secs(2));
        assert_eq!(limiter.wait_time(&k), None);
    }

    #[tokio::test]
    async fn test_other_buckets_do_not_wait_on_a_sleeping_caller() {
        let limiter = Arc::new(RateLimiter::new());
        let blocked = key(Method::POST, "https://api.example/channels/1/messages");
        let free = key(Method::POST, "https://api.example/channels/2/messages");
        limiter.update(
            blocked.clone(),
            RateLimit {
                remaining: 0,
                reset: Utc::now() + chrono::Duration::milliseconds(400),
            },
        );
        limiter.update(
            free.clone(),
            RateLimit {
                remaining: 5,
                reset: Utc::now() + chrono::Duration::seconds(30),
            },
        );

        let sleeper = {
            let limiter = limiter.clone();
            tokio::spawn(async move { limiter.wait(&blocked).await })
        };
        tokio::task::yield_now().await;

        let start = Instant::now();
        limiter.wait(&free).await;
        let unknown = key(Method::GET, "https://api.example/gateway/bot");
        limiter.wait(&unknown).await;
        assert!(start.elapsed() < Duration::from_millis(100));

        sleeper.await.unwrap();
    }
}
