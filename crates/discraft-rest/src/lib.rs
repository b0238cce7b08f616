//! # discraft-rest
//!
//! Outbound REST requests with per-bucket rate limiting. Buckets are keyed
//! by (method, url) and refreshed from the `X-RateLimit-*` response headers.

pub mod client;
pub mod error;
pub mod models;
pub mod ratelimit;

pub use client::RestClient;
pub use error::{RestError, RestResult};
pub use models::{GatewayBot, Message};
pub use ratelimit::{BucketKey, HeaderError, RateLimit, RateLimiter};
