//! REST client
//!
//! Every request goes through [`RestClient::send`], which waits on the
//! request's bucket, attaches the bot credential and records the rate limit
//! headers of the response.

use crate::error::{RestError, RestResult};
use crate::models::{CreateMessage, GatewayBot, Message};
use crate::ratelimit::{retry_after, BucketKey, RateLimiter};
use discraft_common::Secret;
use discraft_core::Snowflake;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("DiscordBot (discraft, ", env!("CARGO_PKG_VERSION"), ")");

/// Upper bound on one request, response body included
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Rate-limited API client, cheap to clone
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base: String,
    token: Secret,
    limiter: Arc<RateLimiter>,
}

impl RestClient {
    /// Create a client for the API rooted at `base` (e.g. `https://discord.com/api/v10`)
    pub fn new(base: impl Into<String>, token: Secret) -> RestResult<Self> {
        Self::with_timeout(base, token, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base: impl Into<String>, token: Secret, timeout: Duration) -> RestResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(http, base, token))
    }

    #[must_use]
    pub fn with_client(http: reqwest::Client, base: impl Into<String>, token: Secret) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            http,
            base,
            token,
            limiter: Arc::new(RateLimiter::new()),
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Absolute URL of an API path
    pub fn endpoint(&self, path: &str) -> RestResult<Url> {
        Ok(Url::parse(&format!("{}/{}", self.base, path.trim_start_matches('/')))?)
    }

    /// Send a request, respecting its bucket
    ///
    /// A 429 response is retried once after the bucket resets. Non-2xx
    /// responses become [`RestError::Status`].
    pub async fn send(&self, mut request: Request) -> RestResult<Response> {
        let mut auth = HeaderValue::from_str(&self.token.bot_authorization())
            .map_err(|_| RestError::InvalidCredential)?;
        auth.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, auth);

        let key = BucketKey::of(&request);
        let retry = request.try_clone();

        self.limiter.wait(&key).await;
        let mut response = self.execute(request, &key).await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            if let Some(retry) = retry {
                let wait = self
                    .limiter
                    .wait_time(&key)
                    .or_else(|| retry_after(response.headers()))
                    .unwrap_or_default();
                tracing::warn!(bucket = %key, wait_ms = wait.as_millis(), "Rate limited, retrying once");
                tokio::time::sleep(wait).await;
                response = self.execute(retry, &key).await?;
            }
        }

        let result = check_status(response).await;
        if matches!(&result, Err(e) if e.is_rate_limited()) {
            tracing::warn!(bucket = %key, "Still rate limited after retry");
        }
        result
    }

    async fn execute(&self, request: Request, key: &BucketKey) -> RestResult<Response> {
        tracing::debug!(bucket = %key, "Sending API request");
        let response = self.http.execute(request).await?;
        tracing::debug!(bucket = %key, status = %response.status(), "API response");
        self.limiter.update_from_headers(key, response.headers());
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: Request) -> RestResult<T> {
        let response = self.send(request).await?;
        response.json::<T>().await.map_err(RestError::Decode)
    }

    /// `GET /gateway/bot`
    pub async fn get_gateway_bot(&self) -> RestResult<GatewayBot> {
        let request = self.http.get(self.endpoint("gateway/bot")?).build()?;
        let gateway: GatewayBot = self.send_json(request).await?;
        tracing::info!(url = %gateway.url, shards = ?gateway.shards, "Discovered gateway endpoint");
        Ok(gateway)
    }

    /// `POST /channels/{channel_id}/messages`
    pub async fn create_message(&self, channel_id: Snowflake, content: &str) -> RestResult<Message> {
        let url = self.endpoint(&format!("channels/{channel_id}/messages"))?;
        let request = self
            .http
            .request(Method::POST, url)
            .json(&CreateMessage { content })
            .build()?;

        let message: Message = self.send_json(request).await?;
        tracing::info!(channel_id = %channel_id, message_id = %message.id, "Message posted");
        Ok(message)
    }
}

async fn check_status(response: Response) -> RestResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = %status, body = %body, "API request failed");
    Err(RestError::Status { status, body })
}
