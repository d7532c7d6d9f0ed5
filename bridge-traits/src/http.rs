//! HTTP bridge for catalog providers
//!
//! Catalog providers only read remote data, so a request is a GET with
//! headers and an optional timeout. Authentication and retry decisions stay
//! with the provider; the host only moves bytes.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::Result;

/// Outgoing GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            timeout: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn bearer_token(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    pub fn accept_json(self) -> Self {
        self.header("Accept", "application/json")
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Response as received from the host, body fully buffered
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }

    /// Whether the same request may succeed if sent again later
    pub fn is_retryable(&self) -> bool {
        self.is_rate_limited() || (500..600).contains(&self.status)
    }

    /// Header lookup ignoring ASCII case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// `Retry-After` in delta-seconds form
    ///
    /// HTTP-date values are ignored and the caller falls back to its own backoff.
    pub fn retry_after(&self) -> Option<Duration> {
        self.header("retry-after")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Backoff schedule for retryable responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Delay before retrying after the `attempt`-th failure (1-based)
    ///
    /// A server-provided `retry_after` wins over the exponential schedule,
    /// both capped at `max_delay`.
    pub fn delay_after(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let delay = retry_after.unwrap_or_else(|| {
            let exponent = attempt.saturating_sub(1).min(16);
            self.base_delay.saturating_mul(1 << exponent)
        });
        delay.min(self.max_delay)
    }
}

/// Host HTTP capability
///
/// ```ignore
/// use bridge_traits::http::{HttpClient, HttpRequest};
///
/// async fn playlist_json(client: &dyn HttpClient, token: &str) -> Result<String> {
///     let request = HttpRequest::get("https://api.spotify.com/v1/playlists/abc")
///         .bearer_token(token)
///         .accept_json();
///     Ok(client.execute(request).await?.body_text())
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send one request
    ///
    /// Any HTTP status is returned as a response. Errors are reserved for
    /// transport failures: DNS, connect, TLS and timeouts.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}
