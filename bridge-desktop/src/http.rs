//! `HttpClient` backed by reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpRequest, HttpResponse},
};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pooled rustls client for catalog reads
///
/// Sends each request once. Retrying is left to the catalog provider, which
/// knows how its API signals rate limits.
#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Client whose requests time out after `timeout` unless the request sets its own
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("playlist-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map(Self::with_client)
            .map_err(|e| BridgeError::NotAvailable(format!("Failed to build HTTP client: {}", e)))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn to_reqwest(&self, request: &HttpRequest) -> reqwest::RequestBuilder {
        let builder = request
            .headers
            .iter()
            .fold(self.client.get(&request.url), |builder, (name, value)| {
                builder.header(name, value)
            });

        match request.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }

    fn transport_error(url: &str, e: reqwest::Error) -> BridgeError {
        let reason = if e.is_timeout() {
            "timed out".to_string()
        } else if e.is_connect() {
            format!("connection failed: {}", e)
        } else {
            e.to_string()
        };
        BridgeError::OperationFailed(format!("GET {} {}", url, reason))
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(url = %request.url, "Sending request");

        let response = self.to_reqwest(&request).send().await.map_err(|e| {
            warn!(url = %request.url, error = %e, "Request failed");
            Self::transport_error(&request.url, e)
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| Self::transport_error(&request.url, e))?;

        debug!(url = %request.url, status, bytes = body.len(), "Received response");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
