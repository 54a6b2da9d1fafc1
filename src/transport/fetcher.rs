//! Abstract transport: the HTTP client is a collaborator, not part of the
//! core pipeline. Real traffic goes through [`ReqwestFetcher`]; tests supply
//! an in-memory or `wiremock`-backed implementation.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// Outcome of a GET/HEAD request: status code plus body (empty for HEAD).
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Bytes,
    pub content_length: Option<u64>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Distinguishes a connectivity failure (no status at all) from an HTTP
/// response that merely carries an error status, matching the
/// `NO_NETWORK` vs. non-2xx distinction in the Playlist Loader.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connectivity failure: {0}")]
    Offline(String),
    #[error("transport error: {0}")]
    Other(String),
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchResponse, TransportError>;

    /// HEAD-equivalent probe. Implementations that cannot issue a true HEAD
    /// may return `Ok(None)` to signal "unsupported" rather than erroring,
    /// so the Space Guard can fall back to a ranged GET.
    async fn head(&self, url: &str) -> Result<Option<u64>, TransportError>;

    /// Fallback probe for sources that reject HEAD: a `Range: bytes=0-0`
    /// GET, reading only response headers for the full resource length. Must
    /// not read more than a byte of body. The default returns `Ok(None)`;
    /// override only if the transport can issue a true ranged request.
    async fn probe_size(&self, _url: &str) -> Result<Option<u64>, TransportError> {
        Ok(None)
    }
}

/// Production fetcher backed by `reqwest`.
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("hls-fetch/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(classify_reqwest_error)?;
        let status = response.status().as_u16();
        let content_length = response.content_length();
        let body = response.bytes().await.map_err(classify_reqwest_error)?;
        Ok(FetchResponse {
            status,
            body,
            content_length,
        })
    }

    async fn head(&self, url: &str) -> Result<Option<u64>, TransportError> {
        let response = match self.client.head(url).send().await {
            Ok(response) => response,
            // A server rejecting HEAD outright is "unsupported", not fatal.
            Err(error) if error.is_status() => return Ok(None),
            Err(error) => return Err(classify_reqwest_error(error)),
        };
        if !response.status().is_success() {
            return Ok(None);
        }
        Ok(response.content_length())
    }

    async fn probe_size(&self, url: &str) -> Result<Option<u64>, TransportError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::RANGE, "bytes=0-0")
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        if response.status() == reqwest::StatusCode::PARTIAL_CONTENT {
            if let Some(total) = total_from_content_range(&response) {
                return Ok(Some(total));
            }
        }
        if response.status().is_success() {
            return Ok(response.content_length());
        }
        Ok(None)
    }
}

/// Parses the resource total out of a `Content-Range: bytes 0-0/12345`
/// header; `*` (unknown total) yields `None`.
fn total_from_content_range(response: &reqwest::Response) -> Option<u64> {
    let value = response
        .headers()
        .get(reqwest::header::CONTENT_RANGE)?
        .to_str()
        .ok()?;
    value.rsplit('/').next()?.parse().ok()
}

fn classify_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_connect() || error.is_timeout() {
        TransportError::Offline(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    }
}
