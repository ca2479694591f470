//! Relay Proxy.
//!
//! Fetches resolved media from its upstream host and forwards it to the
//! client chunk by chunk. The upstream host only serves requests that look
//! like they come from a browser on the video page, so every outbound request
//! carries a browser user agent and referer. Compression is disabled so byte
//! offsets in forwarded `Range` requests stay meaningful.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use sw_core::config::RelayConfig;
use sw_core::{Error, Result};

use super::end_on_error;

/// Upstream response headers copied through to the client.
const FORWARDED_HEADERS: [header::HeaderName; 2] = [header::CONTENT_LENGTH, header::CONTENT_RANGE];

/// Streams remote media to HTTP clients.
pub struct RelayProxy {
    client: reqwest::Client,
    config: RelayConfig,
}

impl RelayProxy {
    pub fn new(config: RelayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.request_timeout())
            .read_timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Ask the upstream host for the media type with a short `HEAD` request.
    ///
    /// Any failure falls back to the configured default type.
    pub async fn probe_content_type(&self, media_url: &str) -> String {
        let probe = self
            .client
            .head(media_url)
            .header(header::REFERER, &self.config.referer)
            .timeout(self.config.probe_timeout())
            .send()
            .await;

        let content_type = match probe {
            Ok(resp) if resp.status().is_success() => resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            Ok(resp) => {
                tracing::debug!(status = %resp.status(), "Content-type probe rejected");
                None
            }
            Err(e) => {
                tracing::debug!("Content-type probe failed: {e}");
                None
            }
        };

        content_type.unwrap_or_else(|| self.config.default_content_type.clone())
    }

    /// Open the upstream media and build a streaming response.
    ///
    /// `range` is forwarded unchanged. A non-success upstream status fails
    /// before any byte reaches the client.
    pub async fn stream(&self, media_url: &str, range: Option<&HeaderValue>) -> Result<Response> {
        let content_type = self.probe_content_type(media_url).await;

        let mut request = self
            .client
            .get(media_url)
            .header(header::REFERER, &self.config.referer)
            .header(header::ACCEPT_ENCODING, "identity");
        if let Some(range) = range {
            request = request.header(header::RANGE, range.clone());
        }

        let upstream = request.send().await.map_err(|e| {
            Error::UpstreamRequestFailed(format!("media request failed: {e}"))
        })?;

        let status = upstream.status();
        if !status.is_success() {
            return Err(Error::UpstreamRequestFailed(format!(
                "media host returned {status}"
            )));
        }

        let mut headers = HeaderMap::new();
        for name in FORWARDED_HEADERS {
            if let Some(value) = upstream.headers().get(&name) {
                headers.insert(name, value.clone());
            }
        }
        headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_str(&content_type)
                .unwrap_or_else(|_| HeaderValue::from_static("audio/mpeg")),
        );

        tracing::debug!(status = %status, content_type = %content_type, "Relaying upstream media");
        let body = Body::from_stream(end_on_error(upstream.bytes_stream(), "relay".to_string()));

        let mut response = Response::new(body);
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}
