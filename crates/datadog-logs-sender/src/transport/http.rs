// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! HTTP transport to the Datadog logs intake.
//!
//! Payloads are POSTed to `<endpoint>/api/v2/logs` with the `agent-json`
//! protocol, optionally zstd-compressed. Network errors and 5xx responses are
//! retried up to [`FLUSH_RETRY_COUNT`] attempts; 4xx responses are permanent.
//! Cancelling the token turns the current and every later send into
//! [`SendError::Cancelled`].

use std::env;
use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};
use zstd::stream::write::Encoder;

use super::Transport;
use crate::constants::{
    DEFAULT_COMPRESSION_LEVEL, DEFAULT_FLUSH_TIMEOUT, DEFAULT_SITE, FLUSH_RETRY_COUNT,
};
use crate::errors::{ConfigError, SendError};

/// Settings of an [`HttpTransport`].
///
/// `Debug` leaves the API key out.
#[derive(Clone)]
pub struct HttpTransportConfig {
    /// Datadog API key sent in the `DD-API-KEY` header.
    pub api_key: String,
    /// Base URL of the intake, e.g. `https://http-intake.logs.datadoghq.com`
    pub endpoint: String,
    /// Compress payloads with zstd before sending them.
    pub use_compression: bool,
    /// Zstd level, within `zstd::compression_level_range()`.
    pub compression_level: i32,
    /// Timeout of a single request attempt
    pub timeout: Duration,
    /// Proxy used for every request, if any.
    pub https_proxy: Option<String>,
}

impl std::fmt::Debug for HttpTransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransportConfig")
            .field("endpoint", &self.endpoint)
            .field("use_compression", &self.use_compression)
            .field("compression_level", &self.compression_level)
            .field("timeout", &self.timeout)
            .field("https_proxy", &self.https_proxy)
            .finish_non_exhaustive()
    }
}

impl HttpTransportConfig {
    /// Compression on at the default level, default request timeout, no proxy.
    #[must_use]
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            use_compression: true,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            timeout: DEFAULT_FLUSH_TIMEOUT,
            https_proxy: None,
        }
    }

    /// Reads the transport settings from the environment.
    ///
    /// Fails with [`ConfigError::Missing`] when `DD_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("DD_API_KEY").map_err(|_| ConfigError::Missing("DD_API_KEY"))?;

        let dd_site = env::var("DD_SITE").unwrap_or_else(|_| DEFAULT_SITE.to_string());
        // DD_LOGS_CONFIG_LOGS_DD_URL overrides the whole intake prefix, mostly for tests
        let endpoint = env::var("DD_LOGS_CONFIG_LOGS_DD_URL")
            .unwrap_or_else(|_| format!("https://http-intake.logs.{dd_site}"));

        let mut config = Self::new(api_key, endpoint);

        if let Ok(val) = env::var("DD_LOGS_CONFIG_USE_COMPRESSION") {
            config.use_compression = match val.to_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "DD_LOGS_CONFIG_USE_COMPRESSION",
                        value: val,
                    })
                }
            };
        }
        if let Ok(val) = env::var("DD_LOGS_CONFIG_COMPRESSION_LEVEL") {
            config.compression_level = val
                .parse::<i32>()
                .ok()
                .filter(|level| zstd::compression_level_range().contains(level))
                .ok_or(ConfigError::InvalidValue {
                    key: "DD_LOGS_CONFIG_COMPRESSION_LEVEL",
                    value: val,
                })?;
        }
        if let Ok(val) = env::var("DD_FLUSH_TIMEOUT") {
            let secs = val
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: "DD_FLUSH_TIMEOUT",
                    value: val,
                })?;
            config.timeout = Duration::from_secs(secs);
        }
        config.https_proxy = env::var("DD_PROXY_HTTPS")
            .or_else(|_| env::var("HTTPS_PROXY"))
            .ok();

        Ok(config)
    }
}

/// Sends payloads to the logs intake over HTTP.
pub struct HttpTransport {
    /// HTTP client for sending requests.
    client: reqwest::Client,
    /// Full intake URL, `<endpoint>/api/v2/logs`.
    url: String,
    /// Headers attached to every request, API key included.
    headers: HeaderMap,
    /// Whether payloads are zstd-compressed.
    use_compression: bool,
    /// Zstd level used when compressing.
    compression_level: i32,
    /// Once cancelled, pending and later sends fail with `SendError::Cancelled`.
    cancel_token: CancellationToken,
}

impl HttpTransport {
    /// Builds the client and the request headers.
    ///
    /// Fails if the proxy URL is invalid or the API key is not a valid header
    /// value.
    pub fn new(
        config: &HttpTransportConfig,
        cancel_token: CancellationToken,
    ) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if let Some(proxy) = &config.https_proxy {
            let proxy =
                reqwest::Proxy::https(proxy).map_err(|e| ConfigError::Client(e.to_string()))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        let mut headers = HeaderMap::new();
        let api_key =
            HeaderValue::from_str(&config.api_key).map_err(|_| ConfigError::InvalidValue {
                key: "DD_API_KEY",
                value: "<redacted>".to_string(),
            })?;
        headers.insert("DD-API-KEY", api_key);
        headers.insert("DD-PROTOCOL", HeaderValue::from_static("agent-json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if config.use_compression {
            headers.insert(CONTENT_ENCODING, HeaderValue::from_static("zstd"));
        }

        Ok(HttpTransport {
            client,
            url: format!("{}/api/v2/logs", config.endpoint.trim_end_matches('/')),
            headers,
            use_compression: config.use_compression,
            compression_level: config.compression_level,
            cancel_token,
        })
    }

    fn encode(&self, payload: Vec<u8>) -> Result<Vec<u8>, SendError> {
        if !self.use_compression {
            return Ok(payload);
        }
        compress(&payload, self.compression_level)
            .map_err(|e| SendError::Transport(format!("Failed to compress payload: {e}")))
    }
}

fn compress(data: &[u8], level: i32) -> std::io::Result<Vec<u8>> {
    let mut encoder = Encoder::new(Vec::new(), level)?;
    encoder.write_all(data)?;
    encoder.finish()
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, payload: Vec<u8>) -> Result<(), SendError> {
        if self.cancel_token.is_cancelled() {
            return Err(SendError::Cancelled);
        }
        let body = self.encode(payload)?;

        let mut attempts = 0;
        loop {
            attempts += 1;
            let request = self
                .client
                .post(&self.url)
                .headers(self.headers.clone())
                .body(body.clone());

            let resp = tokio::select! {
                () = self.cancel_token.cancelled() => return Err(SendError::Cancelled),
                resp = request.send() => resp,
            };

            let failure = match resp {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        debug!("LOGS | Flushed {} bytes in {attempts} attempt(s)", body.len());
                        return Ok(());
                    }
                    if status == StatusCode::FORBIDDEN {
                        // Access denied. Stop retrying.
                        error!("LOGS | Request was denied by Datadog: Access denied. Please verify that your API key is valid.");
                        return Err(SendError::Transport(format!("{status}: access denied")));
                    }
                    let message = format!("{status}: {}", resp.text().await.unwrap_or_default());
                    if status.is_client_error() {
                        return Err(SendError::Transport(message));
                    }
                    message
                }
                Err(e) => e.to_string(),
            };

            if attempts >= FLUSH_RETRY_COUNT {
                return Err(SendError::Transport(format!(
                    "Failed after {attempts} attempts: {failure}"
                )));
            }
            debug!("LOGS | Attempt {attempts} failed, retrying: {failure}");
        }
    }
}
