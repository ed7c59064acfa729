// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Delivery of encoded payloads.
//!
//! The sender only knows how to call [`Transport::send`] and branch on its
//! result. Retries, compression and connection handling live behind the
//! trait.

use std::future::Future;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::errors::SendError;

pub mod http;

pub use http::{HttpTransport, HttpTransportConfig};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Delivers one payload. May block for as long as the transport needs.
    async fn send(&self, payload: Vec<u8>) -> Result<(), SendError>;
}

/// Adapts an async closure into a [`Transport`].
///
/// ```rust
/// use datadog_logs_sender::errors::SendError;
/// use datadog_logs_sender::transport::FnTransport;
///
/// let transport = FnTransport::new(|payload: Vec<u8>| async move {
///     println!("{} bytes", payload.len());
///     Ok::<(), SendError>(())
/// });
/// ```
pub struct FnTransport<F> {
    send_fn: F,
}

impl<F> FnTransport<F> {
    pub fn new(send_fn: F) -> Self {
        Self { send_fn }
    }
}

#[async_trait]
impl<F, Fut> Transport for FnTransport<F>
where
    F: Fn(Vec<u8>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), SendError>> + Send + 'static,
{
    async fn send(&self, payload: Vec<u8>) -> Result<(), SendError> {
        (self.send_fn)(payload).await
    }
}

/// Writes every payload to stdout, followed by a newline.
#[derive(Debug, Default)]
pub struct StdoutTransport {
    stdout: Mutex<Option<tokio::io::Stdout>>,
}

impl StdoutTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for StdoutTransport {
    async fn send(&self, payload: Vec<u8>) -> Result<(), SendError> {
        let mut guard = self.stdout.lock().await;
        let stdout = guard.get_or_insert_with(tokio::io::stdout);

        stdout
            .write_all(&payload)
            .await
            .map_err(|e| SendError::Transport(format!("Failed to write to stdout: {e}")))?;
        if !payload.ends_with(b"\n") {
            stdout
                .write_all(b"\n")
                .await
                .map_err(|e| SendError::Transport(format!("Failed to write to stdout: {e}")))?;
        }
        stdout
            .flush()
            .await
            .map_err(|e| SendError::Transport(format!("Failed to flush stdout: {e}")))
    }
}
