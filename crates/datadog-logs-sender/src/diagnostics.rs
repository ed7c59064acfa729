// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use tracing::warn;

use crate::errors::SendError;

/// Sink for the non-fatal conditions a strategy runs into.
///
/// Strategies receive one at construction instead of writing to the global
/// logger, so owners can route or count these events.
pub trait Diagnostics: Send + Sync {
    /// A payload could not be delivered. The batch is still forwarded.
    fn send_failed(&self, error: &SendError, batch_len: usize);

    /// A record could not fit into an empty batch and was dropped.
    fn message_dropped(&self, size: usize, max_content_size: usize);
}

/// Default diagnostics, reported as `tracing` warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn send_failed(&self, error: &SendError, batch_len: usize) {
        warn!("LOGS | Could not send payload of {batch_len} logs: {error}");
    }

    fn message_dropped(&self, size: usize, max_content_size: usize) {
        warn!(
            "LOGS | Dropping log of {size} bytes: larger than the maximum batch content size of {max_content_size} bytes"
        );
    }
}
