// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tracing::debug;

use super::{Delivery, SenderStats, Strategy};
use crate::buffer::MessageBuffer;
use crate::constants::{DEFAULT_BATCH_MAX_CONTENT_SIZE, DEFAULT_BATCH_MAX_SIZE, DEFAULT_BATCH_WAIT};
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::formatter::Formatter;
use crate::message::Message;
use crate::transport::Transport;

/// Accumulates records and sends them when the buffer is full or outdated.
///
/// A batch is flushed when:
/// - admitting a record fills the buffer (record count or content size),
/// - a record does not fit, in which case the buffer is flushed first and the
///   record retried once against the empty buffer,
/// - `batch_wait` has elapsed since the last flush,
/// - the input queue is closed, once, before the strategy returns.
pub struct BatchStrategy {
    buffer: MessageBuffer,
    batch_wait: Duration,
    max_content_size: usize,
    delivery: Delivery,
}

impl BatchStrategy {
    /// Creates a strategy with the default batch limits and wait.
    #[must_use]
    pub fn new(formatter: Arc<dyn Formatter>, transport: Arc<dyn Transport>) -> Self {
        Self::with_limits(
            formatter,
            transport,
            DEFAULT_BATCH_WAIT,
            DEFAULT_BATCH_MAX_SIZE,
            DEFAULT_BATCH_MAX_CONTENT_SIZE,
        )
    }

    #[must_use]
    pub fn with_limits(
        formatter: Arc<dyn Formatter>,
        transport: Arc<dyn Transport>,
        batch_wait: Duration,
        max_batch_size: usize,
        max_content_size: usize,
    ) -> Self {
        BatchStrategy {
            buffer: MessageBuffer::new(max_batch_size, max_content_size),
            batch_wait,
            max_content_size,
            delivery: Delivery::new(formatter, transport, Arc::new(TracingDiagnostics)),
        }
    }

    /// Routes send failures and dropped records to `diagnostics`.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.delivery.diagnostics = diagnostics;
        self
    }

    /// Handles one record coming off the input queue.
    ///
    /// Returns true when the buffer was flushed and the timer must restart.
    async fn process(&mut self, message: Message, output: &mpsc::Sender<Message>) -> bool {
        match self.buffer.admit(message) {
            Ok(()) if self.buffer.is_full() => {
                self.flush(output).await;
                true
            }
            Ok(()) => false,
            Err(message) => {
                // The buffer could not take the record: send what it holds,
                // then give the record one more try on an empty buffer.
                self.flush(output).await;
                if let Err(message) = self.buffer.admit(message) {
                    self.delivery
                        .diagnostics()
                        .message_dropped(message.size(), self.max_content_size);
                    self.delivery.stats_mut().dropped += 1;
                }
                true
            }
        }
    }

    /// Sends every record held by the buffer. No-op when it is empty.
    async fn flush(&mut self, output: &mpsc::Sender<Message>) {
        if self.buffer.is_empty() {
            return;
        }
        let messages = self.buffer.drain();
        debug!("LOGS | Flushing batch of {} logs", messages.len());
        self.delivery.deliver(messages, output).await;
    }
}

#[async_trait]
impl Strategy for BatchStrategy {
    async fn run(
        mut self,
        mut input: mpsc::Receiver<Message>,
        output: mpsc::Sender<Message>,
    ) -> SenderStats {
        debug!("LOGS | Batch strategy started");

        let flush_timer = sleep(self.batch_wait);
        tokio::pin!(flush_timer);

        loop {
            tokio::select! {
                message = input.recv() => {
                    let Some(message) = message else {
                        // No more records will arrive
                        self.flush(&output).await;
                        break;
                    };
                    if self.process(message, &output).await {
                        // Resetting replaces any expiration that was already
                        // pending, so a capacity flush is never followed by a
                        // stale timer flush.
                        flush_timer.as_mut().reset(Instant::now() + self.batch_wait);
                    }
                }
                () = &mut flush_timer => {
                    // The oldest record has waited long enough
                    self.flush(&output).await;
                    flush_timer.as_mut().reset(Instant::now() + self.batch_wait);
                }
            }
        }

        let stats = self.delivery.into_stats();
        debug!("LOGS | Batch strategy stopped: {stats:?}");
        stats
    }
}
