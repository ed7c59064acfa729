// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Wiring of a strategy between its two queues.
//!
//! ```text
//!    ┌──────────────┐
//!    │ SenderHandle │ (Clone, one per producer)
//!    └──────┬───────┘
//!           │ input queue (chan_size)
//!           v
//!    ┌──────────────┐
//!    │  LogsSender  │ ──> Transport
//!    │    task      │
//!    └──────┬───────┘
//!           │ output queue (chan_size)
//!           v
//!       consumer
//! ```
//!
//! Both queues are bounded: producers wait on [`SenderHandle::send`] when the
//! sender falls behind, and the sender waits when the consumer of the output
//! queue falls behind.
//!
//! ```rust,ignore
//! let (sender, handle, mut processed) = LogsSender::new(&config, formatter, transport)?;
//! let task = tokio::spawn(sender.run());
//!
//! handle.send(Message::new(line)).await?;
//! drop(handle);
//!
//! while let Some(message) = processed.recv().await { /* audit */ }
//! let stats = task.await?;
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::errors::ConfigError;
use crate::formatter::Formatter;
use crate::message::Message;
use crate::strategy::{BatchStrategy, SenderStats, StreamStrategy, Strategy};
use crate::transport::Transport;

enum Mode {
    Batch(BatchStrategy),
    Stream(StreamStrategy),
}

/// Owns the strategy chosen by the configuration and the input queue.
pub struct LogsSender {
    mode: Mode,
    input: mpsc::Receiver<Message>,
    output: mpsc::Sender<Message>,
}

/// Producer side of the input queue.
#[derive(Clone, Debug)]
pub struct SenderHandle {
    tx: mpsc::Sender<Message>,
}

impl LogsSender {
    /// Builds a sender, its handle and the receiving end of the output queue.
    ///
    /// The sender stops once every handle is dropped and the remaining records
    /// have been sent. Fails if `config` holds a zero limit.
    pub fn new(
        config: &Config,
        formatter: Arc<dyn Formatter>,
        transport: Arc<dyn Transport>,
    ) -> Result<(Self, SenderHandle, mpsc::Receiver<Message>), ConfigError> {
        config.validate()?;

        let (input_tx, input_rx) = mpsc::channel(config.chan_size);
        let (output_tx, output_rx) = mpsc::channel(config.chan_size);

        let mode = if config.use_batching {
            Mode::Batch(BatchStrategy::with_limits(
                formatter,
                transport,
                config.batch_wait,
                config.batch_max_size,
                config.batch_max_content_size,
            ))
        } else {
            Mode::Stream(StreamStrategy::new(formatter, transport))
        };

        let sender = LogsSender {
            mode,
            input: input_rx,
            output: output_tx,
        };
        Ok((sender, SenderHandle { tx: input_tx }, output_rx))
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.mode = match self.mode {
            Mode::Batch(strategy) => Mode::Batch(strategy.with_diagnostics(diagnostics)),
            Mode::Stream(strategy) => Mode::Stream(strategy.with_diagnostics(diagnostics)),
        };
        self
    }

    /// Runs until the input queue is closed and drained.
    pub async fn run(self) -> SenderStats {
        debug!("LOGS | Sender started");
        let stats = match self.mode {
            Mode::Batch(strategy) => strategy.run(self.input, self.output).await,
            Mode::Stream(strategy) => strategy.run(self.input, self.output).await,
        };
        debug!("LOGS | Sender stopped");
        stats
    }
}

impl SenderHandle {
    /// Queues a record, waiting while the input queue is full.
    ///
    /// Fails, returning the record, once the sender has stopped.
    pub async fn send(&self, message: Message) -> Result<(), Message> {
        self.tx.send(message).await.map_err(|e| e.0)
    }

    /// Queues a record without waiting.
    pub fn try_send(&self, message: Message) -> Result<(), mpsc::error::TrySendError<Message>> {
        self.tx.try_send(message)
    }
}
