// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Sending strategies.
//!
//! A strategy drains the input queue, hands payloads to the transport, and
//! forwards every record it considers processed to the output queue:
//!
//! ```text
//!   input ──> Strategy ──> Formatter ──> Transport
//!                 │
//!                 └──────> output (after each send)
//! ```
//!
//! - [`BatchStrategy`] groups records into bounded batches flushed on size,
//!   content size, or elapsed time.
//! - [`StreamStrategy`] sends every record as its own payload.
//!
//! Both apply the same rules to the transport result: a cancelled send drops
//! the records silently, any other failure is reported through
//! [`Diagnostics`] and the records are still forwarded.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::errors::SendError;
use crate::formatter::Formatter;
use crate::message::Message;
use crate::transport::Transport;

pub mod batch;
pub mod stream;

pub use batch::BatchStrategy;
pub use stream::StreamStrategy;

#[async_trait]
pub trait Strategy: Send {
    /// Processes `input` until it is closed and drained.
    ///
    /// Returns what happened over the lifetime of the strategy.
    async fn run(
        self,
        input: mpsc::Receiver<Message>,
        output: mpsc::Sender<Message>,
    ) -> SenderStats;
}

/// Counters accumulated by a strategy while it runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SenderStats {
    /// Payloads handed to the transport
    pub payloads: u64,
    /// Records written to the output queue
    pub forwarded: u64,
    /// Payloads the transport failed to deliver, records still forwarded
    pub send_errors: u64,
    /// Payloads dropped because the transport was cancelled
    pub cancelled: u64,
    /// Records that could never fit into a batch
    pub dropped: u64,
}

/// Formatter, transport and diagnostics shared by every strategy.
pub(crate) struct Delivery {
    formatter: Arc<dyn Formatter>,
    transport: Arc<dyn Transport>,
    diagnostics: Arc<dyn Diagnostics>,
    stats: SenderStats,
}

impl Delivery {
    pub(crate) fn new(
        formatter: Arc<dyn Formatter>,
        transport: Arc<dyn Transport>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            formatter,
            transport,
            diagnostics,
            stats: SenderStats::default(),
        }
    }

    pub(crate) fn diagnostics(&self) -> &dyn Diagnostics {
        self.diagnostics.as_ref()
    }

    pub(crate) fn stats_mut(&mut self) -> &mut SenderStats {
        &mut self.stats
    }

    pub(crate) fn into_stats(self) -> SenderStats {
        self.stats
    }

    /// Encodes and sends `messages`, then forwards them downstream.
    ///
    /// Forwarding waits for room in the output queue: a slow consumer stalls
    /// the strategy, which in turn stops draining its input.
    pub(crate) async fn deliver(&mut self, messages: Vec<Message>, output: &mpsc::Sender<Message>) {
        if messages.is_empty() {
            return;
        }

        let payload = self.formatter.format(&messages);
        self.stats.payloads += 1;

        match self.transport.send(payload).await {
            Ok(()) => {}
            Err(SendError::Cancelled) => {
                self.stats.cancelled += 1;
                return;
            }
            Err(e) => {
                self.stats.send_errors += 1;
                self.diagnostics.send_failed(&e, messages.len());
            }
        }

        for message in messages {
            if output.send(message).await.is_err() {
                debug!("LOGS | Output queue closed, records are no longer forwarded");
                return;
            }
            self.stats.forwarded += 1;
        }
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Transport recording every payload and replaying scripted results.
    #[derive(Default)]
    pub(crate) struct RecordingTransport {
        payloads: Mutex<Vec<(tokio::time::Instant, Vec<u8>)>>,
        results: Mutex<VecDeque<Result<(), SendError>>>,
    }

    impl RecordingTransport {
        pub(crate) fn with_results(results: Vec<Result<(), SendError>>) -> Self {
            Self {
                payloads: Mutex::default(),
                results: Mutex::new(results.into()),
            }
        }

        #[allow(clippy::unwrap_used)]
        pub(crate) fn payloads(&self) -> Vec<String> {
            self.payloads
                .lock()
                .unwrap()
                .iter()
                .map(|(_, payload)| String::from_utf8_lossy(payload).into_owned())
                .collect()
        }

        #[allow(clippy::unwrap_used)]
        pub(crate) fn sent_at(&self) -> Vec<tokio::time::Instant> {
            self.payloads.lock().unwrap().iter().map(|(at, _)| *at).collect()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        #[allow(clippy::unwrap_used)]
        async fn send(&self, payload: Vec<u8>) -> Result<(), SendError> {
            self.payloads
                .lock()
                .unwrap()
                .push((tokio::time::Instant::now(), payload));
            self.results.lock().unwrap().pop_front().unwrap_or(Ok(()))
        }
    }

    /// Diagnostics keeping every report in memory.
    #[derive(Default)]
    pub(crate) struct RecordingDiagnostics {
        pub(crate) events: Mutex<Vec<String>>,
    }

    impl RecordingDiagnostics {
        #[allow(clippy::unwrap_used)]
        pub(crate) fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl Diagnostics for RecordingDiagnostics {
        #[allow(clippy::unwrap_used)]
        fn send_failed(&self, error: &SendError, batch_len: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("send_failed({batch_len}): {error}"));
        }

        #[allow(clippy::unwrap_used)]
        fn message_dropped(&self, size: usize, max_content_size: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("message_dropped({size} > {max_content_size})"));
        }
    }

    /// Formats a batch as the contents joined by commas, e.g. `a,b,c`.
    pub(crate) fn join_formatter(messages: &[Message]) -> Vec<u8> {
        messages
            .iter()
            .map(|m| String::from_utf8_lossy(m.content()).into_owned())
            .collect::<Vec<_>>()
            .join(",")
            .into_bytes()
    }

    pub(crate) async fn drain(output: &mut mpsc::Receiver<Message>) -> Vec<String> {
        let mut contents = Vec::new();
        while let Some(message) = output.recv().await {
            contents.push(String::from_utf8_lossy(message.content()).into_owned());
        }
        contents
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::test_utils::*;
    use super::*;

    fn delivery(
        transport: Arc<RecordingTransport>,
        diagnostics: Arc<RecordingDiagnostics>,
    ) -> Delivery {
        Delivery::new(Arc::new(join_formatter), transport, diagnostics)
    }

    fn messages(contents: &[&str]) -> Vec<Message> {
        contents.iter().map(|c| Message::new(*c)).collect()
    }

    #[tokio::test]
    async fn test_deliver_empty_batch_is_noop() {
        let transport = Arc::new(RecordingTransport::default());
        let diagnostics = Arc::new(RecordingDiagnostics::default());
        let (output_tx, mut output_rx) = mpsc::channel(10);
        let mut delivery = delivery(Arc::clone(&transport), Arc::clone(&diagnostics));

        delivery.deliver(Vec::new(), &output_tx).await;
        drop(output_tx);

        assert!(transport.payloads().is_empty());
        assert!(drain(&mut output_rx).await.is_empty());
        assert_eq!(delivery.into_stats(), SenderStats::default());
    }

    #[tokio::test]
    async fn test_deliver_success_forwards_in_order() {
        let transport = Arc::new(RecordingTransport::default());
        let diagnostics = Arc::new(RecordingDiagnostics::default());
        let (output_tx, mut output_rx) = mpsc::channel(10);
        let mut delivery = delivery(Arc::clone(&transport), Arc::clone(&diagnostics));

        delivery.deliver(messages(&["a", "b", "c"]), &output_tx).await;
        drop(output_tx);

        assert_eq!(transport.payloads(), vec!["a,b,c"]);
        assert_eq!(drain(&mut output_rx).await, vec!["a", "b", "c"]);
        assert!(diagnostics.events().is_empty());
        let stats = delivery.into_stats();
        assert_eq!(stats.payloads, 1);
        assert_eq!(stats.forwarded, 3);
    }

    #[tokio::test]
    async fn test_deliver_cancelled_drops_silently() {
        let transport = Arc::new(RecordingTransport::with_results(vec![Err(
            SendError::Cancelled,
        )]));
        let diagnostics = Arc::new(RecordingDiagnostics::default());
        let (output_tx, mut output_rx) = mpsc::channel(10);
        let mut delivery = delivery(Arc::clone(&transport), Arc::clone(&diagnostics));

        delivery.deliver(messages(&["a", "b"]), &output_tx).await;
        drop(output_tx);

        assert_eq!(transport.payloads(), vec!["a,b"]);
        assert!(drain(&mut output_rx).await.is_empty());
        assert!(diagnostics.events().is_empty());
        let stats = delivery.into_stats();
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.forwarded, 0);
    }

    #[tokio::test]
    async fn test_deliver_transport_error_still_forwards() {
        let transport = Arc::new(RecordingTransport::with_results(vec![Err(
            SendError::Transport("503".to_string()),
        )]));
        let diagnostics = Arc::new(RecordingDiagnostics::default());
        let (output_tx, mut output_rx) = mpsc::channel(10);
        let mut delivery = delivery(Arc::clone(&transport), Arc::clone(&diagnostics));

        delivery.deliver(messages(&["a", "b"]), &output_tx).await;
        drop(output_tx);

        assert_eq!(drain(&mut output_rx).await, vec!["a", "b"]);
        assert_eq!(diagnostics.events(), vec!["send_failed(2): 503"]);
        let stats = delivery.into_stats();
        assert_eq!(stats.send_errors, 1);
        assert_eq!(stats.forwarded, 2);
    }

    #[tokio::test]
    async fn test_deliver_stops_forwarding_when_output_closed() {
        let transport = Arc::new(RecordingTransport::default());
        let diagnostics = Arc::new(RecordingDiagnostics::default());
        let (output_tx, output_rx) = mpsc::channel(10);
        drop(output_rx);
        let mut delivery = delivery(Arc::clone(&transport), Arc::clone(&diagnostics));

        delivery.deliver(messages(&["a", "b"]), &output_tx).await;

        assert_eq!(transport.payloads(), vec!["a,b"]);
        assert_eq!(delivery.into_stats().forwarded, 0);
    }
}
