// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use super::{Delivery, SenderStats, Strategy};
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::formatter::Formatter;
use crate::message::Message;
use crate::transport::Transport;

/// Sends every record as soon as it arrives, as a payload of its own.
pub struct StreamStrategy {
    delivery: Delivery,
}

impl StreamStrategy {
    #[must_use]
    pub fn new(formatter: Arc<dyn Formatter>, transport: Arc<dyn Transport>) -> Self {
        StreamStrategy {
            delivery: Delivery::new(formatter, transport, Arc::new(TracingDiagnostics)),
        }
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.delivery.diagnostics = diagnostics;
        self
    }
}

#[async_trait]
impl Strategy for StreamStrategy {
    async fn run(
        mut self,
        mut input: mpsc::Receiver<Message>,
        output: mpsc::Sender<Message>,
    ) -> SenderStats {
        debug!("LOGS | Stream strategy started");

        while let Some(message) = input.recv().await {
            self.delivery.deliver(vec![message], &output).await;
        }

        let stats = self.delivery.into_stats();
        debug!("LOGS | Stream strategy stopped: {stats:?}");
        stats
    }
}
