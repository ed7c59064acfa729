// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use datadog_logs_sender::SenderHandle;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::entry::EntryTemplate;

/// Why the forwarder stopped reading its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndOfInput,
    Interrupted,
    SenderStopped,
    ReadError,
}

/// Cancels `shutdown` on Ctrl+C. Returns early if it is cancelled elsewhere.
pub async fn wait_for_shutdown(shutdown: CancellationToken) {
    tokio::select! {
        () = shutdown.cancelled() => {}
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => {
                info!("Received Ctrl+C, dropping pending payloads");
                shutdown.cancel();
            }
            Err(e) => error!("Failed to listen for Ctrl+C: {e}"),
        },
    }
}

/// Queues every non-blank line of `reader` on the sender.
///
/// Both the read and the queueing give way to `shutdown`, so a full input
/// queue never keeps the forwarder from stopping.
pub async fn forward_lines<R>(
    reader: R,
    template: &EntryTemplate,
    handle: SenderHandle,
    shutdown: &CancellationToken,
) -> StopReason
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut queued: u64 = 0;

    let reason = loop {
        let line = tokio::select! {
            () = shutdown.cancelled() => break StopReason::Interrupted,
            line = lines.next_line() => line,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break StopReason::EndOfInput,
            Err(e) => {
                error!("Failed to read stdin: {e}");
                break StopReason::ReadError;
            }
        };
        let Some(message) = template.to_message(&line) else {
            continue;
        };

        tokio::select! {
            () = shutdown.cancelled() => break StopReason::Interrupted,
            result = handle.send(message) => {
                if result.is_err() {
                    warn!("Logs sender stopped, no longer reading stdin");
                    break StopReason::SenderStopped;
                }
                queued += 1;
            }
        }
    };

    debug!("Stopped reading input after {queued} logs: {reason:?}");
    reason
}
