// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Default limits and timings for the logs sender.
//!
//! These match the values the agent ships with for `logs_config.batch_wait`,
//! `logs_config.batch_max_size` and `logs_config.batch_max_content_size`.

use std::time::Duration;

/// How long a record may wait in the batch buffer before the batch is flushed.
pub const DEFAULT_BATCH_WAIT: Duration = Duration::from_secs(5);

/// Maximum number of records in a single batch.
pub const DEFAULT_BATCH_MAX_SIZE: usize = 20;

/// Maximum cumulative content size of a single batch, in bytes.
///
/// A record larger than this on its own can never be batched.
pub const DEFAULT_BATCH_MAX_CONTENT_SIZE: usize = 1_000_000;

/// Capacity of the bounded input and output queues around a strategy.
pub const DEFAULT_CHAN_SIZE: usize = 100;

/// Number of attempts the HTTP transport makes before giving up on a payload.
pub const FLUSH_RETRY_COUNT: usize = 3;

/// Per-request timeout of the HTTP transport.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Zstd level used when payload compression is enabled.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 6;

pub const DEFAULT_SITE: &str = "datadoghq.com";
