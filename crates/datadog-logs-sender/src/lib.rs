// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Batching and delivery stage of a logs pipeline.
//!
//! Records are read from a bounded input queue, grouped into batches (or sent
//! one by one), encoded by a [`Formatter`], handed to a [`Transport`], and
//! forwarded to a bounded output queue once the send completed.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod buffer;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod errors;
pub mod formatter;
pub mod message;
pub mod sender;
pub mod strategy;
pub mod transport;

pub use config::Config;
pub use diagnostics::{Diagnostics, TracingDiagnostics};
pub use errors::{ConfigError, SendError};
pub use formatter::{Formatter, JsonArrayFormatter, LineFormatter};
pub use message::Message;
pub use sender::{LogsSender, SenderHandle};
pub use strategy::{BatchStrategy, SenderStats, Strategy, StreamStrategy};
pub use transport::{FnTransport, HttpTransport, HttpTransportConfig, StdoutTransport, Transport};
