// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Outcome of a failed transport call.
///
/// Strategies branch on the variant: a cancelled send drops the batch without
/// a diagnostic, any other failure is reported and the batch is still
/// forwarded downstream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// The transport is shutting down and did not deliver the payload.
    #[error("send cancelled")]
    Cancelled,

    #[error("{0}")]
    Transport(String),
}

/// Errors raised while reading configuration from the environment
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}
