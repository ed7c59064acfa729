// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Payload encoders turning an ordered batch of records into bytes.
//!
//! Formatters must not depend on anything but their input: the transport may
//! resend the same payload, and strategies call the formatter exactly once
//! per batch.

use crate::message::Message;

/// Encodes an ordered sequence of records into a transportable payload.
pub trait Formatter: Send + Sync {
    fn format(&self, messages: &[Message]) -> Vec<u8>;
}

impl<F> Formatter for F
where
    F: Fn(&[Message]) -> Vec<u8> + Send + Sync,
{
    fn format(&self, messages: &[Message]) -> Vec<u8> {
        self(messages)
    }
}

/// Builds a JSON array out of records whose content is already a JSON object.
///
/// Output looks like `[{"message":"a"},{"message":"b"}]`, which is what the
/// logs intake accepts with the `agent-json` protocol. An empty batch encodes
/// to `[]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonArrayFormatter;

impl Formatter for JsonArrayFormatter {
    fn format(&self, messages: &[Message]) -> Vec<u8> {
        let content_size: usize = messages.iter().map(|m| m.content().len()).sum();
        let mut payload = Vec::with_capacity(content_size + messages.len() + 1);

        payload.push(b'[');
        for (i, message) in messages.iter().enumerate() {
            if i > 0 {
                payload.push(b',');
            }
            payload.extend_from_slice(message.content());
        }
        payload.push(b']');
        payload
    }
}

/// Newline-delimited contents, one record per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormatter;

impl Formatter for LineFormatter {
    fn format(&self, messages: &[Message]) -> Vec<u8> {
        let content_size: usize = messages.iter().map(|m| m.content().len() + 1).sum();
        let mut payload = Vec::with_capacity(content_size);

        for message in messages {
            payload.extend_from_slice(message.content());
            payload.push(b'\n');
        }
        payload
    }
}
