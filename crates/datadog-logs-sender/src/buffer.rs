// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Bounded accumulation of log records between flushes.
//!
//! The buffer enforces two limits at once: a maximum number of records and a
//! maximum cumulative content size. No admission is allowed to push either
//! counter past its limit, so a batch taken from the buffer always fits the
//! intake's constraints.

use crate::message::Message;

/// Ordered, count- and size-bounded container of pending records.
///
/// The buffer has no synchronisation of its own. It is owned by a single
/// strategy task and only ever touched from that task.
#[derive(Debug)]
pub struct MessageBuffer {
    messages: Vec<Message>,
    content_size: usize,
    max_batch_size: usize,
    max_content_size: usize,
}

impl MessageBuffer {
    #[must_use]
    pub fn new(max_batch_size: usize, max_content_size: usize) -> Self {
        MessageBuffer {
            messages: Vec::new(),
            content_size: 0,
            max_batch_size,
            max_content_size,
        }
    }

    /// Appends `message` if both limits still hold afterwards.
    ///
    /// On rejection the buffer is left untouched and the message is handed
    /// back to the caller, which decides whether to flush and retry.
    pub fn admit(&mut self, message: Message) -> Result<(), Message> {
        if self.messages.len() >= self.max_batch_size {
            return Err(message);
        }
        match self.content_size.checked_add(message.size()) {
            Some(content_size) if content_size <= self.max_content_size => {
                self.content_size = content_size;
                self.messages.push(message);
                Ok(())
            }
            _ => Err(message),
        }
    }

    /// Returns true when no further record of nonzero size can be admitted.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.messages.len() == self.max_batch_size || self.content_size == self.max_content_size
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn content_size(&self) -> usize {
        self.content_size
    }

    /// Current contents in arrival order, without mutating the buffer.
    #[must_use]
    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    /// Resets the buffer to the empty state.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.content_size = 0;
    }

    /// Moves the current contents out and leaves the buffer empty.
    ///
    /// Snapshot and clear happen in one step, so a flush can never leave
    /// records behind that it has already handed to the formatter.
    pub fn drain(&mut self) -> Vec<Message> {
        self.content_size = 0;
        std::mem::take(&mut self.messages)
    }
}
