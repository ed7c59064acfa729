// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// A single log record travelling through the sender.
///
/// The content is opaque to the sender. Its size is computed once, when the
/// record is produced, and never recomputed afterwards: the batch buffer only
/// ever looks at [`Message::size`].
#[derive(Clone, PartialEq, Eq)]
pub struct Message {
    content: Vec<u8>,
    size: usize,
    origin: Option<String>,
}

impl Message {
    /// Creates a record whose size is the length of its content.
    #[must_use]
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        let content = content.into();
        let size = content.len();
        Self {
            content,
            size,
            origin: None,
        }
    }

    /// Creates a record with a size computed upstream.
    ///
    /// Collectors that frame or re-encode content before it reaches the sender
    /// attach the size they accounted for instead of the raw content length.
    #[must_use]
    pub fn with_size(content: impl Into<Vec<u8>>, size: usize) -> Self {
        Self {
            content: content.into(),
            size,
            origin: None,
        }
    }

    /// Tags the record with the identifier of the source that produced it.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }
}

impl fmt::Debug for Message {
    // Content can be large and is frequently not valid UTF-8, keep it out of logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("size", &self.size)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}
