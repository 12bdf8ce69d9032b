// Copyright (c) 2025 Zensical and contributors

// SPDX-License-Identifier: MIT
// Third-party contributions licensed under DCO

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to
// deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NON-INFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS
// IN THE SOFTWARE.

// ----------------------------------------------------------------------------

//! Parser event.

use relay_emit::{Event, Lifecycle, LifecycleKind};

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Parser event.
///
/// Events are published in the order in which the corresponding parts of a
/// message are encountered in the byte stream. A message starts with
/// [`Message::MessageBegin`], followed by either [`Message::Url`] for
/// requests or [`Message::Status`] for responses, one [`Message::HeaderField`]
/// and [`Message::HeaderValue`] pair per header, [`Message::HeadersComplete`],
/// the body, and finally [`Message::MessageComplete`]. Chunked bodies bracket
/// each chunk with [`Message::ChunkHeader`] and [`Message::ChunkComplete`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    /// Subscription change of the parser's emitter.
    Listener(Lifecycle),
    /// Start of a message.
    MessageBegin,
    /// Request target.
    Url(String),
    /// Response reason phrase.
    Status(String),
    /// Header name.
    HeaderField(String),
    /// Header value.
    HeaderValue(String),
    /// End of the header block.
    HeadersComplete,
    /// Raw body bytes.
    Body(Vec<u8>),
    /// End of a message.
    MessageComplete,
    /// Start of a chunk.
    ChunkHeader,
    /// End of a chunk.
    ChunkComplete,
}

/// Parser event kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Kind of [`Message::Listener`].
    Listener(LifecycleKind),
    /// Kind of [`Message::MessageBegin`].
    MessageBegin,
    /// Kind of [`Message::Url`].
    Url,
    /// Kind of [`Message::Status`].
    Status,
    /// Kind of [`Message::HeaderField`].
    HeaderField,
    /// Kind of [`Message::HeaderValue`].
    HeaderValue,
    /// Kind of [`Message::HeadersComplete`].
    HeadersComplete,
    /// Kind of [`Message::Body`].
    Body,
    /// Kind of [`Message::MessageComplete`].
    MessageComplete,
    /// Kind of [`Message::ChunkHeader`].
    ChunkHeader,
    /// Kind of [`Message::ChunkComplete`].
    ChunkComplete,
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl From<Lifecycle> for Message {
    #[inline]
    fn from(event: Lifecycle) -> Self {
        Message::Listener(event)
    }
}

impl Event for Message {
    type Kind = MessageKind;

    /// Returns the kind of the parser event.
    fn kind(&self) -> MessageKind {
        match self {
            Message::Listener(event) => MessageKind::Listener(event.kind()),
            Message::MessageBegin => MessageKind::MessageBegin,
            Message::Url(_) => MessageKind::Url,
            Message::Status(_) => MessageKind::Status,
            Message::HeaderField(_) => MessageKind::HeaderField,
            Message::HeaderValue(_) => MessageKind::HeaderValue,
            Message::HeadersComplete => MessageKind::HeadersComplete,
            Message::Body(_) => MessageKind::Body,
            Message::MessageComplete => MessageKind::MessageComplete,
            Message::ChunkHeader => MessageKind::ChunkHeader,
            Message::ChunkComplete => MessageKind::ChunkComplete,
        }
    }
}
