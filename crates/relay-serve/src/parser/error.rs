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

//! Parser error.

use std::result;
use std::str::Utf8Error;
use thiserror::Error;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Parser error.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed message head.
    #[error(transparent)]
    Parse(#[from] httparse::Error),

    /// Malformed chunk.
    #[error("invalid chunk")]
    InvalidChunk,

    /// Malformed or conflicting content length.
    #[error("invalid content length")]
    InvalidLength,

    /// Message head exceeds the size limit.
    #[error("message head too large")]
    HeadTooLarge,

    /// Header value is not valid UTF-8.
    #[error(transparent)]
    Utf8(#[from] Utf8Error),

    /// Input ended in the middle of a message.
    #[error("incomplete message")]
    Incomplete,
}

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// Parser result.
pub type Result<T = ()> = result::Result<T, Error>;
