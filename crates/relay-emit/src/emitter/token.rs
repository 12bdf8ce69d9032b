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

//! Subscription token.

use std::fmt;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Subscription token.
///
/// Tokens are returned when subscribing to an [`Emitter`][], and are the only
/// way to cancel a subscription again. They don't grant access to the handler
/// and can be freely copied and compared. Internally, a token is a slot in the
/// emitter's arena together with the generation of the subscription, so a
/// token that outlives its subscription never matches a later one which
/// happens to reuse the same slot.
///
/// [`Emitter`]: crate::Emitter
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    /// Arena slot.
    key: usize,
    /// Subscription generation.
    generation: u64,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Token {
    /// Creates a token.
    pub(crate) fn new(key: usize, generation: u64) -> Self {
        Self { key, generation }
    }

    /// Returns the arena slot.
    pub(crate) fn key(self) -> usize {
        self.key
    }

    /// Returns the subscription generation.
    pub(crate) fn generation(self) -> u64 {
        self.generation
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl fmt::Debug for Token {
    /// Formats the token for debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({}v{})", self.key, self.generation)
    }
}
