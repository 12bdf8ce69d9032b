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

//! Handler error.

use std::{error, result};
use thiserror::Error;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Handler error.
#[derive(Debug, Error)]
pub enum Error {
    /// Response was already ended.
    #[error("response already ended")]
    Ended,

    /// Continuation invoked after the response was ended.
    #[error("continuation invoked after response was ended")]
    ContinueAfterEnd,

    /// Response changed or ended after control was handed on.
    #[error("response changed after continuation returned unresolved")]
    EndAfterContinue,

    /// Dispatch returned without the response being ended.
    #[error("dispatch returned without ending the response")]
    Unresolved,

    /// Error raised by a middleware or handler.
    #[error(transparent)]
    Handler(Box<dyn error::Error + Send + Sync>),
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Error {
    /// Creates an error from an error raised by a middleware or handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_serve::handler::Error;
    ///
    /// // Create error from message
    /// let err = Error::handler("database unavailable");
    /// assert_eq!(err.to_string(), "database unavailable");
    /// ```
    pub fn handler<E>(err: E) -> Self
    where
        E: Into<Box<dyn error::Error + Send + Sync>>,
    {
        Error::Handler(err.into())
    }

    /// Returns whether the error is a usage error of the response or the
    /// continuation, as opposed to an error raised by user code.
    #[must_use]
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Error::Ended
                | Error::ContinueAfterEnd
                | Error::EndAfterContinue
                | Error::Unresolved
        )
    }
}

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// Handler result.
pub type Result<T = ()> = result::Result<T, Error>;
