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

//! HTTP request.

use std::fmt;

use super::Headers;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP request.
///
/// Requests are immutable once assembled, and are only ever handed out by
/// reference while being dispatched. They're usually created from a byte
/// stream with an [`Assembler`][] attached to a [`Parser`][], but can also
/// be built by hand, which is convenient for tests.
///
/// [`Assembler`]: crate::parser::Assembler
/// [`Parser`]: crate::parser::Parser
///
/// # Examples
///
/// ```
/// use relay_serve::http::Request;
///
/// // Create request
/// let req = Request::new()
///     .target("/handler1")
///     .header("Accept", "text/plain");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    /// Request target.
    pub target: String,
    /// Request headers.
    pub headers: Headers,
    /// Request body, if any.
    pub body: Option<Vec<u8>>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Request {
    /// Creates a request.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_serve::http::Request;
    ///
    /// // Create request
    /// let req = Request::new();
    /// assert_eq!(req.target, "/");
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target of the request.
    #[inline]
    #[must_use]
    pub fn target<T>(mut self, target: T) -> Self
    where
        T: Into<String>,
    {
        self.target = target.into();
        self
    }

    /// Adds a header to the request.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_serve::http::Request;
    ///
    /// // Create request and add header
    /// let req = Request::new()
    ///     .header("Host", "localhost");
    /// assert_eq!(req.headers.get("host"), Some("localhost"));
    /// ```
    #[inline]
    #[must_use]
    pub fn header<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<String>,
        V: AsRef<str>,
    {
        self.headers.append(name, value);
        self
    }

    /// Sets the body of the request.
    #[inline]
    #[must_use]
    pub fn body<B>(mut self, body: B) -> Self
    where
        B: Into<Vec<u8>>,
    {
        self.body = Some(body.into());
        self
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Default for Request {
    /// Creates a request for the root target.
    #[inline]
    fn default() -> Self {
        Self {
            target: String::from("/"),
            headers: Headers::new(),
            body: None,
        }
    }
}

impl fmt::Display for Request {
    /// Formats the request for display.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.target)?;
        write!(f, "{}", self.headers)?;
        if let Some(body) = &self.body {
            write!(f, "\r\n{}", String::from_utf8_lossy(body))?;
        }

        // No errors occurred
        Ok(())
    }
}
