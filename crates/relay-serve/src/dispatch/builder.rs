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

//! Dispatcher builder.

use std::sync::Arc;

use crate::handler::{Handler, NotFound, Stack};
use crate::middleware::Middleware;

use super::sink::{Printer, Sink};
use super::Dispatcher;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Dispatcher builder.
#[derive(Debug)]
pub struct Builder {
    /// Stack of middlewares.
    stack: Stack,
    /// Fallback handler.
    fallback: Box<dyn Handler>,
    /// Sink for ended responses.
    sink: Arc<dyn Sink>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Builder {
    /// Creates a dispatcher builder.
    ///
    /// Note that the canonical way to create a [`Dispatcher`] is to invoke the
    /// [`Dispatcher::builder`] method, which creates an instance of [`Builder`].
    /// The builder starts out with no middlewares, [`NotFound`] as fallback,
    /// and [`Printer`] as sink.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_serve::dispatch::Builder;
    ///
    /// // Create dispatcher builder
    /// let builder = Builder::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            stack: Stack::new(),
            fallback: Box::new(NotFound),
            sink: Arc::new(Printer),
        }
    }

    /// Adds a middleware.
    #[inline]
    #[must_use]
    pub fn with<M>(mut self, middleware: M) -> Self
    where
        M: Middleware,
    {
        self.stack.add(middleware);
        self
    }

    /// Sets the fallback handler.
    ///
    /// The fallback handler receives every request which all middlewares
    /// handed on without ending the response.
    #[inline]
    #[must_use]
    pub fn fallback<H>(mut self, handler: H) -> Self
    where
        H: Handler,
    {
        self.fallback = Box::new(handler);
        self
    }

    /// Sets the sink for ended responses.
    #[inline]
    #[must_use]
    pub fn sink<S>(mut self, sink: S) -> Self
    where
        S: Sink,
    {
        self.sink = Arc::new(sink);
        self
    }

    /// Creates the dispatcher.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_serve::dispatch::Builder;
    /// use relay_serve::http::Response;
    ///
    /// // Create dispatcher with silent sink
    /// let dispatcher = Builder::new()
    ///     .sink(|_: &Response| {})
    ///     .build();
    /// assert!(dispatcher.is_empty());
    /// ```
    #[must_use]
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            stack: self.stack,
            fallback: self.fallback,
            sink: self.sink,
        }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Default for Builder {
    /// Creates a dispatcher builder.
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
