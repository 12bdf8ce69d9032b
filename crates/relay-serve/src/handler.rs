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

//! Handler.

use std::fmt;

use super::dispatch::Responder;
use super::http::{Request, Status};

mod error;
pub mod stack;

pub use error::{Error, Result};
pub use stack::{Next, Stack};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Body of the response sent by [`NotFound`].
pub const NOT_FOUND_BODY: &str =
    "Error: Could not find matching handler for this request";

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Handler.
///
/// Handlers sit at the end of every request processing chain, answering the
/// request with no next middleware to defer to. The [`Dispatcher`][] invokes
/// its handler once all middlewares handed the request on, so the handler is
/// expected to end the response. Returning without doing so leaves the
/// request unresolved, which the dispatcher reports as an error.
///
/// [`Dispatcher`]: crate::dispatch::Dispatcher
pub trait Handler: Send + Sync + 'static {
    /// Handles the given request.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Ended`], if the response was already
    /// ended, and any error raised by the handler itself.
    ///
    /// # Examples
    ///
    /// This example shows how to implement a teapot handler responding with
    /// "418 I'm a Teapot" status code to every request.
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use relay_serve::dispatch::Dispatcher;
    /// use relay_serve::handler::{Handler, Result};
    /// use relay_serve::http::{Request, Response, Status};
    /// use relay_serve::dispatch::Responder;
    ///
    /// // Define handler
    /// struct Teapot;
    ///
    /// // Create handler implementation
    /// impl Handler for Teapot {
    ///     fn handle(&self, _req: &Request, res: &mut Responder) -> Result {
    ///         res.status(Status::IM_A_TEAPOT)?;
    ///         res.end("Short and stout")
    ///     }
    /// }
    ///
    /// // Create dispatcher with handler as fallback
    /// let dispatcher = Dispatcher::builder()
    ///     .fallback(Teapot)
    ///     .sink(|_: &Response| {})
    ///     .build();
    ///
    /// // Dispatch request
    /// let res = dispatcher.dispatch(&Request::new())?;
    /// assert_eq!(res.status, Status::IM_A_TEAPOT);
    /// # Ok(())
    /// # }
    /// ```
    fn handle(&self, req: &Request, res: &mut Responder) -> Result;
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Fallback handler.
///
/// This handler always answers with "404 Not Found" and a fixed diagnostic
/// body, and is the default fallback of every [`Dispatcher`][].
///
/// [`Dispatcher`]: crate::dispatch::Dispatcher
#[derive(Clone, Copy, Debug, Default)]
pub struct NotFound;

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Handler for NotFound {
    /// Handles the given request.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use relay_serve::dispatch::Dispatcher;
    /// use relay_serve::handler::NOT_FOUND_BODY;
    /// use relay_serve::http::{Request, Response, Status};
    ///
    /// // Create dispatcher without middlewares
    /// let dispatcher = Dispatcher::builder()
    ///     .sink(|_: &Response| {})
    ///     .build();
    ///
    /// // Dispatch request
    /// let res = dispatcher.dispatch(&Request::new())?;
    /// assert_eq!(res.status, Status::NOT_FOUND);
    /// assert_eq!(res.body, NOT_FOUND_BODY.as_bytes());
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    fn handle(&self, _req: &Request, res: &mut Responder) -> Result {
        res.status(Status::NOT_FOUND)?;
        res.end(NOT_FOUND_BODY)
    }
}

// ----------------------------------------------------------------------------

impl fmt::Debug for Box<dyn Handler> {
    /// Formats the handler for debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Box<dyn Handler>")
    }
}

// ----------------------------------------------------------------------------
// Blanket implementations
// ----------------------------------------------------------------------------

impl<F> Handler for F
where
    F: Fn(&Request, &mut Responder) -> Result + Send + Sync + 'static,
{
    #[inline]
    fn handle(&self, req: &Request, res: &mut Responder) -> Result {
        self(req, res)
    }
}
