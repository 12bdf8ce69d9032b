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

//! Middleware.

use std::fmt;

use super::dispatch::Responder;
use super::handler::{Next, Result};
use super::http::Request;

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Middleware.
///
/// Middlewares are the building blocks of the request processing chain. Each
/// middleware receives the request, the [`Responder`] owning the response of
/// the current dispatch, and the continuation [`Next`], and must do exactly
/// one of two things:
///
/// - End the response through [`Responder::end`], and return without calling
///   the continuation, which stops the chain.
/// - Hand control to the next middleware through [`Next::run`].
///
/// Since the continuation is consumed when run, calling it twice doesn't
/// compile. Calling it after ending the response is reported as an error.
/// Besides closures which exactly match the signature of
/// [`Middleware::process`], this trait is implemented for [`Stack`][], so
/// stacks can be nested.
///
/// [`Stack`]: crate::handler::Stack
pub trait Middleware: Send + Sync + 'static {
    /// Processes the given request.
    ///
    /// # Errors
    ///
    /// Errors returned by the middleware, or by any middleware further down
    /// the chain, are propagated to the caller of the dispatch.
    ///
    /// # Examples
    ///
    /// This example shows how to implement a middleware answering requests to
    /// `/coffee` with "418 I'm a Teapot", while handing all other requests to
    /// the next middleware.
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use relay_serve::dispatch::{Dispatcher, Responder};
    /// use relay_serve::handler::{Next, Result};
    /// use relay_serve::http::{Request, Response, Status};
    /// use relay_serve::middleware::Middleware;
    ///
    /// // Define middleware
    /// struct Teapot;
    ///
    /// // Create middleware implementation
    /// impl Middleware for Teapot {
    ///     fn process(
    ///         &self, req: &Request, res: &mut Responder, next: Next<'_>,
    ///     ) -> Result {
    ///         if req.target == "/coffee" {
    ///             res.status(Status::IM_A_TEAPOT)?;
    ///             res.end("")
    ///         } else {
    ///             next.run(req, res)
    ///         }
    ///     }
    /// }
    ///
    /// // Create dispatcher with middleware
    /// let dispatcher = Dispatcher::builder()
    ///     .with(Teapot)
    ///     .sink(|_: &Response| {})
    ///     .build();
    ///
    /// // Dispatch request
    /// let req = Request::new().target("/coffee");
    /// let res = dispatcher.dispatch(&req)?;
    /// assert_eq!(res.status, Status::IM_A_TEAPOT);
    /// # Ok(())
    /// # }
    /// ```
    fn process(
        &self, req: &Request, res: &mut Responder, next: Next<'_>,
    ) -> Result;
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl fmt::Debug for Box<dyn Middleware> {
    /// Formats the middleware for debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Box<dyn Middleware>")
    }
}

// ----------------------------------------------------------------------------
// Blanket implementations
// ----------------------------------------------------------------------------

impl<F> Middleware for F
where
    F: Fn(&Request, &mut Responder, Next<'_>) -> Result
        + Send
        + Sync
        + 'static,
{
    #[inline]
    fn process(
        &self, req: &Request, res: &mut Responder, next: Next<'_>,
    ) -> Result {
        self(req, res, next)
    }
}
