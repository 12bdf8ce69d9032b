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

//! Request dispatch.
//!
//! This crate drives HTTP requests through an ordered chain of middlewares.
//! Each middleware either ends the response or hands control to the next one
//! through an explicit continuation, and requests nobody answers end up with
//! a fallback handler, which responds with "404 Not Found". Requests can be
//! built by hand, or assembled from raw bytes by the [`parser`], which
//! publishes the parts of each message as typed events.
//!
//! ```
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use relay_serve::dispatch::{Dispatcher, Responder};
//! use relay_serve::handler::Next;
//! use relay_serve::http::{Request, Response, Status};
//!
//! // Create dispatcher with middleware
//! let dispatcher = Dispatcher::builder()
//!     .with(|req: &Request, res: &mut Responder, next: Next<'_>| {
//!         if req.target == "/handler1" {
//!             res.end("I only listen on /handler1!")
//!         } else {
//!             next.run(req, res)
//!         }
//!     })
//!     .sink(|res: &Response| println!("{}", res.status))
//!     .build();
//!
//! // Dispatch request nobody answers
//! let res = dispatcher.dispatch(&Request::new().target("/missing"))?;
//! assert_eq!(res.status, Status::NOT_FOUND);
//! # Ok(())
//! # }
//! ```

#![allow(clippy::doc_markdown)]

pub mod dispatch;
pub mod handler;
pub mod http;
pub mod middleware;
pub mod parser;
