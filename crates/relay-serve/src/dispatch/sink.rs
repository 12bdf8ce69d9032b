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

//! Response sink.

use std::fmt;

use crate::http::Response;

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Response sink.
///
/// Sinks accept responses once they were ended, which is the point where a
/// transport would write the response to the wire. Each response is handed
/// to the sink exactly once.
pub trait Sink: Send + Sync + 'static {
    /// Accepts the given response.
    fn accept(&self, res: &Response);
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Console printer.
///
/// This sink prints a one-line summary of each response to standard output,
/// which contains the status and the body, if any.
#[derive(Clone, Copy, Debug, Default)]
pub struct Printer;

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Printer {
    /// Formats the summary line for the given response.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_serve::dispatch::Printer;
    /// use relay_serve::http::{Response, Status};
    ///
    /// // Create response and format summary
    /// let res = Response::new().body("Hello");
    /// assert_eq!(Printer::format(&res), "200 OK - Body: Hello");
    ///
    /// // Create response without body and format summary
    /// let res = Response::new().status(Status::NO_CONTENT);
    /// assert_eq!(Printer::format(&res), "204 No Content - No body");
    /// ```
    #[must_use]
    pub fn format(res: &Response) -> String {
        if res.body.is_empty() {
            format!("{} - No body", res.status)
        } else {
            format!("{} - Body: {}", res.status, res.text())
        }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Sink for Printer {
    /// Prints the summary line for the given response.
    fn accept(&self, res: &Response) {
        println!("{}", Printer::format(res));
    }
}

// ----------------------------------------------------------------------------

impl fmt::Debug for dyn Sink {
    /// Formats the sink for debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn Sink")
    }
}

// ----------------------------------------------------------------------------
// Blanket implementations
// ----------------------------------------------------------------------------

impl<F> Sink for F
where
    F: Fn(&Response) + Send + Sync + 'static,
{
    #[inline]
    fn accept(&self, res: &Response) {
        self(res);
    }
}
