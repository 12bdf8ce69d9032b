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

//! Responder.

use std::fmt;
use std::sync::Arc;

use crate::handler::{Error, Result};
use crate::http::{Response, Status};

use super::sink::Sink;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Responder.
///
/// A responder owns the [`Response`] of a single dispatch, and is shared by
/// all middlewares the request passes through. The response can be changed
/// until it is ended, which seals it and hands it to the [`Sink`] the
/// responder was created with. Any attempt to change or end the response
/// after that is reported as [`Error::Ended`]. Once control was handed on and
/// came back without the response being ended, the responder is frozen as
/// well, and changes are reported as [`Error::EndAfterContinue`].
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use relay_serve::dispatch::Responder;
/// use relay_serve::http::{Response, Status};
///
/// // Create responder and end response
/// let mut res = Responder::new(|res: &Response| {
///     assert_eq!(res.status, Status::CREATED);
/// });
/// res.status(Status::CREATED)?
///     .header("Content-Type", "text/plain")?;
/// res.end("Created")?;
///
/// // Ending twice is an error
/// assert!(res.end("Again").is_err());
/// # Ok(())
/// # }
/// ```
pub struct Responder {
    /// Response.
    response: Response,
    /// Sink accepting the response once ended.
    sink: Arc<dyn Sink>,
    /// Whether the response was ended.
    ended: bool,
    /// Whether control was handed on and returned unresolved.
    handed_on: bool,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Responder {
    /// Creates a responder with a "200 OK" response.
    pub fn new<S>(sink: S) -> Self
    where
        S: Sink,
    {
        Self::with_sink(Arc::new(sink))
    }

    /// Creates a responder from a shared sink.
    pub(crate) fn with_sink(sink: Arc<dyn Sink>) -> Self {
        Self {
            response: Response::new(),
            sink,
            ended: false,
            handed_on: false,
        }
    }

    /// Sets the status of the response.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Ended`], if the response was ended, and
    /// [`Error::EndAfterContinue`], if control was handed on before.
    pub fn status(&mut self, status: Status) -> Result<&mut Self> {
        self.ensure_open()?;
        self.response.status = status;
        Ok(self)
    }

    /// Sets a header of the response, replacing any previous value.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Ended`], if the response was ended, and
    /// [`Error::EndAfterContinue`], if control was handed on before.
    pub fn header<N, V>(&mut self, name: N, value: V) -> Result<&mut Self>
    where
        N: Into<String>,
        V: ToString,
    {
        self.ensure_open()?;
        self.response.headers.insert(name, value);
        Ok(self)
    }

    /// Sets the body of the response without ending it.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Ended`], if the response was ended, and
    /// [`Error::EndAfterContinue`], if control was handed on before.
    pub fn body<B>(&mut self, body: B) -> Result<&mut Self>
    where
        B: Into<Vec<u8>>,
    {
        self.ensure_open()?;
        self.response.body = body.into();
        Ok(self)
    }

    /// Ends the response with the given body.
    ///
    /// The body replaces whatever was set before. Afterwards, the response is
    /// sealed and handed to the sink.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Ended`], if the response was ended, and
    /// [`Error::EndAfterContinue`], if control was handed on before.
    pub fn end<B>(&mut self, body: B) -> Result
    where
        B: Into<Vec<u8>>,
    {
        self.ensure_open()?;
        self.response.body = body.into();
        self.seal();
        Ok(())
    }

    /// Ends the response, keeping the current body.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Ended`], if the response was ended, and
    /// [`Error::EndAfterContinue`], if control was handed on before.
    pub fn finish(&mut self) -> Result {
        self.ensure_open()?;
        self.seal();
        Ok(())
    }

    /// Consumes the responder and returns the response.
    #[inline]
    #[must_use]
    pub fn into_response(self) -> Response {
        self.response
    }

    /// Seals the response and hands it to the sink.
    fn seal(&mut self) {
        self.ended = true;

        // Notify sink, which happens exactly once per response
        #[cfg(feature = "tracing")]
        tracing::trace!(status = %self.response.status, "end");
        self.sink.accept(&self.response);
    }

    /// Marks that control was handed on and returned unresolved.
    pub(crate) fn hand_on(&mut self) {
        self.handed_on = true;
    }

    /// Ensures the response wasn't ended or handed on yet.
    fn ensure_open(&self) -> Result {
        if self.ended {
            Err(Error::Ended)
        } else if self.handed_on {
            Err(Error::EndAfterContinue)
        } else {
            Ok(())
        }
    }
}

#[allow(clippy::must_use_candidate)]
impl Responder {
    /// Returns whether the response was ended.
    #[inline]
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Returns a reference to the response.
    #[inline]
    pub fn response(&self) -> &Response {
        &self.response
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl fmt::Debug for Responder {
    /// Formats the responder for debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("response", &self.response)
            .field("ended", &self.ended)
            .field("handed_on", &self.handed_on)
            .finish_non_exhaustive()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::handler::Error;
    use crate::http::{Response, Status};

    use super::Responder;

    #[test]
    fn test_end_notifies_sink_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut res = Responder::new({
            let count = Arc::clone(&count);
            move |_: &Response| {
                count.fetch_add(1, Ordering::SeqCst);
            }
        });
        res.end("first").unwrap();
        assert!(matches!(res.end("second"), Err(Error::Ended)));
        assert!(matches!(res.finish(), Err(Error::Ended)));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(res.response().body, b"first");
    }

    #[test]
    fn test_mutation_after_end() {
        let mut res = Responder::new(|_: &Response| {});
        res.status(Status::NOT_FOUND).unwrap();
        res.finish().unwrap();
        assert!(matches!(res.status(Status::OK), Err(Error::Ended)));
        assert!(matches!(res.header("Host", "x"), Err(Error::Ended)));
        assert!(matches!(res.body("x"), Err(Error::Ended)));

        // Sealed response is unchanged
        let response = res.into_response();
        assert_eq!(response.status, Status::NOT_FOUND);
        assert!(response.headers.is_empty());
        assert!(response.body.is_empty());
    }

    #[test]
    fn test_mutation_after_hand_on() {
        let mut res = Responder::new(|_: &Response| {});
        res.hand_on();
        assert!(matches!(res.status(Status::OK), Err(Error::EndAfterContinue)));
        assert!(matches!(res.end("late"), Err(Error::EndAfterContinue)));
        assert!(matches!(res.finish(), Err(Error::EndAfterContinue)));
        assert!(!res.is_ended());
    }

    #[test]
    fn test_finish_keeps_body() {
        let mut res = Responder::new(|_: &Response| {});
        res.body("kept").unwrap().header("X-Trace", 1).unwrap();
        res.finish().unwrap();
        assert_eq!(res.response().body, b"kept");
        assert_eq!(res.response().headers.get("x-trace"), Some("1"));
    }
}
