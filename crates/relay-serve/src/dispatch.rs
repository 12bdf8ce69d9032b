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

//! Dispatcher.

use std::sync::Arc;

use super::handler::{Error, Handler, Result, Stack};
use super::http::{Request, Response};
use super::middleware::Middleware;

mod builder;
mod responder;
mod sink;

pub use builder::Builder;
pub use responder::Responder;
pub use sink::{Printer, Sink};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Dispatcher.
///
/// The dispatcher drives each request through an ordered [`Stack`] of
/// middlewares. Every dispatch gets a fresh [`Responder`] holding a "200 OK"
/// response, which the middlewares share. The first middleware is invoked
/// with a continuation over the rest, and each middleware either ends the
/// response, or hands control on. If all middlewares hand control on, the
/// fallback handler answers, which is [`NotFound`][] unless configured.
///
/// Dispatching only requires shared access, and middlewares, handlers and
/// sinks must be thread-safe, so a dispatcher can serve concurrent dispatches,
/// each of which owns its response and continuation.
///
/// [`NotFound`]: crate::handler::NotFound
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use relay_serve::dispatch::{Dispatcher, Responder};
/// use relay_serve::handler::Next;
/// use relay_serve::http::{Request, Response, Status};
///
/// // Create dispatcher with middlewares
/// let dispatcher = Dispatcher::builder()
///     .with(|req: &Request, res: &mut Responder, next: Next<'_>| {
///         res.header("X-Powered-By", "relay")?;
///         next.run(req, res)
///     })
///     .with(|req: &Request, res: &mut Responder, next: Next<'_>| {
///         if req.target == "/hello" {
///             res.end("Hello")
///         } else {
///             next.run(req, res)
///         }
///     })
///     .sink(|_: &Response| {})
///     .build();
///
/// // Dispatch request
/// let res = dispatcher.dispatch(&Request::new().target("/hello"))?;
/// assert_eq!(res.status, Status::OK);
/// assert_eq!(res.body, b"Hello");
/// assert_eq!(res.headers.get("x-powered-by"), Some("relay"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Dispatcher {
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

impl Dispatcher {
    /// Creates a dispatcher.
    ///
    /// The dispatcher has no middlewares, answers with [`NotFound`][] and
    /// prints each response with [`Printer`].
    ///
    /// [`NotFound`]: crate::handler::NotFound
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Builder::new().build()
    }

    /// Creates a dispatcher builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_serve::dispatch::Dispatcher;
    ///
    /// // Create dispatcher builder
    /// let builder = Dispatcher::builder();
    /// ```
    #[inline]
    #[must_use]
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Adds a middleware.
    ///
    /// Middlewares run in the order in which they were added. Adding requires
    /// exclusive access, so the chain can't change while dispatching.
    pub fn add<M>(&mut self, middleware: M) -> &mut Self
    where
        M: Middleware,
    {
        self.stack.add(middleware);
        self
    }

    /// Dispatches the given request, returning the ended response.
    ///
    /// The response is handed to the sink when it is ended, which happens
    /// before this method returns.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Unresolved`], if control returned without
    /// the response being ended, which happens when a middleware neither ends
    /// the response nor hands control on. Errors raised by middlewares and
    /// usage errors of the [`Responder`] or continuation are propagated.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, fields(path = %req.target))
    )]
    pub fn dispatch(&self, req: &Request) -> Result<Response> {
        let mut res = Responder::with_sink(Arc::clone(&self.sink));
        self.stack.run(req, &mut res, self.fallback.as_ref())?;

        // Ensure the response was ended, or report the dispatch as hung
        if res.is_ended() {
            Ok(res.into_response())
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!("request left unresolved");
            Err(Error::Unresolved)
        }
    }
}

#[allow(clippy::must_use_candidate)]
impl Dispatcher {
    /// Returns the number of middlewares.
    #[inline]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Returns whether there are any middlewares.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Default for Dispatcher {
    /// Creates a dispatcher.
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::handler::{Error, Next, Result, NOT_FOUND_BODY};
    use crate::http::{Request, Response, Status};

    use super::{Dispatcher, Responder};

    type Trace = Arc<Mutex<Vec<String>>>;

    fn dispatcher(trace: &Trace) -> Dispatcher {
        let trace = Arc::clone(trace);
        Dispatcher::builder()
            .sink(move |res: &Response| {
                trace.lock().unwrap().push(format!("sink {}", res.text()));
            })
            .build()
    }

    fn pass(
        trace: &Trace, name: &'static str,
    ) -> impl Fn(&Request, &mut Responder, Next<'_>) -> Result + use<> {
        let trace = Arc::clone(trace);
        move |req: &Request, res: &mut Responder, next: Next<'_>| {
            trace.lock().unwrap().push(name.to_string());
            next.run(req, res)
        }
    }

    fn stall(_: &Request, _: &mut Responder, _: Next<'_>) -> Result {
        Ok(())
    }

    #[test]
    fn test_continue_then_end() {
        let trace = Trace::default();
        let mut dispatcher = dispatcher(&trace);
        dispatcher.add(pass(&trace, "A"));
        dispatcher.add({
            let trace = Arc::clone(&trace);
            move |_: &Request, res: &mut Responder, _: Next<'_>| {
                trace.lock().unwrap().push(String::from("B"));
                res.end("X")
            }
        });

        let res = dispatcher.dispatch(&Request::new()).unwrap();
        assert_eq!(res.status, Status::OK);
        assert_eq!(res.body, b"X");
        assert_eq!(*trace.lock().unwrap(), ["A", "B", "sink X"]);
    }

    #[test]
    fn test_empty_chain_falls_back() {
        let trace = Trace::default();
        let dispatcher = dispatcher(&trace);

        let res = dispatcher.dispatch(&Request::new()).unwrap();
        assert_eq!(res.status, Status::NOT_FOUND);
        assert_eq!(res.status.reason(), "Not Found");
        assert_eq!(res.body, NOT_FOUND_BODY.as_bytes());
        assert_eq!(trace.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_all_continue_falls_back_once() {
        let trace = Trace::default();
        let mut dispatcher = dispatcher(&trace);
        dispatcher.add(pass(&trace, "A"));
        dispatcher.add(pass(&trace, "B"));

        let res = dispatcher.dispatch(&Request::new()).unwrap();
        assert_eq!(res.status, Status::NOT_FOUND);
        assert_eq!(
            *trace.lock().unwrap(),
            ["A", "B", format!("sink {NOT_FOUND_BODY}").as_str()]
        );
    }

    #[test]
    fn test_end_stops_chain() {
        let trace = Trace::default();
        let mut dispatcher = dispatcher(&trace);
        dispatcher.add(|_: &Request, res: &mut Responder, _: Next<'_>| {
            res.end("only A")
        });
        dispatcher.add(pass(&trace, "B"));

        let res = dispatcher.dispatch(&Request::new()).unwrap();
        assert_eq!(res.body, b"only A");
        assert_eq!(*trace.lock().unwrap(), ["sink only A"]);
    }

    #[test]
    fn test_hung_dispatch_is_unresolved() {
        let trace = Trace::default();
        let mut dispatcher = dispatcher(&trace);
        dispatcher.add(|_: &Request, res: &mut Responder, _: Next<'_>| {
            res.status(Status::ACCEPTED).map(|_| ())
        });

        let err = dispatcher.dispatch(&Request::new()).unwrap_err();
        assert!(matches!(err, Error::Unresolved));
        assert!(err.is_usage());
        assert!(trace.lock().unwrap().is_empty());
    }

    #[test]
    fn test_end_then_continue_is_rejected() {
        let trace = Trace::default();
        let mut dispatcher = dispatcher(&trace);
        dispatcher.add(|req: &Request, res: &mut Responder, next: Next<'_>| {
            res.end("early")?;
            next.run(req, res)
        });
        dispatcher.add(pass(&trace, "B"));

        let err = dispatcher.dispatch(&Request::new()).unwrap_err();
        assert!(matches!(err, Error::ContinueAfterEnd));
        assert_eq!(*trace.lock().unwrap(), ["sink early"]);
    }

    #[test]
    fn test_end_after_unresolved_continue_is_rejected() {
        let trace = Trace::default();
        let mut dispatcher = dispatcher(&trace);
        dispatcher.add(|req: &Request, res: &mut Responder, next: Next<'_>| {
            next.run(req, res)?;
            res.end("late")
        });
        dispatcher.add(stall);

        let err = dispatcher.dispatch(&Request::new()).unwrap_err();
        assert!(matches!(err, Error::EndAfterContinue));
        assert!(err.is_usage());
        assert!(trace.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unresolved_continue_stays_unresolved() {
        let trace = Trace::default();
        let mut dispatcher = dispatcher(&trace);
        dispatcher.add(pass(&trace, "A"));
        dispatcher.add(stall);

        let err = dispatcher.dispatch(&Request::new()).unwrap_err();
        assert!(matches!(err, Error::Unresolved));
        assert_eq!(*trace.lock().unwrap(), ["A"]);
    }

    #[test]
    fn test_custom_fallback() {
        let dispatcher = Dispatcher::builder()
            .fallback(|_: &Request, res: &mut Responder| {
                res.status(Status::SERVICE_UNAVAILABLE)?;
                res.finish()
            })
            .sink(|_: &Response| {})
            .build();

        let res = dispatcher.dispatch(&Request::new()).unwrap();
        assert_eq!(res.status, Status::SERVICE_UNAVAILABLE);
        assert!(res.body.is_empty());
    }

    #[test]
    fn test_concurrent_dispatch() {
        let mut dispatcher = Dispatcher::builder()
            .sink(|_: &Response| {})
            .build();
        dispatcher.add(|req: &Request, res: &mut Responder, _: Next<'_>| {
            res.end(req.target.clone())
        });

        // Each dispatch owns its response
        std::thread::scope(|scope| {
            let handles = (0..8)
                .map(|n| {
                    let dispatcher = &dispatcher;
                    scope.spawn(move || {
                        let req = Request::new().target(format!("/{n}"));
                        dispatcher.dispatch(&req).unwrap()
                    })
                })
                .collect::<Vec<_>>();
            for (n, handle) in handles.into_iter().enumerate() {
                let res = handle.join().unwrap();
                assert_eq!(res.text(), format!("/{n}"));
            }
        });
    }
}
