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

//! Stack.

use crate::dispatch::Responder;
use crate::http::Request;
use crate::middleware::Middleware;

use super::{Error, Handler, Result};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Stack.
///
/// Stacks compose multiple middlewares into one, handing the request from one
/// middleware to the next through a continuation, until either a middleware
/// ends the response or no middleware is left, in which case the request is
/// handed to the fallback [`Handler`]. Middlewares run in the order in which
/// they were added.
///
/// Any implementor of [`Middleware`] can be added to the stack, which includes
/// [`Stack`] itself. When a nested stack runs out of middlewares, it resumes
/// the enclosing stack with the continuation it was given.
///
/// It's middlewares all the way down.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use relay_serve::dispatch::Responder;
/// use relay_serve::handler::{Next, NotFound, Stack};
/// use relay_serve::http::{Request, Response, Status};
///
/// // Create stack with middleware
/// let stack = Stack::new()
///     .with(|req: &Request, res: &mut Responder, next: Next<'_>| {
///         if req.target == "/coffee" {
///             res.status(Status::IM_A_TEAPOT)?;
///             res.end("")
///         } else {
///             next.run(req, res)
///         }
///     });
///
/// // Run stack with request
/// let req = Request::new().target("/coffee");
/// let mut res = Responder::new(|_: &Response| {});
/// stack.run(&req, &mut res, &NotFound)?;
/// assert_eq!(res.response().status, Status::IM_A_TEAPOT);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Stack {
    /// Middlewares.
    middlewares: Vec<Box<dyn Middleware>>,
}

/// Continuation.
///
/// The continuation keeps track of all middlewares that haven't been invoked
/// yet, i.e., are next in line to be called, and of what to resume with once
/// no middleware is left, which is either the fallback handler, or the
/// continuation of an enclosing stack. It is consumed when run, so control
/// can be handed on at most once.
pub struct Next<'a> {
    /// Remaining middlewares.
    middlewares: &'a [Box<dyn Middleware>],
    /// What to resume with when no middleware is left.
    tail: Tail<'a>,
}

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// End of a continuation.
enum Tail<'a> {
    /// Fallback handler.
    Handler(&'a dyn Handler),
    /// Continuation of the enclosing stack.
    Next(Box<Next<'a>>),
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Stack {
    /// Creates a stack.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_serve::handler::Stack;
    ///
    /// // Create stack
    /// let stack = Stack::new();
    /// assert!(stack.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a middleware to the stack, consuming and returning it.
    #[inline]
    #[must_use]
    pub fn with<M>(mut self, middleware: M) -> Self
    where
        M: Middleware,
    {
        self.add(middleware);
        self
    }

    /// Adds a middleware to the stack.
    ///
    /// The middleware is appended after all middlewares added before, and will
    /// only run once the previous middleware handed control on. Since adding
    /// requires exclusive access, a stack can't be changed while a request is
    /// being dispatched through it.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_serve::dispatch::Responder;
    /// use relay_serve::handler::{Next, Stack};
    /// use relay_serve::http::Request;
    ///
    /// // Create stack and add middleware
    /// let mut stack = Stack::new();
    /// stack.add(|req: &Request, res: &mut Responder, next: Next<'_>| {
    ///     next.run(req, res)
    /// });
    /// assert_eq!(stack.len(), 1);
    /// ```
    pub fn add<M>(&mut self, middleware: M) -> &mut Self
    where
        M: Middleware,
    {
        self.middlewares.push(Box::new(middleware));
        self
    }

    /// Runs the given request through the stack.
    ///
    /// The first middleware is invoked with a continuation over the remaining
    /// middlewares, and if all of them hand control on, the request ends up
    /// with the given fallback handler.
    ///
    /// # Errors
    ///
    /// This method returns any error raised by one of the middlewares or the
    /// fallback handler, including usage errors of the [`Responder`] or the
    /// continuation.
    pub fn run(
        &self, req: &Request, res: &mut Responder, fallback: &dyn Handler,
    ) -> Result {
        let next = Next {
            middlewares: &self.middlewares,
            tail: Tail::Handler(fallback),
        };
        next.run(req, res)
    }
}

#[allow(clippy::must_use_candidate)]
impl Stack {
    /// Returns the number of middlewares.
    #[inline]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Returns whether there are any middlewares.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

// ----------------------------------------------------------------------------

impl Next<'_> {
    /// Hands control to the next middleware.
    ///
    /// If no middleware is left, the request is handed to whatever the chain
    /// resumes with, which is the fallback handler for the outermost stack.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::ContinueAfterEnd`], if the response was
    /// already ended, and any error raised further down the chain. If control
    /// returns without the response being ended, the [`Responder`] rejects
    /// further changes with [`Error::EndAfterContinue`].
    pub fn run(self, req: &Request, res: &mut Responder) -> Result {
        if res.is_ended() {
            return Err(Error::ContinueAfterEnd);
        }

        // Invoke the next middleware, or resume when none is left
        let result = match self.middlewares {
            [] => match self.tail {
                Tail::Handler(handler) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(path = %req.target, "fallback");
                    handler.handle(req, res)
                }
                Tail::Next(next) => next.run(req, res),
            },
            [middleware, middlewares @ ..] => {
                #[cfg(feature = "tracing")]
                tracing::trace!(remaining = middlewares.len(), "middleware");
                let next = Next { middlewares, tail: self.tail };
                middleware.process(req, res, next)
            }
        };

        // Freeze the response, so earlier middlewares can't resolve it late
        if !res.is_ended() {
            res.hand_on();
        }
        result
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Middleware for Stack {
    /// Processes the given request.
    ///
    /// This method runs the request through the middlewares of the stack,
    /// and resumes with the given continuation once none is left.
    fn process(
        &self, req: &Request, res: &mut Responder, next: Next<'_>,
    ) -> Result {
        let next = Next {
            middlewares: &self.middlewares,
            tail: Tail::Next(Box::new(next)),
        };
        next.run(req, res)
    }
}

// ----------------------------------------------------------------------------

impl FromIterator<Box<dyn Middleware>> for Stack {
    /// Creates a stack from an iterator.
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Box<dyn Middleware>>,
    {
        Self { middlewares: Vec::from_iter(iter) }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::dispatch::Responder;
    use crate::handler::{Error, Next, NotFound, Result, NOT_FOUND_BODY};
    use crate::http::{Request, Response, Status};

    use super::Stack;

    type Trace = Arc<Mutex<Vec<&'static str>>>;

    fn pass(
        trace: &Trace, name: &'static str,
    ) -> impl Fn(&Request, &mut Responder, Next<'_>) -> Result + use<> {
        let trace = Arc::clone(trace);
        move |req: &Request, res: &mut Responder, next: Next<'_>| {
            trace.lock().unwrap().push(name);
            next.run(req, res)
        }
    }

    fn end(
        trace: &Trace, name: &'static str,
    ) -> impl Fn(&Request, &mut Responder, Next<'_>) -> Result + use<> {
        let trace = Arc::clone(trace);
        move |_: &Request, res: &mut Responder, _: Next<'_>| {
            trace.lock().unwrap().push(name);
            res.end(name)
        }
    }

    #[test]
    fn test_nested_stack_resumes_outer() {
        let trace = Trace::default();
        let inner = Stack::new()
            .with(pass(&trace, "inner a"))
            .with(pass(&trace, "inner b"));
        let stack = Stack::new()
            .with(pass(&trace, "outer a"))
            .with(inner)
            .with(end(&trace, "outer b"));

        let req = Request::new();
        let mut res = Responder::new(|_: &Response| {});
        stack.run(&req, &mut res, &NotFound).unwrap();
        assert_eq!(res.response().body, b"outer b");
        assert_eq!(
            *trace.lock().unwrap(),
            ["outer a", "inner a", "inner b", "outer b"]
        );
    }

    #[test]
    fn test_nested_stack_ends_early() {
        let trace = Trace::default();
        let inner = Stack::new().with(end(&trace, "inner"));
        let stack = Stack::new()
            .with(inner)
            .with(end(&trace, "outer"));

        let req = Request::new();
        let mut res = Responder::new(|_: &Response| {});
        stack.run(&req, &mut res, &NotFound).unwrap();
        assert_eq!(*trace.lock().unwrap(), ["inner"]);
    }

    #[test]
    fn test_empty_nested_stack_falls_through() {
        let stack = Stack::new().with(Stack::new());

        let req = Request::new();
        let mut res = Responder::new(|_: &Response| {});
        stack.run(&req, &mut res, &NotFound).unwrap();
        assert_eq!(res.response().status, Status::NOT_FOUND);
        assert_eq!(res.response().body, NOT_FOUND_BODY.as_bytes());
    }

    #[test]
    fn test_continue_after_end() {
        let stack = Stack::new()
            .with(|req: &Request, res: &mut Responder, next: Next<'_>| {
                res.end("done")?;
                next.run(req, res)
            });

        let req = Request::new();
        let mut res = Responder::new(|_: &Response| {});
        let err = stack.run(&req, &mut res, &NotFound).unwrap_err();
        assert!(matches!(err, Error::ContinueAfterEnd));
        assert_eq!(res.response().body, b"done");
    }

    #[test]
    fn test_end_after_unresolved_continue() {
        let stack = Stack::new()
            .with(|req: &Request, res: &mut Responder, next: Next<'_>| {
                next.run(req, res)?;
                res.end("late")
            })
            .with(|_: &Request, _: &mut Responder, _: Next<'_>| -> Result {
                Ok(())
            });

        let req = Request::new();
        let mut res = Responder::new(|_: &Response| {});
        let err = stack.run(&req, &mut res, &NotFound).unwrap_err();
        assert!(matches!(err, Error::EndAfterContinue));
        assert!(!res.is_ended());
    }

    #[test]
    fn test_handler_error_propagates() {
        let trace = Trace::default();
        let stack = Stack::new()
            .with(pass(&trace, "a"))
            .with(|_: &Request, _: &mut Responder, _: Next<'_>| -> Result {
                Err(Error::handler("boom"))
            })
            .with(end(&trace, "c"));

        let req = Request::new();
        let mut res = Responder::new(|_: &Response| {});
        let err = stack.run(&req, &mut res, &NotFound).unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(!res.is_ended());
        assert_eq!(*trace.lock().unwrap(), ["a"]);
    }
}
