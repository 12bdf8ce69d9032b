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

//! Request assembler.

use relay_emit::{Emitter, Token};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::http::{Headers, Request};

use super::event::{Message, MessageKind};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Event kinds the assembler subscribes to.
const KINDS: [MessageKind; 6] = [
    MessageKind::MessageBegin,
    MessageKind::Url,
    MessageKind::HeaderField,
    MessageKind::HeaderValue,
    MessageKind::Body,
    MessageKind::MessageComplete,
];

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Request assembler.
///
/// The assembler subscribes to the events of a [`Parser`][] and rebuilds a
/// [`Request`] from each message, which becomes available once the message
/// is complete. Headers that occur more than once are joined, and trailers
/// of chunked messages are added to the headers.
///
/// [`Parser`]: crate::parser::Parser
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use relay_serve::parser::{Assembler, Kind, Parser};
///
/// // Create parser and attach assembler
/// let mut parser = Parser::new(Kind::Request);
/// let assembler = Assembler::attach(parser.emitter());
///
/// // Receive request
/// parser.receive(b"GET /handler2 HTTP/1.1\r\nHost: localhost\r\n\r\n")?;
/// let req = assembler.pop().unwrap();
/// assert_eq!(req.target, "/handler2");
/// assert_eq!(req.headers.get("host"), Some("localhost"));
/// assert_eq!(req.body, None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Assembler {
    /// Assembly state, shared with the subscriptions.
    state: Rc<RefCell<State>>,
    /// Subscription tokens.
    tokens: Vec<(MessageKind, Token)>,
}

/// Assembly state.
#[derive(Debug, Default)]
struct State {
    /// Request in progress.
    request: Option<Request>,
    /// Name of the header in progress.
    field: Option<String>,
    /// Completed requests.
    complete: VecDeque<Request>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Assembler {
    /// Creates an assembler subscribed to the given emitter.
    #[must_use]
    pub fn attach(emitter: &Emitter<Message>) -> Self {
        let state = Rc::new(RefCell::new(State::default()));
        let tokens = KINDS
            .into_iter()
            .map(|kind| {
                let state = Rc::clone(&state);
                let token = emitter.on(kind, move |message: &Message| {
                    state.borrow_mut().handle(message);
                });
                (kind, token)
            })
            .collect();
        Self { state, tokens }
    }

    /// Removes and returns the oldest completed request.
    #[must_use]
    pub fn pop(&self) -> Option<Request> {
        self.state.borrow_mut().complete.pop_front()
    }

    /// Removes and returns all completed requests, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Request> {
        self.state.borrow_mut().complete.drain(..).collect()
    }

    /// Unsubscribes the assembler from the given emitter.
    ///
    /// Requests that were completed but not yet taken are dropped.
    pub fn detach(self, emitter: &Emitter<Message>) {
        for (kind, token) in self.tokens {
            emitter.off(kind, token);
        }
    }
}

#[allow(clippy::must_use_candidate)]
impl Assembler {
    /// Returns the number of completed requests.
    #[inline]
    pub fn len(&self) -> usize {
        self.state.borrow().complete.len()
    }

    /// Returns whether there are any completed requests.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().complete.is_empty()
    }
}

// ----------------------------------------------------------------------------

impl State {
    /// Handles the given event.
    fn handle(&mut self, message: &Message) {
        match message {
            Message::MessageBegin => {
                self.field = None;
                self.request = Some(Request {
                    target: String::new(),
                    headers: Headers::new(),
                    body: None,
                });
            }
            Message::Url(url) => {
                if let Some(req) = &mut self.request {
                    req.target.push_str(url);
                }
            }
            Message::HeaderField(name) => {
                self.field = Some(name.clone());
            }
            Message::HeaderValue(value) => {
                if let (Some(req), Some(name)) = (&mut self.request, &self.field)
                {
                    req.headers.append(name.as_str(), value);
                }
            }
            Message::Body(bytes) => {
                if let Some(req) = &mut self.request {
                    let body = req.body.get_or_insert_with(Vec::new);
                    body.extend_from_slice(bytes);
                }
            }
            Message::MessageComplete => {
                self.field = None;
                if let Some(req) = self.request.take() {
                    self.complete.push_back(req);
                }
            }
            _ => {}
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::dispatch::{Dispatcher, Responder};
    use crate::handler::Next;
    use crate::http::{Request, Response, Status};
    use crate::parser::{Kind, MessageKind, Parser};

    use super::Assembler;

    #[test]
    fn test_pipelined_requests() {
        let mut parser = Parser::new(Kind::Request);
        let assembler = Assembler::attach(parser.emitter());
        let input = b"POST /a HTTP/1.1\r\n\
            Accept: text/plain\r\n\
            accept: text/html\r\n\
            Content-Length: 2\r\n\
            \r\n\
            hiGET /b HTTP/1.1\r\n\
            \r\n";
        assert_eq!(parser.receive(input).unwrap(), 2);

        let requests = assembler.drain();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].target, "/a");
        assert_eq!(
            requests[0].headers.get("ACCEPT"),
            Some("text/plain, text/html")
        );
        assert_eq!(requests[0].body.as_deref(), Some(&b"hi"[..]));
        assert_eq!(requests[1].target, "/b");
        assert!(assembler.is_empty());
    }

    #[test]
    fn test_chunked_request() {
        let mut parser = Parser::new(Kind::Request);
        let assembler = Assembler::attach(parser.emitter());
        let input = b"POST / HTTP/1.1\r\n\
            Transfer-Encoding: chunked\r\n\
            \r\n\
            3\r\nabc\r\n\
            0\r\n\
            Checksum: 42\r\n\
            \r\n";
        parser.receive(input).unwrap();

        let req = assembler.pop().unwrap();
        assert_eq!(req.body.as_deref(), Some(&b"abc"[..]));
        assert_eq!(req.headers.get("checksum"), Some("42"));
    }

    #[test]
    fn test_detach() {
        let mut parser = Parser::new(Kind::Request);
        let assembler = Assembler::attach(parser.emitter());
        assert_eq!(parser.emitter().listeners(MessageKind::Url), 1);
        assembler.detach(parser.emitter());
        assert_eq!(parser.emitter().listeners(MessageKind::Url), 0);
        assert_eq!(parser.receive(b"GET / HTTP/1.1\r\n\r\n").unwrap(), 1);
    }

    #[test]
    fn test_dispatch_assembled() {
        let mut parser = Parser::new(Kind::Request);
        let assembler = Assembler::attach(parser.emitter());
        let dispatcher = Dispatcher::builder()
            .with(|req: &Request, res: &mut Responder, next: Next<'_>| {
                if req.target == "/echo" {
                    res.end(req.body.clone().unwrap_or_default())
                } else {
                    next.run(req, res)
                }
            })
            .sink(|_: &Response| {})
            .build();

        // Receive and dispatch requests
        let input = b"PUT /echo HTTP/1.1\r\n\
            Content-Length: 4\r\n\
            \r\n\
            pingGET /missing HTTP/1.1\r\n\
            \r\n";
        parser.receive(input).unwrap();
        let responses: Vec<_> = assembler
            .drain()
            .iter()
            .map(|req| dispatcher.dispatch(req).unwrap())
            .collect();
        assert_eq!(responses[0].status, Status::OK);
        assert_eq!(responses[0].body, b"ping");
        assert_eq!(responses[1].status, Status::NOT_FOUND);
    }
}
