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

//! HTTP parser.
//!
//! The parser turns a stream of raw bytes into [`Message`] events, which are
//! published through an [`Emitter`] as soon as the corresponding part of the
//! message is complete. Message heads are parsed with [`httparse`], bodies
//! are framed by `Content-Length` or chunked `Transfer-Encoding`, and are
//! published as raw bytes without any decoding.

use relay_emit::Emitter;
use std::str;

mod assembler;
mod error;
mod event;

pub use assembler::Assembler;
pub use error::{Error, Result};
pub use event::{Message, MessageKind};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Maximum number of headers per message.
const MAX_HEADERS: usize = 64;

/// Maximum size of a message head in bytes.
const MAX_HEAD_SIZE: usize = 64 * 1024;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Parser kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Kind {
    /// Parse requests.
    #[default]
    Request,
    /// Parse responses.
    Response,
    /// Parse requests and responses, deciding per message.
    Both,
}

/// Parser state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Waiting for a message head.
    Head,
    /// Reading a body with the given number of bytes left.
    Body(usize),
    /// Waiting for a chunk size line.
    Size,
    /// Reading a chunk with the given number of bytes left.
    Chunk(usize),
    /// Waiting for the line break after a chunk.
    ChunkEnd,
    /// Reading trailers after the last chunk.
    Trailer,
    /// Reading a body until the input ends.
    Close,
}

/// Body framing, as determined by the message head.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Framing {
    /// No body.
    None,
    /// Body of fixed length.
    Length(usize),
    /// Chunked body.
    Chunked,
    /// Body delimited by the end of the input.
    Close,
}

/// Progress of a single parser step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Progress {
    /// More input is needed.
    Pending,
    /// Step succeeded, parsing can continue.
    Continue,
    /// Step completed a message.
    Complete,
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP parser.
///
/// The parser owns an [`Emitter`] for [`Message`] events, which is exposed
/// through [`Parser::emitter`], so any number of subscribers can follow the
/// stream of messages. Input can be handed to [`Parser::receive`] in slices
/// of arbitrary size, as the parser buffers everything that can't be
/// published yet. After an error, the parser should be discarded.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use relay_serve::parser::{Kind, Message, MessageKind, Parser};
///
/// // Create parser and collect request targets
/// let mut parser = Parser::new(Kind::Request);
/// let targets = Rc::new(RefCell::new(Vec::new()));
/// parser.emitter().on(MessageKind::Url, {
///     let targets = Rc::clone(&targets);
///     move |message: &Message| {
///         if let Message::Url(url) = message {
///             targets.borrow_mut().push(url.clone());
///         }
///     }
/// });
///
/// // Receive request in two parts
/// assert_eq!(parser.receive(b"GET /handler1 HTT")?, 0);
/// assert_eq!(parser.receive(b"P/1.1\r\nHost: localhost\r\n\r\n")?, 1);
/// assert_eq!(*targets.borrow(), ["/handler1"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Parser {
    /// Parser kind.
    kind: Kind,
    /// Event emitter.
    emitter: Emitter<Message>,
    /// Input that wasn't published yet.
    buffer: Vec<u8>,
    /// Parser state.
    state: State,
}

/// Parsed message head.
struct Head {
    /// Length of the head in bytes.
    len: usize,
    /// Start line event.
    start: Message,
    /// Header names and values.
    headers: Vec<(String, String)>,
    /// Body framing.
    framing: Framing,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Parser {
    /// Creates a parser.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_serve::parser::{Kind, Parser};
    ///
    /// // Create parser
    /// let parser = Parser::new(Kind::Request);
    /// ```
    #[must_use]
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            emitter: Emitter::new(),
            buffer: Vec::new(),
            state: State::Head,
        }
    }

    /// Receives the given bytes, and returns the number of messages completed.
    ///
    /// All events that can be derived from the input received so far are
    /// published before this method returns.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Parse`], if a message head is malformed,
    /// [`Error::InvalidLength`] and [`Error::InvalidChunk`] for malformed
    /// body framing, [`Error::Utf8`] for header values that are not valid
    /// UTF-8, and [`Error::HeadTooLarge`] if a head exceeds 64 KiB.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all, fields(len = bytes.len()))
    )]
    pub fn receive(&mut self, bytes: &[u8]) -> Result<usize> {
        self.buffer.extend_from_slice(bytes);

        // Advance until more input is needed
        let mut complete = 0;
        loop {
            match self.advance()? {
                Progress::Pending => break,
                Progress::Continue => {}
                Progress::Complete => complete += 1,
            }
        }
        Ok(complete)
    }

    /// Signals the end of the input.
    ///
    /// Responses without explicit framing are delimited by the end of the
    /// input, so they're only completed here.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Incomplete`], if the input ended in the
    /// middle of a message.
    pub fn finish(&mut self) -> Result {
        match self.state {
            State::Close => {
                if !self.buffer.is_empty() {
                    self.body(self.buffer.len());
                }
                self.complete();
                Ok(())
            }
            State::Head if self.buffer.iter().all(u8::is_ascii_whitespace) => {
                self.buffer.clear();
                Ok(())
            }
            _ => Err(Error::Incomplete),
        }
    }

    /// Performs a single parser step.
    fn advance(&mut self) -> Result<Progress> {
        match self.state {
            State::Head => self.head(),

            // Read body of fixed length
            State::Body(0) => Ok(self.complete()),
            State::Body(remaining) => {
                let n = remaining.min(self.buffer.len());
                if n == 0 {
                    return Ok(Progress::Pending);
                }
                self.body(n);
                self.state = State::Body(remaining - n);
                Ok(Progress::Continue)
            }

            // Read chunk size line, where a size of zero marks the last chunk
            State::Size => match httparse::parse_chunk_size(&self.buffer) {
                Ok(httparse::Status::Partial) => Ok(Progress::Pending),
                Ok(httparse::Status::Complete((n, size))) => {
                    let size = usize::try_from(size)
                        .map_err(|_| Error::InvalidChunk)?;
                    self.buffer.drain(..n);
                    self.emit(Message::ChunkHeader);
                    self.state = match size {
                        0 => State::Trailer,
                        _ => State::Chunk(size),
                    };
                    Ok(Progress::Continue)
                }
                Err(_) => Err(Error::InvalidChunk),
            },

            // Read chunk data
            State::Chunk(0) => {
                self.state = State::ChunkEnd;
                Ok(Progress::Continue)
            }
            State::Chunk(remaining) => {
                let n = remaining.min(self.buffer.len());
                if n == 0 {
                    return Ok(Progress::Pending);
                }
                self.body(n);
                self.state = State::Chunk(remaining - n);
                Ok(Progress::Continue)
            }

            // Read line break terminating chunk data
            State::ChunkEnd => {
                if self.buffer.len() < 2 {
                    return Ok(Progress::Pending);
                }
                if !self.buffer.starts_with(b"\r\n") {
                    return Err(Error::InvalidChunk);
                }
                self.buffer.drain(..2);
                self.emit(Message::ChunkComplete);
                self.state = State::Size;
                Ok(Progress::Continue)
            }

            // Read trailers, which are published like headers
            State::Trailer => {
                let Some(pos) = find_line(&self.buffer) else {
                    return Ok(Progress::Pending);
                };
                if pos == 0 {
                    self.buffer.drain(..2);
                    self.emit(Message::ChunkComplete);
                    return Ok(self.complete());
                }
                let (name, value) = parse_trailer(&self.buffer[..pos])?;
                self.buffer.drain(..pos + 2);
                self.emit(Message::HeaderField(name));
                self.emit(Message::HeaderValue(value));
                Ok(Progress::Continue)
            }

            // Read body until the input ends
            State::Close => {
                if !self.buffer.is_empty() {
                    self.body(self.buffer.len());
                }
                Ok(Progress::Pending)
            }
        }
    }

    /// Parses a message head, if the input contains a complete one.
    fn head(&mut self) -> Result<Progress> {
        let iter = self.buffer.iter();
        let skip = iter.take_while(|b| matches!(b, b'\r' | b'\n')).count();
        self.buffer.drain(..skip);
        if self.buffer.is_empty() {
            return Ok(Progress::Pending);
        }

        // Determine message type, and parse head accordingly
        let head = match self.kind {
            Kind::Request => parse_request(&self.buffer)?,
            Kind::Response => parse_response(&self.buffer)?,
            Kind::Both => {
                let prefix = &self.buffer[..self.buffer.len().min(5)];
                if prefix.len() < 5 && b"HTTP/".starts_with(prefix) {
                    return Ok(Progress::Pending);
                }
                if prefix == b"HTTP/" {
                    parse_response(&self.buffer)?
                } else {
                    parse_request(&self.buffer)?
                }
            }
        };
        let Some(head) = head else {
            return if self.buffer.len() > MAX_HEAD_SIZE {
                Err(Error::HeadTooLarge)
            } else {
                Ok(Progress::Pending)
            };
        };

        // Publish head, and continue with the body
        self.buffer.drain(..head.len);
        self.emit(Message::MessageBegin);
        self.emit(head.start);
        for (name, value) in head.headers {
            self.emit(Message::HeaderField(name));
            self.emit(Message::HeaderValue(value));
        }
        self.emit(Message::HeadersComplete);
        self.state = match head.framing {
            Framing::None => return Ok(self.complete()),
            Framing::Length(len) => State::Body(len),
            Framing::Chunked => State::Size,
            Framing::Close => State::Close,
        };
        Ok(Progress::Continue)
    }

    /// Publishes the given number of buffered bytes as body.
    fn body(&mut self, n: usize) {
        let bytes = self.buffer.drain(..n).collect();
        self.emit(Message::Body(bytes));
    }

    /// Completes the current message.
    fn complete(&mut self) -> Progress {
        self.state = State::Head;
        self.emit(Message::MessageComplete);
        Progress::Complete
    }

    /// Publishes the given event.
    fn emit(&self, message: Message) {
        self.emitter.emit(&message);
    }
}

#[allow(clippy::must_use_candidate)]
impl Parser {
    /// Returns the parser kind.
    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns the event emitter.
    #[inline]
    pub fn emitter(&self) -> &Emitter<Message> {
        &self.emitter
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Parses a request head.
fn parse_request(buffer: &[u8]) -> Result<Option<Head>> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut headers);
    let httparse::Status::Complete(len) = req.parse(buffer)? else {
        return Ok(None);
    };

    // Requests only have a body if they announce one
    let headers = collect(req.headers)?;
    let framing = framing(&headers)?.unwrap_or(Framing::None);
    let target = req.path.unwrap_or_default().to_string();
    Ok(Some(Head {
        len,
        start: Message::Url(target),
        headers,
        framing,
    }))
}

/// Parses a response head.
fn parse_response(buffer: &[u8]) -> Result<Option<Head>> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut res = httparse::Response::new(&mut headers);
    let httparse::Status::Complete(len) = res.parse(buffer)? else {
        return Ok(None);
    };

    // Informational responses, "204 No Content" and "304 Not Modified" never
    // have a body, and responses without framing are delimited by the input
    let headers = collect(res.headers)?;
    let code = res.code.unwrap_or_default();
    let framing = if (100..200).contains(&code) || code == 204 || code == 304 {
        Framing::None
    } else {
        framing(&headers)?.unwrap_or(Framing::Close)
    };
    let reason = res.reason.unwrap_or_default().to_string();
    Ok(Some(Head {
        len,
        start: Message::Status(reason),
        headers,
        framing,
    }))
}

/// Collects the given headers into owned names and values.
fn collect(
    headers: &[httparse::Header<'_>],
) -> Result<Vec<(String, String)>> {
    let iter = headers.iter().map(|header| {
        let value = str::from_utf8(header.value)?;
        Ok((header.name.to_string(), value.to_string()))
    });
    iter.collect()
}

/// Determines the body framing from the given headers, if announced.
///
/// Chunked transfer coding takes precedence over a content length. Multiple
/// content lengths are accepted as long as they agree.
fn framing(headers: &[(String, String)]) -> Result<Option<Framing>> {
    let codings = headers
        .iter()
        .filter(|(name, _)| name.eq_ignore_ascii_case("transfer-encoding"))
        .flat_map(|(_, value)| value.split(','));
    if codings
        .last()
        .is_some_and(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
    {
        return Ok(Some(Framing::Chunked));
    }

    // Ensure all content lengths are valid and agree with each other
    let mut length = None;
    let values = headers
        .iter()
        .filter(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .flat_map(|(_, value)| value.split(','));
    for value in values {
        let value = value.trim();
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidLength);
        }
        let n = value.parse::<usize>().map_err(|_| Error::InvalidLength)?;
        if length.is_some_and(|len| len != n) {
            return Err(Error::InvalidLength);
        }
        length = Some(n);
    }
    Ok(length.map(Framing::Length))
}

/// Returns the position of the first line break, if any.
fn find_line(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|window| window == b"\r\n")
}

/// Parses a trailer line into name and value.
fn parse_trailer(line: &[u8]) -> Result<(String, String)> {
    let line = str::from_utf8(line)?;
    let Some((name, value)) = line.split_once(':') else {
        return Err(Error::InvalidChunk);
    };
    Ok((name.trim().to_string(), value.trim().to_string()))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    type Log = Rc<RefCell<Vec<Message>>>;

    const KINDS: [MessageKind; 10] = [
        MessageKind::MessageBegin,
        MessageKind::Url,
        MessageKind::Status,
        MessageKind::HeaderField,
        MessageKind::HeaderValue,
        MessageKind::HeadersComplete,
        MessageKind::Body,
        MessageKind::MessageComplete,
        MessageKind::ChunkHeader,
        MessageKind::ChunkComplete,
    ];

    fn record(parser: &Parser) -> Log {
        let log = Log::default();
        for kind in KINDS {
            let log = Rc::clone(&log);
            parser.emitter().on(kind, move |message: &Message| {
                log.borrow_mut().push(message.clone());
            });
        }
        log
    }

    fn field(name: &str) -> Message {
        Message::HeaderField(name.to_string())
    }

    fn value(value: &str) -> Message {
        Message::HeaderValue(value.to_string())
    }

    #[test]
    fn test_content_length() {
        let mut parser = Parser::new(Kind::Request);
        let log = record(&parser);
        let input = b"POST /submit HTTP/1.1\r\n\
            Host: localhost\r\n\
            Content-Length: 5\r\n\
            \r\n\
            hello";
        assert_eq!(parser.receive(input).unwrap(), 1);
        assert_eq!(
            *log.borrow(),
            [
                Message::MessageBegin,
                Message::Url(String::from("/submit")),
                field("Host"),
                value("localhost"),
                field("Content-Length"),
                value("5"),
                Message::HeadersComplete,
                Message::Body(b"hello".to_vec()),
                Message::MessageComplete,
            ]
        );
    }

    #[test]
    fn test_byte_by_byte() {
        let mut parser = Parser::new(Kind::Request);
        let log = record(&parser);
        let input = b"PUT / HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc";
        let mut complete = 0;
        for byte in input {
            complete += parser.receive(&[*byte]).unwrap();
        }
        assert_eq!(complete, 1);

        // Body arrives in pieces, but adds up
        let body: Vec<u8> = log
            .borrow()
            .iter()
            .filter_map(|message| match message {
                Message::Body(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .flatten()
            .collect();
        assert_eq!(body, b"abc");
        assert_eq!(log.borrow().last(), Some(&Message::MessageComplete));
    }

    #[test]
    fn test_chunked() {
        let mut parser = Parser::new(Kind::Request);
        let log = record(&parser);
        let input = b"POST / HTTP/1.1\r\n\
            Transfer-Encoding: chunked\r\n\
            \r\n\
            5\r\nhello\r\n\
            6\r\n world\r\n\
            0\r\n\
            Expires: never\r\n\
            \r\n";
        assert_eq!(parser.receive(input).unwrap(), 1);
        assert_eq!(
            log.borrow()[5..],
            [
                Message::ChunkHeader,
                Message::Body(b"hello".to_vec()),
                Message::ChunkComplete,
                Message::ChunkHeader,
                Message::Body(b" world".to_vec()),
                Message::ChunkComplete,
                Message::ChunkHeader,
                field("Expires"),
                value("never"),
                Message::ChunkComplete,
                Message::MessageComplete,
            ]
        );
    }

    #[test]
    fn test_pipelined() {
        let mut parser = Parser::new(Kind::Request);
        let input = b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n";
        assert_eq!(parser.receive(input).unwrap(), 2);
        assert!(parser.finish().is_ok());
    }

    #[test]
    fn test_response_until_close() {
        let mut parser = Parser::new(Kind::Both);
        let log = record(&parser);
        let input = b"HTTP/1.1 200 OK\r\nServer: relay\r\n\r\npartial";
        assert_eq!(parser.receive(input).unwrap(), 0);
        parser.finish().unwrap();
        assert_eq!(
            *log.borrow(),
            [
                Message::MessageBegin,
                Message::Status(String::from("OK")),
                field("Server"),
                value("relay"),
                Message::HeadersComplete,
                Message::Body(b"partial".to_vec()),
                Message::MessageComplete,
            ]
        );
    }

    #[test]
    fn test_response_without_body() {
        let mut parser = Parser::new(Kind::Response);
        let input = b"HTTP/1.1 204 No Content\r\n\r\n";
        assert_eq!(parser.receive(input).unwrap(), 1);
    }

    #[test]
    fn test_both_waits_for_prefix() {
        let mut parser = Parser::new(Kind::Both);
        let log = record(&parser);
        assert_eq!(parser.receive(b"HTT").unwrap(), 0);
        assert!(log.borrow().is_empty());
        assert_eq!(parser.receive(b"P/1.1 404 Not Found\r\n").unwrap(), 0);
        assert_eq!(parser.receive(b"Content-Length: 0\r\n\r\n").unwrap(), 1);
        assert!(log.borrow().contains(&Message::Status(String::from("Not Found"))));
    }

    #[test]
    fn test_invalid_length() {
        let mut parser = Parser::new(Kind::Request);
        let input = b"POST / HTTP/1.1\r\nContent-Length: abc\r\n\r\n";
        let err = parser.receive(input).unwrap_err();
        assert!(matches!(err, Error::InvalidLength));
    }

    #[test]
    fn test_conflicting_length() {
        let mut parser = Parser::new(Kind::Request);
        let input = b"POST / HTTP/1.1\r\n\
            Content-Length: 3\r\n\
            Content-Length: 4\r\n\
            \r\n";
        let err = parser.receive(input).unwrap_err();
        assert!(matches!(err, Error::InvalidLength));
    }

    #[test]
    fn test_invalid_chunk() {
        let mut parser = Parser::new(Kind::Request);
        let input = b"POST / HTTP/1.1\r\n\
            Transfer-Encoding: chunked\r\n\
            \r\n\
            zz\r\n";
        let err = parser.receive(input).unwrap_err();
        assert!(matches!(err, Error::InvalidChunk));
    }

    #[test]
    fn test_malformed_head() {
        let mut parser = Parser::new(Kind::Request);
        let err = parser.receive(b"GET / HTTP/1.1\r\nBad Header\r\n\r\n");
        assert!(matches!(err, Err(Error::Parse(_))));
    }

    #[test]
    fn test_head_too_large() {
        let mut parser = Parser::new(Kind::Request);
        assert_eq!(parser.receive(b"GET / HTTP/1.1\r\n").unwrap(), 0);
        let filler = format!("X-Filler: {}\r\n", "a".repeat(4096));
        let mut res = Ok(0);
        for _ in 0..32 {
            res = parser.receive(filler.as_bytes());
            if res.is_err() {
                break;
            }
        }
        assert!(matches!(res, Err(Error::HeadTooLarge)));
    }

    #[test]
    fn test_finish_incomplete() {
        let mut parser = Parser::new(Kind::Request);
        let input = b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc";
        assert_eq!(parser.receive(input).unwrap(), 0);
        assert!(matches!(parser.finish(), Err(Error::Incomplete)));
    }
}
