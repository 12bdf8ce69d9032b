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

//! HTTP status.

use std::borrow::Cow;
use std::fmt;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP status.
///
/// A status is a numeric code together with its reason phrase. The common
/// statuses are available as associated constants, and any other pair can be
/// created with [`Status::new`].
///
/// # Examples
///
/// ```
/// use relay_serve::http::Status;
///
/// // Create custom status
/// let status = Status::new(299, "Fine");
/// assert_eq!(status.to_string(), "299 Fine");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Status {
    /// Status code.
    code: u16,
    /// Reason phrase.
    reason: Cow<'static, str>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Status {
    /// 200 OK
    pub const OK: Status = Status::from_static(200, "OK");
    /// 201 Created
    pub const CREATED: Status = Status::from_static(201, "Created");
    /// 202 Accepted
    pub const ACCEPTED: Status = Status::from_static(202, "Accepted");
    /// 204 No Content
    pub const NO_CONTENT: Status = Status::from_static(204, "No Content");
    /// 301 Moved Permanently
    pub const MOVED_PERMANENTLY: Status =
        Status::from_static(301, "Moved Permanently");
    /// 302 Found
    pub const FOUND: Status = Status::from_static(302, "Found");
    /// 304 Not Modified
    pub const NOT_MODIFIED: Status = Status::from_static(304, "Not Modified");
    /// 400 Bad Request
    pub const BAD_REQUEST: Status = Status::from_static(400, "Bad Request");
    /// 401 Unauthorized
    pub const UNAUTHORIZED: Status = Status::from_static(401, "Unauthorized");
    /// 403 Forbidden
    pub const FORBIDDEN: Status = Status::from_static(403, "Forbidden");
    /// 404 Not Found
    pub const NOT_FOUND: Status = Status::from_static(404, "Not Found");
    /// 405 Method Not Allowed
    pub const METHOD_NOT_ALLOWED: Status =
        Status::from_static(405, "Method Not Allowed");
    /// 418 I'm a Teapot
    pub const IM_A_TEAPOT: Status = Status::from_static(418, "I'm a Teapot");
    /// 500 Internal Server Error
    pub const INTERNAL_SERVER_ERROR: Status =
        Status::from_static(500, "Internal Server Error");
    /// 501 Not Implemented
    pub const NOT_IMPLEMENTED: Status =
        Status::from_static(501, "Not Implemented");
    /// 503 Service Unavailable
    pub const SERVICE_UNAVAILABLE: Status =
        Status::from_static(503, "Service Unavailable");

    /// Creates a status.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_serve::http::Status;
    ///
    /// // Create status
    /// let status = Status::new(404, "Not Found");
    /// assert_eq!(status, Status::NOT_FOUND);
    /// ```
    #[must_use]
    pub fn new<R>(code: u16, reason: R) -> Self
    where
        R: Into<Cow<'static, str>>,
    {
        Self { code, reason: reason.into() }
    }

    /// Creates a status from a static reason phrase.
    #[must_use]
    pub const fn from_static(code: u16, reason: &'static str) -> Self {
        Self { code, reason: Cow::Borrowed(reason) }
    }
}

#[allow(clippy::must_use_candidate)]
impl Status {
    /// Returns the status code.
    #[inline]
    pub fn code(&self) -> u16 {
        self.code
    }

    /// Returns the reason phrase.
    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns whether the status indicates success.
    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Default for Status {
    /// Creates the default status, which is "200 OK".
    #[inline]
    fn default() -> Self {
        Status::OK
    }
}

impl fmt::Display for Status {
    /// Formats the status for display.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.code, self.reason)
    }
}
