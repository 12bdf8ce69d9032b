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

//! HTTP headers.

use std::collections::btree_map::Values;
use std::collections::BTreeMap;
use std::fmt;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP headers.
///
/// Header names are case-insensitive, so the map is keyed by the lowercase
/// name, but keeps the spelling of the name as it was first inserted, which is
/// used for display. Ordering is by lowercase name, which makes the output of
/// [`fmt::Display`] deterministic.
///
/// # Examples
///
/// ```
/// use relay_serve::http::Headers;
///
/// // Create header map and add header
/// let mut headers = Headers::new();
/// headers.insert("Content-Type", "text/plain");
/// assert_eq!(headers.get("content-type"), Some("text/plain"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers {
    /// Ordered map of headers by lowercase name.
    inner: BTreeMap<String, (String, String)>,
}

/// Iterator over HTTP headers.
#[derive(Debug)]
pub struct Iter<'a> {
    /// Inner iterator.
    inner: Values<'a, String, (String, String)>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Headers {
    /// Creates a header map.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { inner: BTreeMap::new() }
    }

    /// Returns the value for the given header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        let key = name.to_ascii_lowercase();
        self.inner.get(&key).map(|(_, value)| value.as_str())
    }

    /// Returns whether the header is contained.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(&name.to_ascii_lowercase())
    }

    /// Updates the given header, replacing any previous value.
    #[allow(clippy::needless_pass_by_value)]
    pub fn insert<N, V>(&mut self, name: N, value: V)
    where
        N: Into<String>,
        V: ToString,
    {
        let name = name.into();
        let key = name.to_ascii_lowercase();
        let value = value.to_string();
        self.inner
            .entry(key)
            .and_modify(|entry| entry.1.clone_from(&value))
            .or_insert((name, value));
    }

    /// Appends a value to the given header.
    ///
    /// If the header is already present, the value is joined to the existing
    /// one with a comma, which is how repeated header fields are combined.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_serve::http::Headers;
    ///
    /// // Create header map and append values
    /// let mut headers = Headers::new();
    /// headers.append("Accept", "text/html");
    /// headers.append("accept", "text/plain");
    /// assert_eq!(headers.get("Accept"), Some("text/html, text/plain"));
    /// ```
    pub fn append<N, V>(&mut self, name: N, value: V)
    where
        N: Into<String>,
        V: AsRef<str>,
    {
        let name = name.into();
        let key = name.to_ascii_lowercase();
        let value = value.as_ref();
        match self.inner.get_mut(&key) {
            Some((_, current)) => {
                current.push_str(", ");
                current.push_str(value);
            }
            None => {
                self.inner.insert(key, (name, value.to_string()));
            }
        }
    }

    /// Removes the given header.
    pub fn remove(&mut self, name: &str) {
        self.inner.remove(&name.to_ascii_lowercase());
    }

    /// Returns an iterator over the header map.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter { inner: self.inner.values() }
    }
}

#[allow(clippy::must_use_candidate)]
impl Headers {
    /// Returns the number of headers.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns whether there are any headers.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    /// Creates an iterator over the header map.
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<N, V> FromIterator<(N, V)> for Headers
where
    N: Into<String>,
    V: AsRef<str>,
{
    /// Creates a header map from an iterator, appending repeated headers.
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = (N, V)>,
    {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.append(name, value);
        }
        headers
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for Headers {
    /// Formats the header map for display.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (name, value) in self {
            f.write_str(name)?;
            f.write_str(": ")?;
            f.write_str(value)?;
            f.write_str("\r\n")?;
        }

        // No errors occurred
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_spelling() {
        let mut headers = Headers::new();
        headers.insert("X-Request-Id", 1);
        headers.insert("x-request-id", 2);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.to_string(), "X-Request-Id: 2\r\n");
    }

    #[test]
    fn test_remove_is_case_insensitive() {
        let mut headers: Headers =
            [("Host", "localhost"), ("Accept", "*/*")].into_iter().collect();
        headers.remove("HOST");
        assert!(!headers.contains("host"));
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec![("Accept", "*/*")]);
    }
}
