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

//! Event emitter builder.

use std::marker::PhantomData;

use crate::event::Event;

use super::Emitter;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Event emitter builder.
#[derive(Debug)]
pub struct Builder<E> {
    /// Subscription limit per event kind, if overridden.
    max_listeners: Option<usize>,
    /// Event type.
    marker: PhantomData<fn(&E)>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl<E> Builder<E>
where
    E: Event,
{
    /// Creates an emitter builder.
    ///
    /// Note that the canonical way to create an [`Emitter`] with options is
    /// to invoke the [`Emitter::builder`] method, which creates an instance of
    /// [`Builder`].
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_emit::emitter::Builder;
    /// use relay_emit::Lifecycle;
    ///
    /// // Create emitter builder
    /// let builder = Builder::<Lifecycle>::new();
    /// ```
    #[allow(clippy::new_without_default)]
    #[must_use]
    pub fn new() -> Self {
        Self { max_listeners: None, marker: PhantomData }
    }

    /// Sets the subscription limit per event kind.
    ///
    /// Use `0` for no limit. Without this option, the emitter follows the
    /// default set through [`Emitter::set_default_max_listeners`].
    #[inline]
    #[must_use]
    pub fn max_listeners(mut self, n: usize) -> Self {
        self.max_listeners = Some(n);
        self
    }

    /// Creates the emitter.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_emit::{Emitter, Lifecycle};
    ///
    /// // Create emitter from builder
    /// let emitter = Emitter::<Lifecycle>::builder()
    ///     .max_listeners(32)
    ///     .build();
    /// assert_eq!(emitter.max_listeners(), 32);
    /// ```
    #[must_use]
    pub fn build(self) -> Emitter<E> {
        let emitter = Emitter::new();
        if let Some(n) = self.max_listeners {
            emitter.set_max_listeners(n);
        }
        emitter
    }
}
