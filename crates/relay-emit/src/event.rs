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

//! Event.

use std::fmt;
use std::hash::Hash;

use super::emitter::Token;

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Event.
///
/// Events are values of a closed set of variants, usually an enum, where each
/// variant maps to a [`Event::Kind`]. The kind is the key under which handlers
/// are registered with an [`Emitter`][], so all handlers for a kind receive
/// the same event type, and recover the payload by matching on the variant,
/// which keeps dispatch free of any runtime downcasting.
///
/// Every event type must be constructible from [`Lifecycle`], since emitters
/// report their own subscription changes as ordinary events. The simplest way
/// is to reserve a variant wrapping [`Lifecycle`], and to map its kinds onto
/// two dedicated kinds of the event type.
///
/// [`Emitter`]: crate::Emitter
///
/// # Examples
///
/// ```
/// use relay_emit::{Event, Lifecycle, LifecycleKind};
///
/// // Define event
/// #[derive(Debug)]
/// enum Door {
///     Listener(Lifecycle),
///     Open,
///     Knock(u32),
/// }
///
/// // Define event kind
/// #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// enum DoorKind {
///     NewListener,
///     RemoveListener,
///     Open,
///     Knock,
/// }
///
/// impl From<Lifecycle> for Door {
///     fn from(event: Lifecycle) -> Self {
///         Door::Listener(event)
///     }
/// }
///
/// impl Event for Door {
///     type Kind = DoorKind;
///
///     fn kind(&self) -> DoorKind {
///         match self {
///             Door::Listener(event) => match event.kind() {
///                 LifecycleKind::NewListener => DoorKind::NewListener,
///                 LifecycleKind::RemoveListener => DoorKind::RemoveListener,
///             },
///             Door::Open => DoorKind::Open,
///             Door::Knock(_) => DoorKind::Knock,
///         }
///     }
/// }
///
/// assert_eq!(Door::Knock(3).kind(), DoorKind::Knock);
/// ```
pub trait Event: From<Lifecycle> + 'static {
    /// Event kind.
    type Kind: Copy + Eq + Hash + fmt::Debug + 'static;

    /// Returns the kind of the event.
    fn kind(&self) -> Self::Kind;
}

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Lifecycle event.
///
/// Lifecycle events are emitted by an [`Emitter`][] whenever a subscription
/// is added or removed. Both are emitted before the change becomes visible,
/// so a handler for [`Lifecycle::NewListener`] can hold the token, but won't
/// find the new subscription in the registry yet.
///
/// [`Emitter`]: crate::Emitter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    /// A subscription is about to be added.
    NewListener(Token),
    /// A subscription is about to be removed.
    RemoveListener(Token),
}

/// Lifecycle event kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleKind {
    /// Kind of [`Lifecycle::NewListener`].
    NewListener,
    /// Kind of [`Lifecycle::RemoveListener`].
    RemoveListener,
}

// ----------------------------------------------------------------------------

/// Emission result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emitted {
    /// At least one subscription was invoked.
    Subscribers,
    /// No subscription existed for the kind.
    NoSubscribers,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Lifecycle {
    /// Returns the token carried by the lifecycle event.
    #[must_use]
    pub fn token(&self) -> Token {
        match self {
            Lifecycle::NewListener(token) | Lifecycle::RemoveListener(token) => {
                *token
            }
        }
    }
}

impl Emitted {
    /// Returns whether at least one subscription was invoked.
    #[inline]
    #[must_use]
    pub fn had_subscribers(self) -> bool {
        self == Emitted::Subscribers
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Event for Lifecycle {
    type Kind = LifecycleKind;

    /// Returns the kind of the lifecycle event.
    #[inline]
    fn kind(&self) -> LifecycleKind {
        match self {
            Lifecycle::NewListener(_) => LifecycleKind::NewListener,
            Lifecycle::RemoveListener(_) => LifecycleKind::RemoveListener,
        }
    }
}
