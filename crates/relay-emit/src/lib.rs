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

//! Typed event emitter.
//!
//! Emitters deliver events synchronously to handlers registered for the kind
//! of the event. Event types are plain enums implementing [`Event`], so every
//! handler receives a typed value and recovers the payload by matching on the
//! variant. Subscriptions are cancelled through opaque [`Token`]s, and every
//! change to the subscriptions is itself announced as a [`Lifecycle`] event.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use relay_emit::{Emitted, Emitter, Event, Lifecycle, LifecycleKind};
//!
//! #[derive(Debug)]
//! enum Bell {
//!     Listener(Lifecycle),
//!     Ring(u8),
//! }
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
//! enum BellKind {
//!     Listener(LifecycleKind),
//!     Ring,
//! }
//!
//! impl From<Lifecycle> for Bell {
//!     fn from(event: Lifecycle) -> Self {
//!         Bell::Listener(event)
//!     }
//! }
//!
//! impl Event for Bell {
//!     type Kind = BellKind;
//!
//!     fn kind(&self) -> BellKind {
//!         match self {
//!             Bell::Listener(event) => BellKind::Listener(event.kind()),
//!             Bell::Ring(_) => BellKind::Ring,
//!         }
//!     }
//! }
//!
//! // Create emitter and count rings
//! let emitter = Emitter::<Bell>::new();
//! let rings = Rc::new(Cell::new(0));
//! let token = emitter.on(BellKind::Ring, {
//!     let rings = Rc::clone(&rings);
//!     move |event: &Bell| {
//!         if let Bell::Ring(n) = event {
//!             rings.set(rings.get() + u32::from(*n));
//!         }
//!     }
//! });
//!
//! // Ring twice, then stop listening
//! emitter.emit(&Bell::Ring(1));
//! emitter.emit(&Bell::Ring(2));
//! emitter.off(BellKind::Ring, token);
//! assert_eq!(emitter.emit(&Bell::Ring(3)), Emitted::NoSubscribers);
//! assert_eq!(rings.get(), 3);
//! ```

#![allow(clippy::doc_markdown)]

pub mod emitter;
mod event;

pub use emitter::{Emitter, Token};
pub use event::{Emitted, Event, Lifecycle, LifecycleKind};
