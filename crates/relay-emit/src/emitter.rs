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

//! Event emitter.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::event::{Emitted, Event, Lifecycle};

mod builder;
mod registry;
mod token;

pub use builder::Builder;
use registry::{Listener, Registry, Release};
pub use token::Token;

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Default subscription limit per event kind for all emitters.
static DEFAULT_MAX_LISTENERS: AtomicUsize = AtomicUsize::new(10);

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Event emitter.
///
/// Emitters keep an ordered list of subscriptions per [`Event::Kind`], and
/// invoke them synchronously, in registration order, whenever an event of the
/// kind is emitted. Subscriptions are cancelled through the [`Token`] that is
/// returned when subscribing, and one-shot subscriptions remove themselves
/// right after their first invocation.
///
/// Handlers may subscribe and unsubscribe while an emission is in flight. Each
/// emission works on a snapshot of the subscriptions taken when it starts, and
/// looks up every subscription again right before invoking it, which means that
/// subscriptions removed in the meantime are skipped, and subscriptions added
/// in the meantime are only invoked by later emissions.
///
/// Changes to subscriptions are reported as [`Lifecycle`] events, which are
/// emitted through the emitter itself, before the change becomes visible.
///
/// The emitter is single-threaded by design. Sharing it between threads would
/// require external synchronization, which is why it's not [`Sync`].
///
/// # Examples
///
/// ```
/// use relay_emit::{Emitted, Emitter, Lifecycle, LifecycleKind};
///
/// // Create emitter and subscribe to lifecycle events
/// let emitter = Emitter::<Lifecycle>::new();
/// let token = emitter.on(LifecycleKind::RemoveListener, |event| {
///     println!("{event:?}");
/// });
///
/// // Unsubscribing emits a lifecycle event to the handler itself
/// emitter.off(LifecycleKind::RemoveListener, token);
/// assert_eq!(emitter.listeners(LifecycleKind::RemoveListener), 0);
///
/// // Nobody is listening anymore
/// let res = emitter.emit(&Lifecycle::RemoveListener(token));
/// assert_eq!(res, Emitted::NoSubscribers);
/// ```
pub struct Emitter<E>
where
    E: Event,
{
    /// Subscription registry.
    registry: RefCell<Registry<E>>,
    /// Subscription limit per event kind, if overridden.
    max_listeners: Cell<Option<usize>>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl<E> Emitter<E>
where
    E: Event,
{
    /// Creates an emitter.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_emit::{Emitter, Lifecycle};
    ///
    /// // Create emitter
    /// let emitter = Emitter::<Lifecycle>::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: RefCell::new(Registry::new()),
            max_listeners: Cell::new(None),
        }
    }

    /// Creates an emitter builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_emit::{Emitter, Lifecycle};
    ///
    /// // Create emitter with unlimited subscriptions
    /// let emitter = Emitter::<Lifecycle>::builder()
    ///     .max_listeners(0)
    ///     .build();
    /// ```
    #[inline]
    #[must_use]
    pub fn builder() -> Builder<E> {
        Builder::new()
    }

    /// Subscribes to the given event kind.
    ///
    /// The handler is appended after all existing subscriptions of the kind.
    /// Subscribing the same handler twice results in two independent
    /// subscriptions, each of which must be cancelled on its own. Before the
    /// subscription is added, [`Lifecycle::NewListener`] is emitted with the
    /// token that is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_emit::{Emitter, Lifecycle, LifecycleKind};
    ///
    /// // Create emitter and subscribe to event kind
    /// let emitter = Emitter::<Lifecycle>::new();
    /// emitter.on(LifecycleKind::NewListener, |event| {
    ///     println!("{event:?}");
    /// });
    /// assert_eq!(emitter.listeners(LifecycleKind::NewListener), 1);
    /// ```
    pub fn on<F>(&self, kind: E::Kind, f: F) -> Token
    where
        F: Fn(&E) + 'static,
    {
        self.subscribe(kind, Rc::new(f), false)
    }

    /// Subscribes to the next event of the given event kind.
    ///
    /// This is identical to [`Emitter::on`], except that the subscription is
    /// removed right after its first invocation, before the next subscription
    /// is invoked. The removal emits [`Lifecycle::RemoveListener`].
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_emit::{Emitted, Emitter, Lifecycle, LifecycleKind};
    ///
    /// // Create emitter and subscribe to next event
    /// let emitter = Emitter::<Lifecycle>::new();
    /// let token = emitter.once(LifecycleKind::RemoveListener, |event| {
    ///     println!("{event:?}");
    /// });
    ///
    /// // Emit event twice, but only the first one is delivered
    /// let event = Lifecycle::RemoveListener(token);
    /// assert_eq!(emitter.emit(&event), Emitted::Subscribers);
    /// assert_eq!(emitter.emit(&event), Emitted::NoSubscribers);
    /// ```
    pub fn once<F>(&self, kind: E::Kind, f: F) -> Token
    where
        F: Fn(&E) + 'static,
    {
        self.subscribe(kind, Rc::new(f), true)
    }

    /// Unsubscribes the subscription with the given token.
    ///
    /// [`Lifecycle::RemoveListener`] is emitted first, and then the first
    /// occurrence of the token is removed from the subscriptions of the given
    /// kind. Unknown tokens, tokens of another kind, and tokens that were
    /// already removed are ignored, but still reported.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_emit::{Emitter, Lifecycle, LifecycleKind};
    ///
    /// // Create emitter and subscribe to event kind
    /// let emitter = Emitter::<Lifecycle>::new();
    /// let token = emitter.on(LifecycleKind::NewListener, |_| {});
    ///
    /// // Unsubscribe again
    /// emitter.off(LifecycleKind::NewListener, token);
    /// assert_eq!(emitter.listeners(LifecycleKind::NewListener), 0);
    /// ```
    pub fn off(&self, kind: E::Kind, token: Token) {
        self.emit(&E::from(Lifecycle::RemoveListener(token)));
        self.registry.borrow_mut().remove(kind, token);
    }

    /// Unsubscribes all subscriptions of the given event kind.
    ///
    /// Subscriptions are removed one after another in dispatch order, each
    /// through [`Emitter::off`], so each removal is reported.
    pub fn off_all(&self, kind: E::Kind) {
        let tokens = self.registry.borrow().tokens(kind);
        for token in tokens {
            self.off(kind, token);
        }
    }

    /// Unsubscribes all subscriptions of all event kinds.
    ///
    /// The order in which event kinds are processed is unspecified, but the
    /// subscriptions of each kind are removed in dispatch order.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_emit::{Emitted, Emitter, Lifecycle, LifecycleKind};
    ///
    /// // Create emitter and subscribe to event kinds
    /// let emitter = Emitter::<Lifecycle>::new();
    /// let token = emitter.on(LifecycleKind::NewListener, |_| {});
    /// emitter.on(LifecycleKind::RemoveListener, |_| {});
    ///
    /// // Unsubscribe everything
    /// emitter.clear();
    /// let res = emitter.emit(&Lifecycle::NewListener(token));
    /// assert_eq!(res, Emitted::NoSubscribers);
    /// ```
    pub fn clear(&self) {
        let kinds = self.registry.borrow().kinds();
        for kind in kinds {
            self.off_all(kind);
        }
    }

    /// Emits the given event.
    ///
    /// All subscriptions for the kind of the event are invoked synchronously,
    /// in registration order. If a handler panics, the panic unwinds through
    /// this method to the caller, and remaining subscriptions are skipped. A
    /// one-shot subscription whose handler panics is removed nonetheless.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_emit::{Emitted, Emitter, Lifecycle, LifecycleKind};
    ///
    /// // Create emitter and subscribe to event kind
    /// let emitter = Emitter::<Lifecycle>::new();
    /// let token = emitter.on(LifecycleKind::NewListener, |event| {
    ///     println!("{event:?}");
    /// });
    ///
    /// // Emit event
    /// let res = emitter.emit(&Lifecycle::NewListener(token));
    /// assert_eq!(res, Emitted::Subscribers);
    /// ```
    pub fn emit(&self, event: &E) -> Emitted {
        let kind = event.kind();
        let tokens = self.registry.borrow().snapshot(kind);
        if tokens.is_empty() {
            return Emitted::NoSubscribers;
        }

        // Invoke subscriptions one after another - the registry must not be
        // borrowed while a handler runs, as it might subscribe or unsubscribe
        #[cfg(feature = "tracing")]
        tracing::trace!(?kind, subscriptions = tokens.len(), "emit");
        for token in tokens {
            let claim = self.registry.borrow_mut().claim(token);
            let Some((listener, once)) = claim else {
                continue;
            };

            // Fired one-shots are released if the handler unwinds
            let guard = once.then(|| Release::new(&self.registry, kind, token));
            listener(event);
            if let Some(guard) = guard {
                guard.disarm();
            }

            // One-shots may have removed themselves already
            if once && self.registry.borrow().contains(kind, token) {
                self.off(kind, token);
            }
        }
        Emitted::Subscribers
    }

    /// Returns the number of subscriptions of the given event kind.
    #[must_use]
    pub fn listeners(&self, kind: E::Kind) -> usize {
        self.registry.borrow().len(kind)
    }

    /// Sets the subscription limit per event kind for this emitter.
    ///
    /// Exceeding the limit is not an error, but logs a warning once per kind,
    /// which helps to find leaking subscriptions. Use `0` for no limit. This
    /// takes precedence over [`Emitter::set_default_max_listeners`].
    pub fn set_max_listeners(&self, n: usize) {
        self.max_listeners.set(Some(n));
    }

    /// Sets the default subscription limit per event kind for all emitters.
    ///
    /// The default applies to all current and future emitters that didn't
    /// set their own limit through [`Emitter::set_max_listeners`].
    pub fn set_default_max_listeners(n: usize) {
        DEFAULT_MAX_LISTENERS.store(n, Ordering::Relaxed);
    }

    /// Returns the effective subscription limit per event kind.
    #[must_use]
    pub fn max_listeners(&self) -> usize {
        self.max_listeners
            .get()
            .unwrap_or_else(|| DEFAULT_MAX_LISTENERS.load(Ordering::Relaxed))
    }

    /// Allocates, announces and commits a subscription.
    fn subscribe(
        &self, kind: E::Kind, listener: Listener<E>, once: bool,
    ) -> Token {
        let token = self.registry.borrow_mut().allocate(listener, once);

        // Allocated slots are released if a lifecycle handler unwinds
        let guard = Release::new(&self.registry, kind, token);
        self.emit(&E::from(Lifecycle::NewListener(token)));
        guard.disarm();

        // Subscription becomes visible only now
        let count = self.registry.borrow_mut().commit(kind, token);
        let max = self.max_listeners();
        if max > 0 && count > max && self.registry.borrow_mut().warn(kind) {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                ?kind,
                count,
                max,
                "possible subscription leak, limit exceeded"
            );
        }
        token
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl<E> Default for Emitter<E>
where
    E: Event,
{
    /// Creates an emitter.
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Emitter<E>
where
    E: Event,
{
    /// Formats the emitter for debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        let kinds = registry.kinds();
        let counts: Vec<_> = kinds
            .into_iter()
            .map(|kind| (kind, registry.len(kind)))
            .collect();
        f.debug_struct("Emitter")
            .field("subscriptions", &counts)
            .field("max_listeners", &self.max_listeners())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::{Rc, Weak};

    use super::*;
    use crate::event::LifecycleKind;

    #[derive(Clone, Debug, PartialEq)]
    enum Ping {
        Listener(Lifecycle),
        Ping(u32),
        Pong,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum Kind {
        NewListener,
        RemoveListener,
        Ping,
        Pong,
    }

    impl From<Lifecycle> for Ping {
        fn from(event: Lifecycle) -> Self {
            Ping::Listener(event)
        }
    }

    impl Event for Ping {
        type Kind = Kind;

        fn kind(&self) -> Kind {
            match self {
                Ping::Listener(event) => match event.kind() {
                    LifecycleKind::NewListener => Kind::NewListener,
                    LifecycleKind::RemoveListener => Kind::RemoveListener,
                },
                Ping::Ping(_) => Kind::Ping,
                Ping::Pong => Kind::Pong,
            }
        }
    }

    type Log = Rc<RefCell<Vec<String>>>;

    fn record(log: &Log, label: &'static str) -> impl Fn(&Ping) + 'static {
        let log = Rc::clone(log);
        move |event: &Ping| {
            log.borrow_mut().push(format!("{label}:{event:?}"));
        }
    }

    #[test]
    fn test_emit_in_registration_order() {
        let emitter = Emitter::<Ping>::new();
        let log = Log::default();
        emitter.on(Kind::Ping, record(&log, "a"));
        emitter.on(Kind::Ping, record(&log, "b"));
        emitter.on(Kind::Pong, record(&log, "c"));

        assert_eq!(emitter.emit(&Ping::Ping(1)), Emitted::Subscribers);
        assert_eq!(*log.borrow(), vec!["a:Ping(1)", "b:Ping(1)"]);
    }

    #[test]
    fn test_emit_without_subscribers() {
        let emitter = Emitter::<Ping>::new();
        assert_eq!(emitter.emit(&Ping::Pong), Emitted::NoSubscribers);
        assert!(!emitter.emit(&Ping::Ping(0)).had_subscribers());
    }

    #[test]
    fn test_emit_current_subscriptions_only() {
        let emitter = Emitter::<Ping>::new();
        let log = Log::default();
        let a = emitter.on(Kind::Ping, record(&log, "a"));
        emitter.on(Kind::Ping, record(&log, "b"));
        emitter.off(Kind::Ping, a);
        emitter.on(Kind::Ping, record(&log, "c"));

        emitter.emit(&Ping::Ping(7));
        assert_eq!(*log.borrow(), vec!["b:Ping(7)", "c:Ping(7)"]);
    }

    #[test]
    fn test_once_fires_exactly_once() {
        let emitter = Emitter::<Ping>::new();
        let log = Log::default();
        emitter.once(Kind::Ping, record(&log, "once"));
        emitter.on(Kind::Ping, record(&log, "on"));

        emitter.emit(&Ping::Ping(1));
        assert_eq!(emitter.listeners(Kind::Ping), 1);
        emitter.emit(&Ping::Ping(2));
        emitter.emit(&Ping::Ping(3));
        assert_eq!(
            *log.borrow(),
            vec!["once:Ping(1)", "on:Ping(1)", "on:Ping(2)", "on:Ping(3)"]
        );
    }

    #[test]
    fn test_once_removed_before_next_subscriber() {
        let emitter = Rc::new(Emitter::<Ping>::new());
        let seen = Rc::new(Cell::new(usize::MAX));
        emitter.once(Kind::Ping, |_| {});
        {
            let weak = Rc::downgrade(&emitter);
            let seen = Rc::clone(&seen);
            emitter.on(Kind::Ping, move |_| {
                if let Some(emitter) = weak.upgrade() {
                    seen.set(emitter.listeners(Kind::Ping));
                }
            });
        }
        emitter.emit(&Ping::Ping(1));
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn test_once_not_reentered_by_nested_emit() {
        let emitter = Rc::new(Emitter::<Ping>::new());
        let count = Rc::new(Cell::new(0));
        {
            let weak: Weak<Emitter<Ping>> = Rc::downgrade(&emitter);
            let count = Rc::clone(&count);
            emitter.once(Kind::Ping, move |_| {
                count.set(count.get() + 1);
                if let Some(emitter) = weak.upgrade() {
                    emitter.emit(&Ping::Ping(2));
                }
            });
        }
        assert_eq!(emitter.emit(&Ping::Ping(1)), Emitted::Subscribers);
        assert_eq!(count.get(), 1);
        assert_eq!(emitter.listeners(Kind::Ping), 0);
    }

    #[test]
    fn test_same_handler_twice_removed_once() {
        let emitter = Emitter::<Ping>::new();
        let count = Rc::new(Cell::new(0));
        let handler = {
            let count = Rc::clone(&count);
            Rc::new(move |_: &Ping| count.set(count.get() + 1))
        };
        let a = emitter.on(Kind::Ping, {
            let handler = Rc::clone(&handler);
            move |event: &Ping| handler(event)
        });
        emitter.on(Kind::Ping, {
            let handler = Rc::clone(&handler);
            move |event: &Ping| handler(event)
        });

        emitter.off(Kind::Ping, a);
        assert_eq!(emitter.listeners(Kind::Ping), 1);
        emitter.emit(&Ping::Ping(1));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_off_is_noop_for_unknown_tokens() {
        let emitter = Emitter::<Ping>::new();
        let token = emitter.on(Kind::Ping, |_| {});
        emitter.off(Kind::Pong, token);
        assert_eq!(emitter.listeners(Kind::Ping), 1);
        emitter.off(Kind::Ping, token);
        emitter.off(Kind::Ping, token);
        assert_eq!(emitter.listeners(Kind::Ping), 0);
    }

    #[test]
    fn test_stale_token_does_not_match_reused_slot() {
        let emitter = Emitter::<Ping>::new();
        let stale = emitter.on(Kind::Ping, |_| {});
        emitter.off(Kind::Ping, stale);
        let fresh = emitter.on(Kind::Ping, |_| {});
        assert_ne!(stale, fresh);

        emitter.off(Kind::Ping, stale);
        assert_eq!(emitter.listeners(Kind::Ping), 1);
    }

    #[test]
    fn test_clear_removes_everything() {
        let emitter = Emitter::<Ping>::new();
        emitter.on(Kind::Ping, |_| {});
        emitter.once(Kind::Pong, |_| {});
        emitter.on(Kind::NewListener, |_| {});
        emitter.on(Kind::RemoveListener, |_| {});

        emitter.clear();
        for event in [Ping::Ping(1), Ping::Pong] {
            assert_eq!(emitter.emit(&event), Emitted::NoSubscribers);
        }
        assert_eq!(emitter.listeners(Kind::NewListener), 0);
        assert_eq!(emitter.listeners(Kind::RemoveListener), 0);
    }

    #[test]
    fn test_off_all_reports_each_removal_in_order() {
        let emitter = Emitter::<Ping>::new();
        let a = emitter.on(Kind::Ping, |_| {});
        let b = emitter.on(Kind::Ping, |_| {});
        let removed = Rc::new(RefCell::new(Vec::new()));
        {
            let removed = Rc::clone(&removed);
            emitter.on(Kind::RemoveListener, move |event| {
                if let Ping::Listener(event) = event {
                    removed.borrow_mut().push(event.token());
                }
            });
        }

        emitter.off_all(Kind::Ping);
        assert_eq!(*removed.borrow(), vec![a, b]);
        assert_eq!(emitter.listeners(Kind::Ping), 0);
    }

    #[test]
    fn test_lifecycle_precedes_mutation() {
        let emitter = Rc::new(Emitter::<Ping>::new());
        let observed = Rc::new(RefCell::new(Vec::new()));
        for kind in [Kind::NewListener, Kind::RemoveListener] {
            let weak = Rc::downgrade(&emitter);
            let observed = Rc::clone(&observed);
            emitter.on(kind, move |event| {
                if let Some(emitter) = weak.upgrade() {
                    let count = emitter.listeners(Kind::Ping);
                    observed.borrow_mut().push((event.kind(), count));
                }
            });
        }

        observed.borrow_mut().clear();

        let token = emitter.on(Kind::Ping, |_| {});
        emitter.off(Kind::Ping, token);
        assert_eq!(
            *observed.borrow(),
            vec![(Kind::NewListener, 0), (Kind::RemoveListener, 1)]
        );
    }

    #[test]
    fn test_lifecycle_emitted_once_per_change() {
        let emitter = Emitter::<Ping>::new();
        let log = Log::default();
        emitter.on(Kind::NewListener, record(&log, "new"));
        emitter.on(Kind::RemoveListener, record(&log, "remove"));
        log.borrow_mut().clear();

        let a = emitter.on(Kind::Ping, |_| {});
        let b = emitter.once(Kind::Pong, |_| {});
        emitter.off(Kind::Ping, a);
        emitter.emit(&Ping::Pong);
        assert_eq!(
            *log.borrow(),
            vec![
                format!("new:{:?}", Ping::Listener(Lifecycle::NewListener(a))),
                format!("new:{:?}", Ping::Listener(Lifecycle::NewListener(b))),
                format!(
                    "remove:{:?}",
                    Ping::Listener(Lifecycle::RemoveListener(a))
                ),
                format!(
                    "remove:{:?}",
                    Ping::Listener(Lifecycle::RemoveListener(b))
                ),
            ]
        );
    }

    #[test]
    fn test_lifecycle_handler_may_subscribe_recursively() {
        let emitter = Rc::new(Emitter::<Ping>::new());
        let depth = Rc::new(Cell::new(0));
        {
            let weak = Rc::downgrade(&emitter);
            let depth = Rc::clone(&depth);
            emitter.on(Kind::NewListener, move |_| {
                if depth.get() < 3 {
                    depth.set(depth.get() + 1);
                    if let Some(emitter) = weak.upgrade() {
                        emitter.on(Kind::Pong, |_| {});
                    }
                }
            });
        }

        emitter.on(Kind::Ping, |_| {});
        assert_eq!(depth.get(), 3);
        assert_eq!(emitter.listeners(Kind::Pong), 3);
        assert_eq!(emitter.listeners(Kind::Ping), 1);
    }

    #[test]
    fn test_unsubscribe_during_emit_skips_removed() {
        let emitter = Rc::new(Emitter::<Ping>::new());
        let log = Log::default();
        let victim = Rc::new(Cell::new(None));
        {
            let weak = Rc::downgrade(&emitter);
            let victim = Rc::clone(&victim);
            emitter.on(Kind::Ping, move |_| {
                if let (Some(emitter), Some(token)) = (weak.upgrade(), victim.get())
                {
                    emitter.off(Kind::Ping, token);
                }
            });
        }
        emitter.on(Kind::Ping, record(&log, "b"));
        victim.set(Some(emitter.on(Kind::Ping, record(&log, "c"))));
        emitter.on(Kind::Ping, record(&log, "d"));

        emitter.emit(&Ping::Ping(1));
        assert_eq!(*log.borrow(), vec!["b:Ping(1)", "d:Ping(1)"]);
    }

    #[test]
    fn test_subscribe_during_emit_defers_to_next_emit() {
        let emitter = Rc::new(Emitter::<Ping>::new());
        let log = Log::default();
        {
            let weak = Rc::downgrade(&emitter);
            let log = Rc::clone(&log);
            emitter.once(Kind::Ping, move |_| {
                if let Some(emitter) = weak.upgrade() {
                    emitter.on(Kind::Ping, record(&log, "late"));
                }
            });
        }
        emitter.on(Kind::Ping, record(&log, "b"));

        emitter.emit(&Ping::Ping(1));
        assert_eq!(*log.borrow(), vec!["b:Ping(1)"]);
        emitter.emit(&Ping::Ping(2));
        assert_eq!(*log.borrow(), vec!["b:Ping(1)", "b:Ping(2)", "late:Ping(2)"]);
    }

    #[test]
    fn test_panic_propagates_and_registry_survives() {
        let emitter = Emitter::<Ping>::new();
        let log = Log::default();
        emitter.on(Kind::Ping, |_| panic!("boom"));
        emitter.on(Kind::Ping, record(&log, "after"));

        let res = panic::catch_unwind(AssertUnwindSafe(|| {
            emitter.emit(&Ping::Ping(1));
        }));
        assert!(res.is_err());
        assert!(log.borrow().is_empty());

        // Registry is still usable after unwinding
        emitter.on(Kind::Pong, record(&log, "pong"));
        emitter.emit(&Ping::Pong);
        assert_eq!(*log.borrow(), vec!["pong:Pong"]);
    }

    #[test]
    fn test_panicking_once_is_removed() {
        let emitter = Emitter::<Ping>::new();
        let log = Log::default();
        emitter.once(Kind::Ping, |_| panic!("boom"));
        emitter.on(Kind::RemoveListener, record(&log, "removed"));

        let res = panic::catch_unwind(AssertUnwindSafe(|| {
            emitter.emit(&Ping::Ping(1));
        }));
        assert!(res.is_err());
        assert_eq!(emitter.listeners(Kind::Ping), 0);
        assert_eq!(emitter.emit(&Ping::Ping(2)), Emitted::NoSubscribers);
        assert_eq!(emitter.registry.borrow().allocated(), 1);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_panicking_lifecycle_frees_allocation() {
        let emitter = Emitter::<Ping>::new();
        emitter.on(Kind::NewListener, |_| panic!("boom"));
        assert_eq!(emitter.registry.borrow().allocated(), 1);

        let res = panic::catch_unwind(AssertUnwindSafe(|| {
            emitter.on(Kind::Ping, |_| {});
        }));
        assert!(res.is_err());
        assert_eq!(emitter.listeners(Kind::Ping), 0);
        assert_eq!(emitter.registry.borrow().allocated(), 1);
    }

    #[test]
    fn test_max_listeners() {
        let emitter = Emitter::<Ping>::builder().max_listeners(1).build();
        assert_eq!(emitter.max_listeners(), 1);
        emitter.on(Kind::Ping, |_| {});
        emitter.on(Kind::Ping, |_| {});
        assert_eq!(emitter.listeners(Kind::Ping), 2);

        emitter.set_max_listeners(0);
        assert_eq!(emitter.max_listeners(), 0);
    }
}
