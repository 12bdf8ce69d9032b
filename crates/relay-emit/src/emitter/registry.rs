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

//! Subscription registry.

use ahash::{HashMap, HashSet};
use slab::Slab;
use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use crate::event::Event;

use super::token::Token;

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// Type-erased subscription handler.
pub type Listener<E> = Rc<dyn Fn(&E)>;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Subscription.
struct Entry<E> {
    /// Subscription handler.
    listener: Listener<E>,
    /// Subscription generation.
    generation: u64,
    /// Whether the subscription is one-shot.
    once: bool,
    /// Whether the one-shot subscription was already invoked.
    fired: bool,
}

/// Subscription registry.
///
/// The registry owns all subscriptions in an arena, and keeps an ordered list
/// of tokens per event kind, which defines dispatch order. Subscriptions are
/// first allocated in the arena and only become visible to emission once they
/// were committed to the list of their kind, which allows the emitter to hand
/// out the token before the subscription is observable.
pub struct Registry<E>
where
    E: Event,
{
    /// Arena of subscriptions.
    entries: Slab<Entry<E>>,
    /// Ordered tokens by event kind.
    kinds: HashMap<E::Kind, Vec<Token>>,
    /// Event kinds that exceeded the subscription limit.
    warned: HashSet<E::Kind>,
    /// Next subscription generation.
    generation: u64,
}

/// Release guard.
///
/// Releases a subscription when dropped, unless it was disarmed before. This
/// is used to keep the registry consistent if a handler unwinds while the
/// subscription is allocated but not committed, or fired but not removed.
pub struct Release<'a, E>
where
    E: Event,
{
    /// Registry owning the subscription.
    registry: &'a RefCell<Registry<E>>,
    /// Event kind of the subscription.
    kind: E::Kind,
    /// Subscription token.
    token: Token,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl<E> Registry<E>
where
    E: Event,
{
    /// Creates a registry.
    pub fn new() -> Self {
        Self {
            entries: Slab::new(),
            kinds: HashMap::default(),
            warned: HashSet::default(),
            generation: 0,
        }
    }

    /// Allocates a subscription without making it visible.
    pub fn allocate(&mut self, listener: Listener<E>, once: bool) -> Token {
        let generation = self.generation;
        self.generation += 1;
        let key = self.entries.insert(Entry {
            listener,
            generation,
            once,
            fired: false,
        });
        Token::new(key, generation)
    }

    /// Appends an allocated subscription to the list of the given kind, and
    /// returns the number of subscriptions for the kind afterwards.
    pub fn commit(&mut self, kind: E::Kind, token: Token) -> usize {
        let tokens = self.kinds.entry(kind).or_default();
        tokens.push(token);
        tokens.len()
    }

    /// Removes the first occurrence of the token from the list of the given
    /// kind, and frees the subscription, returning whether it was present.
    pub fn remove(&mut self, kind: E::Kind, token: Token) -> bool {
        let Some(tokens) = self.kinds.get_mut(&kind) else {
            return false;
        };
        let Some(index) = tokens.iter().position(|&t| t == token) else {
            return false;
        };

        // Remove token from list, and free the slot if it's still ours
        tokens.remove(index);
        if tokens.is_empty() {
            self.warned.remove(&kind);
        }
        if self.get(token).is_some() {
            self.entries.remove(token.key());
        }
        true
    }

    /// Removes the token from the list of the given kind, if present, and
    /// frees the subscription, even if it was never committed.
    pub fn release(&mut self, kind: E::Kind, token: Token) {
        if !self.remove(kind, token) && self.get(token).is_some() {
            self.entries.remove(token.key());
        }
    }

    /// Returns whether the token is in the list of the given kind.
    pub fn contains(&self, kind: E::Kind, token: Token) -> bool {
        self.kinds
            .get(&kind)
            .is_some_and(|tokens| tokens.contains(&token))
    }

    /// Returns the tokens of all subscriptions of the given kind which are
    /// still eligible for invocation, in dispatch order.
    pub fn snapshot(&self, kind: E::Kind) -> Vec<Token> {
        let Some(tokens) = self.kinds.get(&kind) else {
            return Vec::new();
        };
        let iter = tokens.iter().copied();
        iter.filter(|&token| self.get(token).is_some_and(|e| !e.fired))
            .collect()
    }

    /// Returns the tokens of all subscriptions of the given kind.
    pub fn tokens(&self, kind: E::Kind) -> Vec<Token> {
        self.kinds.get(&kind).cloned().unwrap_or_default()
    }

    /// Returns all event kinds with subscriptions.
    pub fn kinds(&self) -> Vec<E::Kind> {
        let iter = self.kinds.iter();
        iter.filter(|(_, tokens)| !tokens.is_empty())
            .map(|(kind, _)| *kind)
            .collect()
    }

    /// Returns the number of subscriptions of the given kind.
    pub fn len(&self, kind: E::Kind) -> usize {
        self.kinds.get(&kind).map_or(0, Vec::len)
    }

    /// Claims the subscription for invocation.
    ///
    /// Returns the handler, and whether the subscription is one-shot, unless
    /// the subscription was removed in the meantime, or it's a one-shot which
    /// already fired. One-shots are marked as fired right here, so they can't
    /// be invoked a second time by a nested emission.
    pub fn claim(&mut self, token: Token) -> Option<(Listener<E>, bool)> {
        let entry = self.entries.get_mut(token.key())?;
        if entry.generation != token.generation() || entry.fired {
            return None;
        }
        if entry.once {
            entry.fired = true;
        }
        Some((Rc::clone(&entry.listener), entry.once))
    }

    /// Records that the given kind exceeded the limit, and returns whether
    /// this is the first time since the kind was last emptied.
    pub fn warn(&mut self, kind: E::Kind) -> bool {
        self.warned.insert(kind)
    }

    /// Returns the number of allocated subscriptions.
    #[cfg(test)]
    pub fn allocated(&self) -> usize {
        self.entries.len()
    }

    /// Returns the subscription for the given token, if any.
    fn get(&self, token: Token) -> Option<&Entry<E>> {
        self.entries
            .get(token.key())
            .filter(|entry| entry.generation == token.generation())
    }
}

// ----------------------------------------------------------------------------

impl<'a, E> Release<'a, E>
where
    E: Event,
{
    /// Creates a release guard for the given subscription.
    #[must_use]
    pub fn new(
        registry: &'a RefCell<Registry<E>>, kind: E::Kind, token: Token,
    ) -> Self {
        Self { registry, kind, token }
    }

    /// Disarms the guard, keeping the subscription.
    pub fn disarm(self) {
        mem::forget(self);
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl<E> Drop for Release<'_, E>
where
    E: Event,
{
    /// Releases the subscription.
    fn drop(&mut self) {
        if let Ok(mut registry) = self.registry.try_borrow_mut() {
            registry.release(self.kind, self.token);
        }
    }
}
