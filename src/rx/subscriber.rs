// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::cell::Cell;
use std::rc::Rc;

/// The downstream half of a stream: a pair of callbacks invoked
/// synchronously on the publishing thread.
///
/// Cloning a subscriber yields another handle to the same callbacks and
/// the same closed flag, so a subscriber attached to several upstream
/// sources (merge) completes exactly once.
pub struct Subscriber<T> {
    inner: Rc<Inner<T>>,
}

struct Inner<T> {
    on_next: Box<dyn Fn(T)>,
    on_complete: Box<dyn Fn()>,
    closed: Cell<bool>,
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Subscriber<T> {
    pub fn new(on_next: impl Fn(T) + 'static, on_complete: impl Fn() + 'static) -> Self {
        Self {
            inner: Rc::new(Inner {
                on_next: Box::new(on_next),
                on_complete: Box::new(on_complete),
                closed: Cell::new(false),
            }),
        }
    }

    /// Subscriber that only cares about items.
    pub fn next_only(on_next: impl Fn(T) + 'static) -> Self {
        Self::new(on_next, || {})
    }

    pub fn on_next(&self, item: T) {
        if !self.inner.closed.get() {
            (self.inner.on_next)(item);
        }
    }

    /// Completes the subscriber. Idempotent; items delivered afterwards
    /// are discarded.
    pub fn on_complete(&self) {
        if !self.inner.closed.replace(true) {
            (self.inner.on_complete)();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.get()
    }
}
