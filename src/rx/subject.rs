// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::cell::RefCell;
use std::rc::Rc;

use crate::rx::{Observable, Subscriber, Subscription};

/// A hot multicast source: every item pushed with [`Subject::next`] is
/// delivered to all current subscribers, in subscription order. Late
/// subscribers do not see past items.
///
/// Cloning a subject yields another handle to the same subscriber list,
/// matching the handle semantics of reactive-framework subjects.
pub struct Subject<T> {
    state: Rc<RefCell<State<T>>>,
}

struct State<T> {
    subscribers: Vec<(u64, Subscriber<T>)>,
    next_id: u64,
    completed: bool,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Subject<T> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                subscribers: Vec::new(),
                next_id: 0,
                completed: false,
            })),
        }
    }
}

impl<T: Clone + 'static> Subject<T> {
    /// The subject seen as a stream. The returned observable holds only a
    /// weak reference to the subject, so subscriptions never keep the
    /// owning side alive; subscribing after the subject is gone (or
    /// completed) completes immediately.
    pub fn observable(&self) -> Observable<T> {
        let weak = Rc::downgrade(&self.state);
        Observable::new(move |subscriber| {
            let state = match weak.upgrade() {
                Some(state) => state,
                None => {
                    subscriber.on_complete();
                    return Subscription::empty();
                }
            };

            {
                let mut st = state.borrow_mut();
                if st.completed {
                    drop(st);
                    subscriber.on_complete();
                    return Subscription::empty();
                }
                let id = st.next_id;
                st.next_id += 1;
                st.subscribers.push((id, subscriber));

                let weak = weak.clone();
                Subscription::new(move || {
                    if let Some(state) = weak.upgrade() {
                        state.borrow_mut().subscribers.retain(|(sid, _)| *sid != id);
                    }
                })
            }
        })
    }

    /// A subscriber handle that feeds this subject, for wiring one stream
    /// into another.
    pub fn subscriber(&self) -> Subscriber<T> {
        let next_handle = self.clone();
        let complete_handle = self.clone();
        Subscriber::new(
            move |item| next_handle.next(item),
            move || complete_handle.complete(),
        )
    }

    /// Broadcasts an item to every current subscriber. The subscriber
    /// list is snapshotted first so callbacks may themselves subscribe or
    /// unsubscribe without poisoning the iteration.
    pub fn next(&self, item: T) {
        let targets: Vec<Subscriber<T>> = self
            .state
            .borrow()
            .subscribers
            .iter()
            .map(|(_, s)| s.clone())
            .collect();

        for target in targets {
            target.on_next(item.clone());
        }
    }

    /// Completes all subscribers and rejects future ones. Idempotent.
    pub fn complete(&self) {
        let targets = {
            let mut st = self.state.borrow_mut();
            if st.completed {
                return;
            }
            st.completed = true;
            std::mem::take(&mut st.subscribers)
        };

        for (_, target) in targets {
            target.on_complete();
        }
    }
}
