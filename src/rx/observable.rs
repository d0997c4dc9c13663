// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::cell::Cell;
use std::rc::Rc;

use crate::rx::{Subscriber, Subscription};

/// A lazy push stream. Holds only a subscribe function; operators wrap it
/// in further closures and nothing runs until a subscriber attaches.
pub struct Observable<T> {
    on_subscribe: Rc<dyn Fn(Subscriber<T>) -> Subscription>,
}

impl<T> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            on_subscribe: Rc::clone(&self.on_subscribe),
        }
    }
}

impl<T: Clone + 'static> Observable<T> {
    pub fn new(on_subscribe: impl Fn(Subscriber<T>) -> Subscription + 'static) -> Self {
        Self {
            on_subscribe: Rc::new(on_subscribe),
        }
    }

    pub fn subscribe(&self, subscriber: Subscriber<T>) -> Subscription {
        (self.on_subscribe)(subscriber)
    }

    /// Subscribes with an items-only callback.
    pub fn subscribe_next(&self, on_next: impl Fn(T) + 'static) -> Subscription {
        self.subscribe(Subscriber::next_only(on_next))
    }

    pub fn filter(&self, predicate: impl Fn(&T) -> bool + 'static) -> Observable<T> {
        let source = self.clone();
        let predicate = Rc::new(predicate);
        Observable::new(move |downstream| {
            let predicate = Rc::clone(&predicate);
            let next_target = downstream.clone();
            let complete_target = downstream;
            source.subscribe(Subscriber::new(
                move |item| {
                    if predicate(&item) {
                        next_target.on_next(item);
                    }
                },
                move || complete_target.on_complete(),
            ))
        })
    }

    pub fn map(&self, f: impl Fn(T) -> T + 'static) -> Observable<T> {
        let source = self.clone();
        let f = Rc::new(f);
        Observable::new(move |downstream| {
            let f = Rc::clone(&f);
            let next_target = downstream.clone();
            let complete_target = downstream;
            source.subscribe(Subscriber::new(
                move |item| next_target.on_next(f(item)),
                move || complete_target.on_complete(),
            ))
        })
    }

    /// Unordered union of several streams. Items arrive interleaved in
    /// emission order; the merged stream completes once every source has
    /// completed. Merging nothing completes immediately.
    pub fn merge(sources: Vec<Observable<T>>) -> Observable<T> {
        Observable::new(move |downstream| {
            if sources.is_empty() {
                downstream.on_complete();
                return Subscription::empty();
            }

            let remaining = Rc::new(Cell::new(sources.len()));
            let subscriptions = sources
                .iter()
                .map(|source| {
                    let next_target = downstream.clone();
                    let complete_target = downstream.clone();
                    let remaining = Rc::clone(&remaining);
                    source.subscribe(Subscriber::new(
                        move |item| next_target.on_next(item),
                        move || {
                            remaining.set(remaining.get() - 1);
                            if remaining.get() == 0 {
                                complete_target.on_complete();
                            }
                        },
                    ))
                })
                .collect();

            Subscription::join(subscriptions)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rx::Subject;
    use std::cell::RefCell;

    fn collector<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, Subscriber<T>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, Subscriber::next_only(move |x| sink.borrow_mut().push(x)))
    }

    #[test]
    fn filter_drops_non_matching() {
        let subject = Subject::new();
        let (seen, sub) = collector();
        let _keep = subject.observable().filter(|x: &i32| x % 2 == 0).subscribe(sub);

        for x in 1..=4 {
            subject.next(x);
        }
        assert_eq!(*seen.borrow(), vec![2, 4]);
    }

    #[test]
    fn map_transforms_items() {
        let subject = Subject::new();
        let (seen, sub) = collector();
        let _keep = subject.observable().map(|x: i32| x * 10).subscribe(sub);

        subject.next(3);
        assert_eq!(*seen.borrow(), vec![30]);
    }

    #[test]
    fn merge_interleaves_by_arrival() {
        let left = Subject::new();
        let right = Subject::new();
        let merged = Observable::merge(vec![left.observable(), right.observable()]);
        let (seen, sub) = collector();
        let _keep = merged.subscribe(sub);

        left.next(1);
        right.next(2);
        left.next(3);
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn merge_completes_after_all_sources() {
        let left = Subject::new();
        let right = Subject::new();
        let merged = Observable::merge(vec![left.observable(), right.observable()]);

        let completed = Rc::new(Cell::new(false));
        let c = Rc::clone(&completed);
        let _keep = merged.subscribe(Subscriber::new(|_: i32| {}, move || c.set(true)));

        left.complete();
        assert!(!completed.get());
        right.complete();
        assert!(completed.get());
    }

    #[test]
    fn merge_of_nothing_completes_immediately() {
        let completed = Rc::new(Cell::new(false));
        let c = Rc::clone(&completed);
        let _keep = Observable::<i32>::merge(vec![])
            .subscribe(Subscriber::new(|_| {}, move || c.set(true)));
        assert!(completed.get());
    }

    #[test]
    fn lazy_until_subscribed() {
        let touched = Rc::new(Cell::new(false));
        let t = Rc::clone(&touched);
        let obs = Observable::new(move |sub: Subscriber<i32>| {
            t.set(true);
            sub.on_complete();
            Subscription::empty()
        });

        let chained = obs.filter(|_| true).map(|x| x);
        assert!(!touched.get());
        let _keep = chained.subscribe_next(|_| {});
        assert!(touched.get());
    }
}
