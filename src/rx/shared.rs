// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::cell::RefCell;
use std::rc::Rc;

use crate::rx::{Observable, Subject, Subscription};

struct ShareState {
    upstream: Option<Subscription>,
    active: usize,
}

impl<T: Clone + 'static> Observable<T> {
    /// Ref-counted multicast, the `publish().ref_count()` of reactive
    /// frameworks: all downstream subscribers share a single upstream
    /// subscription through an internal subject. The upstream is
    /// subscribed when the first downstream attaches and dropped when the
    /// last one detaches, so a fan-out node's work runs once no matter
    /// how many children listen.
    pub fn share(&self) -> Observable<T> {
        let source = self.clone();
        let subject: Subject<T> = Subject::new();
        let state = Rc::new(RefCell::new(ShareState {
            upstream: None,
            active: 0,
        }));

        Observable::new(move |subscriber| {
            // Attach downstream first so synchronous emissions from the
            // upstream subscribe are not lost.
            let inner = subject.observable().subscribe(subscriber);

            {
                let mut st = state.borrow_mut();
                st.active += 1;
                if st.upstream.is_none() {
                    let feed = subject.subscriber();
                    drop(st);
                    let upstream = source.subscribe(feed);
                    state.borrow_mut().upstream = Some(upstream);
                }
            }

            let state = Rc::clone(&state);
            Subscription::new(move || {
                drop(inner);
                let upstream = {
                    let mut st = state.borrow_mut();
                    st.active -= 1;
                    if st.active == 0 {
                        st.upstream.take()
                    } else {
                        None
                    }
                };
                drop(upstream);
            })
        })
    }
}
