// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Minimal push-stream runtime backing the dataflow graph.
//!
//! The pipeline needs four reactive primitives and nothing more:
//!
//! * [`Subscriber`] - the downstream capability: `on_next` + `on_complete`.
//! * [`Observable`] - a lazy stream; composition (filter, map, merge)
//!   builds closures, and nothing runs until something subscribes.
//! * [`Subject`] - a hot multicast source that broadcasts each item to
//!   every current subscriber. Late subscribers only see future items.
//! * [`Observable::share`] - ref-counted publishing: one upstream
//!   subscription is held while at least one downstream subscriber exists,
//!   so fan-out does not re-run the upstream chain.
//!
//! Everything here is thread-confined: one router instance, one thread.
//! Ownership is `Rc`-based and subscriptions hold weak back-references to
//! their subject, so dropping the owning side releases the whole graph.
//! A [`Subscription`] detaches on drop; hold it for as long as the
//! subscriber should stay attached.

mod observable;
mod shared;
mod subject;
mod subscriber;
mod subscription;

pub use observable::Observable;
pub use subject::Subject;
pub use subscriber::Subscriber;
pub use subscription::Subscription;
