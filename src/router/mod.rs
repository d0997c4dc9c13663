// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The router: owns the live environments and the named routes feeding
//! them from one shared multicast source.
//!
//! A route binds a predicate to an environment; every event published
//! with [`Router::route_event`] is multicast to all routes, and each
//! route forwards the events its predicate accepts into its
//! environment's graph root. Environments are compiled on first use from
//! the injected catalog and reference-counted by the routes that target
//! them. Everything is thread-confined: the caller serializes
//! `route_event` and the administrative calls.


use std::collections::HashMap;
use std::rc::Rc;

use crate::builder::{build_environment, AssetBuilders, Environment};
use crate::catalog::Catalog;
use crate::document::Event;
use crate::errors::RouterError;
use crate::observability::messages::protocol::EventDropped;
use crate::observability::messages::router::{EnvironmentCompiled, RouteAdded, RouteRemoved};
use crate::observability::messages::StructuredLog;
use crate::protocol::parse_event;
use crate::rx::{Subject, Subscription};

/// A named predicate -> environment binding. Dropping the route's
/// subscription handle detaches it from the shared source; events already
/// inside the environment complete normally.
pub struct Route {
    name: String,
    environment: String,
    _subscription: Subscription,
}

impl Route {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }
}

struct EnvironmentEntry {
    environment: Rc<Environment>,
    routes: usize,
}

pub struct Router<C: Catalog> {
    catalog: C,
    builders: AssetBuilders,
    environments: HashMap<String, EnvironmentEntry>,
    routes: HashMap<String, Route>,
    source: Subject<Event>,
}

impl<C: Catalog> Router<C> {
    /// Builds a router around an injected catalog, compiling assets with
    /// the default builders.
    pub fn new(catalog: C) -> Self {
        Self::with_builders(catalog, AssetBuilders::default())
    }

    pub fn with_builders(catalog: C, builders: AssetBuilders) -> Self {
        Self {
            catalog,
            builders,
            environments: HashMap::new(),
            routes: HashMap::new(),
            source: Subject::new(),
        }
    }

    /// Adds a route forwarding events accepted by `predicate` into
    /// `environment`. The environment is fetched from the catalog and
    /// compiled if this is the first route targeting it; a compile or
    /// catalog failure leaves the router unchanged.
    pub fn add(
        &mut self,
        route: &str,
        environment: &str,
        predicate: impl Fn(&Event) -> bool + 'static,
    ) -> Result<(), RouterError> {
        if self.routes.contains_key(route) {
            return Err(RouterError::DuplicateRoute(route.to_owned()));
        }

        if !self.environments.contains_key(environment) {
            let definition = self.catalog.environment_definition(environment)?;
            let compiled = build_environment(&definition, &self.builders)?;
            EnvironmentCompiled {
                environment,
                nodes: compiled.graph().len(),
            }
            .log();
            self.environments.insert(
                environment.to_owned(),
                EnvironmentEntry {
                    environment: Rc::new(compiled),
                    routes: 0,
                },
            );
        }

        let entry = self
            .environments
            .get_mut(environment)
            .ok_or_else(|| RouterError::UnknownEnvironment(environment.to_owned()))?;

        // The source subject multicasts; each route gets its own filtered
        // subscription into the environment root.
        let subscription = self
            .source
            .observable()
            .filter(predicate)
            .subscribe(entry.environment.input());
        entry.routes += 1;
        self.routes.insert(
            route.to_owned(),
            Route {
                name: route.to_owned(),
                environment: environment.to_owned(),
                _subscription: subscription,
            },
        );

        RouteAdded { route, environment }.log();
        Ok(())
    }

    /// Adds a route that forwards every event.
    pub fn add_unfiltered(&mut self, route: &str, environment: &str) -> Result<(), RouterError> {
        self.add(route, environment, |_| true)
    }

    /// Detaches and erases a route. The target environment is dropped
    /// only when no other route references it.
    pub fn remove(&mut self, route: &str) -> Result<(), RouterError> {
        let removed = self
            .routes
            .remove(route)
            .ok_or_else(|| RouterError::UnknownRoute(route.to_owned()))?;

        let mut environment_dropped = false;
        if let Some(entry) = self.environments.get_mut(removed.environment()) {
            entry.routes -= 1;
            if entry.routes == 0 {
                self.environments.remove(removed.environment());
                environment_dropped = true;
            }
        }

        RouteRemoved {
            route,
            environment: removed.environment(),
            environment_dropped,
        }
        .log();
        Ok(())
    }

    /// Parses a raw payload and publishes it to the shared source. A
    /// parse failure drops only that event.
    pub fn route_event(&self, payload: &str) {
        match parse_event(payload) {
            Ok(document) => self.source.next(Rc::new(document)),
            Err(error) => EventDropped { error: &error }.log(),
        }
    }

    pub fn environment(&self, name: &str) -> Option<&Environment> {
        self.environments.get(name).map(|e| &*e.environment)
    }

    pub fn route(&self, name: &str) -> Option<&Route> {
        self.routes.get(name)
    }

    /// Attaches `handler` to one asset's trace sink inside an
    /// environment. The handler runs synchronously on the publishing
    /// thread and must not re-enter the router.
    pub fn subscribe_trace_sink(
        &self,
        environment: &str,
        asset: &str,
        handler: impl Fn(String) + 'static,
    ) -> Result<Subscription, RouterError> {
        let entry = self
            .environments
            .get(environment)
            .ok_or_else(|| RouterError::UnknownEnvironment(environment.to_owned()))?;

        entry
            .environment
            .subscribe_trace_sink(asset, handler)
            .ok_or_else(|| RouterError::UnknownAsset {
                environment: environment.to_owned(),
                asset: asset.to_owned(),
            })
    }

    /// Attaches `handler` to every trace sink of an environment.
    pub fn subscribe_all_trace_sinks(
        &self,
        environment: &str,
        handler: impl Fn(String) + 'static,
    ) -> Result<Vec<Subscription>, RouterError> {
        let entry = self
            .environments
            .get(environment)
            .ok_or_else(|| RouterError::UnknownEnvironment(environment.to_owned()))?;

        Ok(entry.environment.subscribe_all_trace_sinks(handler))
    }
}

impl<C: Catalog> Drop for Router<C> {
    // Completing the source propagates through every environment and
    // terminates all subscriptions.
    fn drop(&mut self) {
        self.source.complete();
    }
}
