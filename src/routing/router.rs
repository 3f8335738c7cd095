//! Compiled route lookup.
//!
//! # Responsibilities
//! - Store every (pattern, handler) pair across services
//! - Look up the route for a request path
//! - Return the matched route or an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (shared without locks)
//! - O(n) scan over patterns (acceptable for API-sized route tables)
//! - More literal segments win, so `/volumes/detail` beats `/volumes/{id}`
//! - Ties go to the route added first

use std::cmp::Reverse;
use std::sync::Arc;

use crate::http::{PathParams, Resource};
use crate::routing::UrlTemplate;

struct CompiledRoute {
    service: String,
    endpoint: String,
    pattern: UrlTemplate,
    literals: usize,
    handler: Arc<dyn Resource>,
}

/// A successful lookup.
pub struct RouteMatch<'a> {
    pub service: &'a str,
    pub endpoint: &'a str,
    pub handler: Arc<dyn Resource>,
    pub params: PathParams,
}

#[derive(Default)]
pub struct RouteSet {
    routes: Vec<CompiledRoute>,
}

impl RouteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        service: &str,
        endpoint: &str,
        pattern: UrlTemplate,
        handler: Arc<dyn Resource>,
    ) {
        tracing::debug!(service = %service, endpoint = %endpoint, pattern = %pattern, "Loading endpoint");
        self.routes.push(CompiledRoute {
            service: service.to_string(),
            endpoint: endpoint.to_string(),
            literals: pattern.literal_count(),
            pattern,
            handler,
        });
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// (service, endpoint, pattern) in insertion order.
    pub fn patterns(&self) -> impl Iterator<Item = (&str, &str, &UrlTemplate)> {
        self.routes
            .iter()
            .map(|r| (r.service.as_str(), r.endpoint.as_str(), &r.pattern))
    }

    pub fn match_path(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.routes
            .iter()
            .enumerate()
            .filter_map(|(i, route)| route.pattern.matches(path).map(|params| (i, route, params)))
            .max_by_key(|(i, route, _)| (route.literals, Reverse(*i)))
            .map(|(_, route, params)| RouteMatch {
                service: &route.service,
                endpoint: &route.endpoint,
                handler: route.handler.clone(),
                params,
            })
    }
}
