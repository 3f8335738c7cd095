//! Per-service dispatcher: a route table plus the handlers bound to it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::http::{PathParams, RequestContext, Resource};
use crate::routing::{RouteTable, RoutingError, UrlTemplate};

/// A declared endpoint that has a handler.
#[derive(Clone)]
pub struct Route {
    pub endpoint: String,
    /// Mount plus template.
    pub pattern: UrlTemplate,
    pub handler: Arc<dyn Resource>,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("endpoint", &self.endpoint)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct Dispatcher {
    table: RouteTable,
    handlers: HashMap<String, Arc<dyn Resource>>,
}

impl Dispatcher {
    pub fn new(mount: impl Into<String>) -> Self {
        Self {
            table: RouteTable::new(mount),
            handlers: HashMap::new(),
        }
    }

    pub fn mount(&self) -> &str {
        self.table.mount()
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn add_endpoint(&mut self, name: &str, template: &str) -> Result<(), RoutingError> {
        self.table.add_endpoint(name, template)
    }

    /// Bind (or rebind) the handler of a declared endpoint.
    pub fn set_handler(
        &mut self,
        name: &str,
        handler: Arc<dyn Resource>,
    ) -> Result<(), RoutingError> {
        if !self.table.contains(name) {
            return Err(RoutingError::UnknownEndpoint(name.to_string()));
        }
        if self.handlers.insert(name.to_string(), handler).is_some() {
            tracing::debug!(endpoint = %name, "Replacing handler");
        }
        Ok(())
    }

    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Every endpoint with a handler, in declaration order. Endpoints still
    /// waiting for a handler are left to the not-implemented fallback.
    pub fn get_routes(&self) -> Vec<Route> {
        self.table
            .names()
            .filter_map(|name| {
                let handler = self.handlers.get(name)?;
                let pattern = self.table.concrete_template(name).ok()?;
                Some(Route {
                    endpoint: name.to_string(),
                    pattern: pattern.clone(),
                    handler: handler.clone(),
                })
            })
            .collect()
    }

    pub fn resolve_url(
        &self,
        req: &RequestContext,
        name: &str,
        params: &PathParams,
    ) -> Result<String, RoutingError> {
        self.table.resolve_url(req, name, params)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("mount", &self.table.mount())
            .field("endpoints", &self.table.len())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
