//! Frozen route tables of every installed service, for link building.

use std::collections::BTreeMap;

use crate::http::{PathParams, RequestContext};
use crate::routing::{RouteTable, RoutingError};

#[derive(Debug, Clone, Default)]
pub struct ServiceDirectory {
    tables: BTreeMap<String, RouteTable>,
}

impl ServiceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, service: impl Into<String>, table: RouteTable) {
        self.tables.insert(service.into(), table);
    }

    pub fn table(&self, service: &str) -> Option<&RouteTable> {
        self.tables.get(service)
    }

    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn endpoint_url(
        &self,
        service: &str,
        req: &RequestContext,
        endpoint: &str,
        params: &PathParams,
    ) -> Result<String, RoutingError> {
        self.tables
            .get(service)
            .ok_or_else(|| RoutingError::UnknownService(service.to_string()))?
            .resolve_url(req, endpoint, params)
    }
}
