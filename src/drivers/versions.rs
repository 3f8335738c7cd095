//! The `versions` driver: version discovery documents for any service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::app::{App, LoadError};
use crate::backend;
use crate::drivers::Driver;
use crate::errors::ApiError;
use crate::http::{ApiResponse, PathParams, RequestContext, Resource};
use crate::routing::{Dispatcher, RoutingError};
use crate::services::{self, ApiVersion};

/// Endpoint names that list every version.
const INDEX_ENDPOINTS: &[&str] = &["index", "versions"];

#[derive(Debug, Default)]
pub struct VersionsDriver;

impl Driver for VersionsDriver {
    fn name(&self) -> &str {
        "versions"
    }

    fn setup_routes(
        &self,
        app: &mut App,
        service: &str,
        disp: &mut Dispatcher,
    ) -> Result<(), LoadError> {
        let module =
            services::lookup(service).ok_or_else(|| LoadError::UnknownService(service.to_string()))?;

        let index: Arc<dyn Resource> = Arc::new(VersionIndex::new(service, module.versions));
        for endpoint in INDEX_ENDPOINTS {
            if disp.table().contains(endpoint) {
                disp.set_handler(endpoint, index.clone())?;
            }
        }

        for version in module.versions {
            let detail: Arc<dyn Resource> = Arc::new(VersionDetail::new(service, *version));
            for endpoint in version.endpoints {
                if disp.table().contains(endpoint) {
                    disp.set_handler(endpoint, detail.clone())?;
                }
            }
        }

        backend::install(app)
    }
}

fn version_document(
    req: &RequestContext,
    service: &str,
    version: &ApiVersion,
) -> Result<Value, RoutingError> {
    let href = req.endpoint_url(service, version.self_endpoint(), &PathParams::new())?;
    let mut doc = json!({
        "id": version.id,
        "links": [{"href": href, "rel": "self"}],
        "status": version.status,
    });
    if !version.updated.is_empty() {
        doc["updated"] = json!(version.updated);
    }
    Ok(doc)
}

/// Lists every advertised version of one service.
pub struct VersionIndex {
    service: String,
    versions: &'static [ApiVersion],
}

impl VersionIndex {
    pub fn new(service: impl Into<String>, versions: &'static [ApiVersion]) -> Self {
        Self {
            service: service.into(),
            versions,
        }
    }
}

#[async_trait]
impl Resource for VersionIndex {
    async fn on_get(
        &self,
        req: &RequestContext,
        resp: &mut ApiResponse,
        _params: &PathParams,
    ) -> Result<(), ApiError> {
        let versions = self
            .versions
            .iter()
            .map(|v| version_document(req, &self.service, v))
            .collect::<Result<Vec<_>, _>>()?;
        resp.set_json(200, json!({ "versions": versions }));
        Ok(())
    }
}

/// Describes one version.
pub struct VersionDetail {
    service: String,
    version: ApiVersion,
}

impl VersionDetail {
    pub fn new(service: impl Into<String>, version: ApiVersion) -> Self {
        Self {
            service: service.into(),
            version,
        }
    }
}

#[async_trait]
impl Resource for VersionDetail {
    async fn on_get(
        &self,
        req: &RequestContext,
        resp: &mut ApiResponse,
        _params: &PathParams,
    ) -> Result<(), ApiError> {
        let mut doc = version_document(req, &self.service, &self.version)?;
        doc["version"] = json!("");
        doc["min_version"] = json!("");
        resp.set_json(200, json!({ "version": doc }));
        Ok(())
    }
}
