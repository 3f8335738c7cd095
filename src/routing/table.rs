//! Named endpoint declarations for one service.

use std::collections::HashMap;

use crate::http::{PathParams, RequestContext};
use crate::routing::{RoutingError, UrlTemplate};

#[derive(Debug, Clone)]
struct Endpoint {
    name: String,
    /// Template as declared, relative to the mount.
    declared: UrlTemplate,
    /// Mount plus template.
    concrete: UrlTemplate,
}

/// Endpoint name → URL template, under a mount prefix.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    mount: String,
    endpoints: Vec<Endpoint>,
    index: HashMap<String, usize>,
}

impl RouteTable {
    pub fn new(mount: impl Into<String>) -> Self {
        let mount = mount.into().trim_end_matches('/').to_string();
        Self {
            mount,
            ..Self::default()
        }
    }

    pub fn mount(&self) -> &str {
        &self.mount
    }

    /// Declare `name`. Declaring it again with the same template is a no-op;
    /// a different template is rejected.
    pub fn add_endpoint(&mut self, name: &str, template: &str) -> Result<(), RoutingError> {
        let declared = UrlTemplate::parse(template)?;

        if let Some(&i) = self.index.get(name) {
            let existing = &self.endpoints[i].declared;
            if *existing == declared {
                return Ok(());
            }
            return Err(RoutingError::DuplicateEndpoint {
                name: name.to_string(),
                existing: existing.to_string(),
                requested: declared.to_string(),
            });
        }

        let concrete = UrlTemplate::join(&self.mount, declared.as_str())?;
        self.index.insert(name.to_string(), self.endpoints.len());
        self.endpoints.push(Endpoint {
            name: name.to_string(),
            declared,
            concrete,
        });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Endpoint names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// The template of `name` including the mount.
    pub fn concrete_template(&self, name: &str) -> Result<&UrlTemplate, RoutingError> {
        self.index
            .get(name)
            .map(|&i| &self.endpoints[i].concrete)
            .ok_or_else(|| RoutingError::UnknownEndpoint(name.to_string()))
    }

    /// Absolute URL of `name` for the current request.
    ///
    /// Parameters missing from `params` fall back to request state
    /// (`tenant_id`) before the lookup fails.
    pub fn resolve_url(
        &self,
        req: &RequestContext,
        name: &str,
        params: &PathParams,
    ) -> Result<String, RoutingError> {
        let template = self.concrete_template(name)?;
        let path = template
            .expand(|param| {
                params
                    .get(param)
                    .map(str::to_string)
                    .or_else(|| request_param(req, param))
            })
            .map_err(|param| RoutingError::MissingParameter {
                endpoint: name.to_string(),
                param,
            })?;
        Ok(format!("{}{}", req.base_url(), path))
    }
}

fn request_param(req: &RequestContext, param: &str) -> Option<String> {
    match param {
        "tenant_id" => req.tenant_id().map(str::to_string),
        _ => None,
    }
}
