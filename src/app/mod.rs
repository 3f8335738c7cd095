//! Application composition.
//!
//! # Data Flow
//! ```text
//! ShimConfig
//!     → App::new (hook modules loaded into the registry, "core" first)
//!     → load_endpoints (one Dispatcher per enabled service, names only)
//!     → load_drivers (configured driver binds handlers, adds hooks
//!                     and error handlers)
//!     → make_api (hook chains + error translator + compiled routes)
//!     → api.rs (Api::handle per request)
//! ```
//!
//! # Design Decisions
//! - Everything is mutated during startup only; the built `Api` is immutable
//! - Hooks added by drivers are de-duplicated by name
//! - Before chain: required → optional → app-added (app hooks see the
//!   validated token)
//! - Services that are not enabled are still reported by `installed_modules`

pub mod api;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::auth::{shared_settings, AuthSettings, TokenStore, TokenValidator};
use crate::config::{ServiceConfig, ShimConfig};
use crate::drivers::DriverRegistry;
use crate::errors::{ApiError, ErrorHandlers, ErrorKind, ErrorTranslator};
use crate::hooks::{
    AfterChain, AfterHook, BeforeChain, BeforeHook, HookCatalog, HookDeps, HookRegistry,
};
use crate::http::{ApiResponse, NotImplemented, PathParams, RequestContext, Resource};
use crate::routing::{Dispatcher, RouteSet, RoutingError, ServiceDirectory};
use crate::services;

pub use api::Api;

/// Errors raised while composing the application.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unknown hook module '{0}'")]
    UnknownHookModule(String),

    #[error("unknown service '{0}'")]
    UnknownService(String),

    #[error("service '{0}' has no configuration section")]
    MissingServiceConfig(String),

    #[error("service '{service}' uses unknown driver '{driver}'")]
    UnknownDriver { service: String, driver: String },

    #[error("backend setup failed: {0}")]
    Backend(String),

    #[error("invalid no-auth route: {0}")]
    InvalidAuthRoute(#[from] regex::Error),

    #[error(transparent)]
    Routing(#[from] RoutingError),
}

pub struct App {
    config: Arc<ShimConfig>,
    hooks: Arc<HookRegistry>,
    deps: HookDeps,
    drivers: DriverRegistry,

    /// Required hooks, copied when the app was created.
    required_before: Vec<Arc<dyn BeforeHook>>,
    required_after: Vec<Arc<dyn AfterHook>>,
    /// Hooks added by drivers and callers.
    before_hooks: Vec<Arc<dyn BeforeHook>>,
    after_hooks: Vec<Arc<dyn AfterHook>>,

    error_handlers: ErrorHandlers,
    default_route: Option<Arc<dyn Resource>>,

    installed_modules: BTreeMap<String, bool>,
    endpoints_loaded: bool,
    dispatchers: BTreeMap<String, Dispatcher>,
}

impl App {
    /// Build an app with the built-in hook modules and drivers, an
    /// in-memory token store and auth settings taken from `config`.
    pub fn from_config(config: ShimConfig) -> Result<Self, LoadError> {
        let settings = shared_settings(AuthSettings::from_config(&config.auth)?);
        let tokens: Arc<dyn TokenValidator> = Arc::new(TokenStore::new());
        Self::new(
            config,
            Arc::new(HookRegistry::new()),
            HookDeps::new(settings, tokens),
        )
    }

    pub fn new(
        config: ShimConfig,
        hooks: Arc<HookRegistry>,
        deps: HookDeps,
    ) -> Result<Self, LoadError> {
        Self::with_catalog(config, hooks, deps, &HookCatalog::builtin(), DriverRegistry::builtin())
    }

    /// Load the configured hook modules from `catalog` and snapshot the
    /// required hooks.
    pub fn with_catalog(
        config: ShimConfig,
        hooks: Arc<HookRegistry>,
        deps: HookDeps,
        catalog: &HookCatalog,
        drivers: DriverRegistry,
    ) -> Result<Self, LoadError> {
        hooks.load_hooks(
            catalog,
            &config.hooks.request_hooks,
            &config.hooks.response_hooks,
            &deps,
        )?;

        Ok(Self {
            required_before: hooks.required_before_hooks(),
            required_after: hooks.required_after_hooks(),
            config: Arc::new(config),
            hooks,
            deps,
            drivers,
            before_hooks: Vec::new(),
            after_hooks: Vec::new(),
            error_handlers: ErrorHandlers::new(),
            default_route: None,
            installed_modules: BTreeMap::new(),
            endpoints_loaded: false,
            dispatchers: BTreeMap::new(),
        })
    }

    pub fn config(&self) -> &ShimConfig {
        &self.config
    }

    pub fn hooks(&self) -> &Arc<HookRegistry> {
        &self.hooks
    }

    pub fn deps(&self) -> &HookDeps {
        &self.deps
    }

    pub fn drivers_mut(&mut self) -> &mut DriverRegistry {
        &mut self.drivers
    }

    /// Append a before-hook unless one with the same name is present.
    pub fn add_before_hook(&mut self, hook: Arc<dyn BeforeHook>) -> bool {
        if self.before_hooks.iter().any(|h| h.name() == hook.name()) {
            return false;
        }
        tracing::debug!(hook = %hook.name(), "Adding app before hook");
        self.before_hooks.push(hook);
        true
    }

    /// Append an after-hook unless one with the same name is present.
    pub fn add_after_hook(&mut self, hook: Arc<dyn AfterHook>) -> bool {
        if self.after_hooks.iter().any(|h| h.name() == hook.name()) {
            return false;
        }
        tracing::debug!(hook = %hook.name(), "Adding app after hook");
        self.after_hooks.push(hook);
        true
    }

    /// Register an error handler. The same (kind, name) pair is kept once.
    pub fn add_error_handler<F>(&mut self, kind: ErrorKind, name: &str, handler: F) -> bool
    where
        F: Fn(&ApiError, &RequestContext, &PathParams) -> ApiResponse + Send + Sync + 'static,
    {
        self.error_handlers.add(kind, name, handler)
    }

    pub fn error_handlers(&self) -> &ErrorHandlers {
        &self.error_handlers
    }

    /// Replace the not-implemented fallback for unmatched paths.
    pub fn set_default_route(&mut self, route: Arc<dyn Resource>) {
        self.default_route = Some(route);
    }

    pub fn add_dispatcher(&mut self, service: impl Into<String>, disp: Dispatcher) {
        self.dispatchers.insert(service.into(), disp);
    }

    pub fn dispatcher(&self, service: &str) -> Option<&Dispatcher> {
        self.dispatchers.get(service)
    }

    pub fn dispatcher_mut(&mut self, service: &str) -> Option<&mut Dispatcher> {
        self.dispatchers.get_mut(service)
    }

    /// `{service → installed}` for every supported service.
    pub fn installed_modules(&self) -> &BTreeMap<String, bool> {
        &self.installed_modules
    }

    /// Absolute URL of `endpoint` in `service` for the current request.
    pub fn get_endpoint_url(
        &self,
        service: &str,
        req: &RequestContext,
        endpoint: &str,
        params: &PathParams,
    ) -> Result<String, RoutingError> {
        self.dispatchers
            .get(service)
            .ok_or_else(|| RoutingError::UnknownService(service.to_string()))?
            .resolve_url(req, endpoint, params)
    }

    /// Declare the endpoints of every enabled service. Runs once.
    pub fn load_endpoints(&mut self) -> Result<(), LoadError> {
        if self.endpoints_loaded {
            return Ok(());
        }

        for &name in services::SUPPORTED_SERVICES {
            if !self.config.is_enabled(name) {
                tracing::debug!(service = %name, "Service not enabled");
                self.installed_modules.insert(name.to_string(), false);
                continue;
            }

            let module =
                services::lookup(name).ok_or_else(|| LoadError::UnknownService(name.to_string()))?;
            let mount = self.service_config(name)?.mount.clone();

            tracing::info!(service = %name, mount = %mount, "Loading endpoints");
            let mut disp = Dispatcher::new(mount);
            (module.declare_endpoints)(&mut disp)?;

            self.add_dispatcher(name, disp);
            self.installed_modules.insert(name.to_string(), true);
        }

        self.endpoints_loaded = true;
        Ok(())
    }

    /// Let each service's configured driver bind handlers.
    pub fn load_drivers(&mut self) -> Result<(), LoadError> {
        let mut dispatchers = std::mem::take(&mut self.dispatchers);
        let result = dispatchers
            .iter_mut()
            .try_for_each(|(service, disp)| self.setup_driver(service, disp));

        // Dispatchers added by drivers take precedence.
        dispatchers.append(&mut self.dispatchers);
        self.dispatchers = dispatchers;
        result
    }

    fn setup_driver(&mut self, service: &str, disp: &mut Dispatcher) -> Result<(), LoadError> {
        let driver_name = self.service_config(service)?.driver.clone();
        let driver = self
            .drivers
            .get(&driver_name)
            .ok_or_else(|| LoadError::UnknownDriver {
                service: service.to_string(),
                driver: driver_name.clone(),
            })?;

        tracing::info!(service = %service, driver = %driver_name, "Loading driver");
        driver.setup_routes(self, service, disp)
    }

    fn service_config(&self, service: &str) -> Result<&ServiceConfig, LoadError> {
        self.config
            .services
            .get(service)
            .ok_or_else(|| LoadError::MissingServiceConfig(service.to_string()))
    }

    /// Freeze hooks, error handlers and routes into a servable API.
    pub fn make_api(&self) -> Api {
        let required_before = BeforeChain::new(self.required_before.clone());
        let before: Vec<Arc<dyn BeforeHook>> = self
            .required_before
            .iter()
            .cloned()
            .chain(self.hooks.optional_before_hooks())
            .chain(self.before_hooks.iter().cloned())
            .collect();
        let after: Vec<Arc<dyn AfterHook>> = self
            .required_after
            .iter()
            .cloned()
            .chain(self.hooks.optional_after_hooks())
            .chain(self.after_hooks.iter().cloned())
            .collect();
        let after = AfterChain::new(after);

        let mut handlers = ErrorHandlers::builtin();
        handlers.extend(&self.error_handlers);

        let mut routes = RouteSet::new();
        let mut directory = ServiceDirectory::new();
        for (service, disp) in &self.dispatchers {
            for route in disp.get_routes() {
                let alias = route.pattern.with_suffix(".json");
                routes.add(service, &route.endpoint, route.pattern, route.handler.clone());
                routes.add(service, &route.endpoint, alias, route.handler);
            }
            directory.insert(service.clone(), disp.table().clone());
        }

        let default_route = self
            .default_route
            .clone()
            .unwrap_or_else(|| Arc::new(NotImplemented));

        tracing::info!(
            routes = routes.len(),
            before_hooks = before.len(),
            after_hooks = after.len(),
            error_handlers = handlers.len(),
            "API assembled"
        );

        Api::new(
            required_before,
            BeforeChain::new(before),
            after.clone(),
            routes,
            default_route,
            ErrorTranslator::new(handlers, after),
            Arc::new(directory),
            Duration::from_secs(self.config.timeouts.request_secs),
        )
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("installed_modules", &self.installed_modules)
            .field("dispatchers", &self.dispatchers)
            .field("drivers", &self.drivers)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::before_fn;
    use axum::http::Method;

    fn app() -> App {
        App::from_config(ShimConfig::default()).unwrap()
    }

    #[test]
    fn test_required_hooks_snapshot() {
        let app = app();
        let names: Vec<_> = app.required_before.iter().map(|h| h.name().to_string()).collect();
        assert_eq!(names, vec!["set_request_id"]);
        assert!(app.hooks().is_loaded());
    }

    #[test]
    fn test_unknown_hook_module() {
        let mut config = ShimConfig::default();
        config.hooks.request_hooks.push("nope".into());
        assert!(matches!(
            App::from_config(config),
            Err(LoadError::UnknownHookModule(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_add_before_hook_dedupes_by_name() {
        let mut app = app();
        assert!(app.add_before_hook(Arc::new(before_fn("tag", |_, _| Ok(())))));
        assert!(!app.add_before_hook(Arc::new(before_fn("tag", |_, _| Ok(())))));
        assert_eq!(app.before_hooks.len(), 1);
    }

    #[test]
    fn test_load_endpoints_is_idempotent() {
        let mut app = app();
        app.load_endpoints().unwrap();
        app.load_endpoints().unwrap();
        assert_eq!(app.installed_modules().len(), services::SUPPORTED_SERVICES.len());
        assert!(!app.installed_modules()["baremetal"]);
        assert!(app.installed_modules()["compute"]);
        assert_eq!(app.dispatcher("compute").map(|d| d.mount()), Some("/compute"));
        assert!(app.dispatcher("baremetal").is_none());
    }

    #[test]
    fn test_missing_service_section() {
        let mut config = ShimConfig::default();
        config.services.remove("image");
        let mut app = App::from_config(config).unwrap();
        assert!(matches!(
            app.load_endpoints(),
            Err(LoadError::MissingServiceConfig(name)) if name == "image"
        ));
    }

    #[test]
    fn test_unknown_driver() {
        let mut config = ShimConfig::default();
        config.enabled_services = vec!["network".into()];
        if let Some(network) = config.services.get_mut("network") {
            network.driver = "sl".into();
        }
        let mut app = App::from_config(config).unwrap();
        app.load_endpoints().unwrap();
        let err = app.load_drivers().unwrap_err();
        assert_eq!(err.to_string(), "service 'network' uses unknown driver 'sl'");
        assert!(app.dispatcher("network").is_some());
    }

    #[test]
    fn test_get_endpoint_url_unknown_service() {
        let app = app();
        let req = RequestContext::new(Method::GET, "/");
        assert_eq!(
            app.get_endpoint_url("compute", &req, "index", &PathParams::new()),
            Err(RoutingError::UnknownService("compute".into()))
        );
    }
}
