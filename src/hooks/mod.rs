//! Hook pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     configured module names ("core" first)
//!     → catalog.rs (module name → installer)
//!     → HookRegistry (required/optional × before/after lists)
//!     → snapshots frozen into chain.rs (BeforeChain, AfterChain)
//!
//! Per request:
//!     RequestContext
//!     → BeforeChain: required-before → optional-before
//!     → resource handler
//!     → AfterChain: required-after → optional-after
//! ```
//!
//! # Design Decisions
//! - The registry is an explicit object handed to the app, not a global
//! - Snapshots are copies, so later registrations never change a built API
//! - Hooks are synchronous and run strictly in registration order

pub mod admin_token;
pub mod auth_token;
pub mod catalog;
pub mod chain;
pub mod log;
pub mod required;

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::app::LoadError;
use crate::errors::ApiError;
use crate::http::{ApiResponse, PathParams, RequestContext};

pub use catalog::{HookCatalog, HookDeps, HookInstaller};
pub use chain::{AfterChain, BeforeChain};

/// Runs before the handler and may reject the request.
pub trait BeforeHook: Send + Sync {
    fn name(&self) -> &str;

    fn before(&self, req: &mut RequestContext, params: &PathParams) -> Result<(), ApiError>;
}

/// Runs after the handler (or the error translator) and may rewrite the
/// response.
pub trait AfterHook: Send + Sync {
    fn name(&self) -> &str;

    fn after(&self, req: &RequestContext, resp: ApiResponse) -> ApiResponse;
}

/// A before-hook backed by a closure.
pub struct FnBeforeHook<F> {
    name: String,
    f: F,
}

impl<F> BeforeHook for FnBeforeHook<F>
where
    F: Fn(&mut RequestContext, &PathParams) -> Result<(), ApiError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn before(&self, req: &mut RequestContext, params: &PathParams) -> Result<(), ApiError> {
        (self.f)(req, params)
    }
}

pub fn before_fn<F>(name: impl Into<String>, f: F) -> FnBeforeHook<F>
where
    F: Fn(&mut RequestContext, &PathParams) -> Result<(), ApiError> + Send + Sync,
{
    FnBeforeHook {
        name: name.into(),
        f,
    }
}

/// An after-hook backed by a closure.
pub struct FnAfterHook<F> {
    name: String,
    f: F,
}

impl<F> AfterHook for FnAfterHook<F>
where
    F: Fn(&RequestContext, ApiResponse) -> ApiResponse + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn after(&self, req: &RequestContext, resp: ApiResponse) -> ApiResponse {
        (self.f)(req, resp)
    }
}

pub fn after_fn<F>(name: impl Into<String>, f: F) -> FnAfterHook<F>
where
    F: Fn(&RequestContext, ApiResponse) -> ApiResponse + Send + Sync,
{
    FnAfterHook {
        name: name.into(),
        f,
    }
}

/// The four ordered hook lists.
#[derive(Default, Clone)]
pub struct HookSet {
    required_before: Vec<Arc<dyn BeforeHook>>,
    optional_before: Vec<Arc<dyn BeforeHook>>,
    required_after: Vec<Arc<dyn AfterHook>>,
    optional_after: Vec<Arc<dyn AfterHook>>,
}

impl HookSet {
    pub fn add_before_hook(&mut self, hook: Arc<dyn BeforeHook>, optional: bool) {
        tracing::debug!(hook = %hook.name(), optional, "Adding before hook");
        if optional {
            self.optional_before.push(hook);
        } else {
            self.required_before.push(hook);
        }
    }

    pub fn add_after_hook(&mut self, hook: Arc<dyn AfterHook>, optional: bool) {
        tracing::debug!(hook = %hook.name(), optional, "Adding after hook");
        if optional {
            self.optional_after.push(hook);
        } else {
            self.required_after.push(hook);
        }
    }
}

#[derive(Default)]
struct RegistryState {
    hooks: HookSet,
    loaded: bool,
}

/// Process-wide hook registrations, populated once at startup.
#[derive(Default)]
pub struct HookRegistry {
    state: RwLock<RegistryState>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_before_hook(&self, hook: Arc<dyn BeforeHook>, optional: bool) {
        self.write().hooks.add_before_hook(hook, optional);
    }

    pub fn add_after_hook(&self, hook: Arc<dyn AfterHook>, optional: bool) {
        self.write().hooks.add_after_hook(hook, optional);
    }

    pub fn required_before_hooks(&self) -> Vec<Arc<dyn BeforeHook>> {
        self.read().hooks.required_before.clone()
    }

    pub fn optional_before_hooks(&self) -> Vec<Arc<dyn BeforeHook>> {
        self.read().hooks.optional_before.clone()
    }

    pub fn required_after_hooks(&self) -> Vec<Arc<dyn AfterHook>> {
        self.read().hooks.required_after.clone()
    }

    pub fn optional_after_hooks(&self) -> Vec<Arc<dyn AfterHook>> {
        self.read().hooks.optional_after.clone()
    }

    /// Install `core` followed by every named module, each at most once.
    ///
    /// A no-op once loaded, until [`reset`](Self::reset). Unknown module names
    /// fail before anything is installed.
    pub fn load_hooks(
        &self,
        catalog: &HookCatalog,
        request_modules: &[String],
        response_modules: &[String],
        deps: &HookDeps,
    ) -> Result<(), LoadError> {
        let mut state = self.write();
        if state.loaded {
            return Ok(());
        }

        let mut seen = HashSet::new();
        let mut installers = Vec::new();
        let names = std::iter::once(required::MODULE)
            .chain(request_modules.iter().map(String::as_str))
            .chain(response_modules.iter().map(String::as_str))
            .map(str::trim)
            .filter(|name| !name.is_empty());
        for name in names {
            if !seen.insert(name) {
                continue;
            }
            let installer = catalog
                .get(name)
                .ok_or_else(|| LoadError::UnknownHookModule(name.to_string()))?;
            installers.push((name, installer));
        }

        for (name, install) in installers {
            tracing::info!(module = %name, "Importing hook module");
            install(&mut state.hooks, deps);
        }
        state.loaded = true;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.read().loaded
    }

    /// Drop every registration and the loaded flag.
    pub fn reset(&self) {
        *self.write() = RegistryState::default();
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, RegistryState> {
        self.state.read().expect("hook registry lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, RegistryState> {
        self.state.write().expect("hook registry lock poisoned")
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        let hooks = &state.hooks;
        f.debug_struct("HookRegistry")
            .field(
                "required_before",
                &hooks.required_before.iter().map(|h| h.name()).collect::<Vec<_>>(),
            )
            .field(
                "optional_before",
                &hooks.optional_before.iter().map(|h| h.name()).collect::<Vec<_>>(),
            )
            .field(
                "required_after",
                &hooks.required_after.iter().map(|h| h.name()).collect::<Vec<_>>(),
            )
            .field(
                "optional_after",
                &hooks.optional_after.iter().map(|h| h.name()).collect::<Vec<_>>(),
            )
            .field("loaded", &state.loaded)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthSettings, TokenStore};
    use axum::http::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn deps() -> HookDeps {
        HookDeps::new(
            crate::auth::shared_settings(AuthSettings::default()),
            Arc::new(TokenStore::new()),
        )
    }

    fn modules(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn before_names(hooks: &[Arc<dyn BeforeHook>]) -> Vec<&str> {
        hooks.iter().map(|h| h.name()).collect()
    }

    #[test]
    fn test_load_hooks_is_idempotent() {
        let registry = HookRegistry::new();
        let catalog = HookCatalog::builtin();
        let request = modules(&["admin_token", "auth_token", "log"]);
        let response = modules(&["log"]);

        registry.load_hooks(&catalog, &request, &response, &deps()).unwrap();
        let first = (
            registry.required_before_hooks().len(),
            registry.optional_before_hooks().len(),
            registry.required_after_hooks().len(),
            registry.optional_after_hooks().len(),
        );
        registry.load_hooks(&catalog, &request, &response, &deps()).unwrap();
        let second = (
            registry.required_before_hooks().len(),
            registry.optional_before_hooks().len(),
            registry.required_after_hooks().len(),
            registry.optional_after_hooks().len(),
        );

        assert_eq!(first, second);
        assert_eq!(first, (1, 3, 1, 1));
        assert_eq!(
            before_names(&registry.optional_before_hooks()),
            vec!["admin_token", "validate_token", "log_request"]
        );
    }

    #[test]
    fn test_reset_allows_reload() {
        let registry = HookRegistry::new();
        let catalog = HookCatalog::builtin();
        registry.load_hooks(&catalog, &[], &[], &deps()).unwrap();
        assert!(registry.is_loaded());

        registry.reset();
        assert!(!registry.is_loaded());
        assert!(registry.required_before_hooks().is_empty());

        registry
            .load_hooks(&catalog, &modules(&["log"]), &[], &deps())
            .unwrap();
        assert_eq!(before_names(&registry.required_before_hooks()), vec!["set_request_id"]);
        assert_eq!(registry.optional_after_hooks().len(), 1);
    }

    #[test]
    fn test_unknown_module_installs_nothing() {
        let registry = HookRegistry::new();
        let err = registry
            .load_hooks(&HookCatalog::builtin(), &modules(&["log", "nope"]), &[], &deps())
            .unwrap_err();
        assert!(matches!(err, LoadError::UnknownHookModule(ref name) if name == "nope"));
        assert!(!registry.is_loaded());
        assert!(registry.required_before_hooks().is_empty());
    }

    #[test]
    fn test_snapshots_are_copies() {
        let registry = HookRegistry::new();
        registry.add_before_hook(Arc::new(before_fn("a", |_, _| Ok(()))), false);
        let snapshot = registry.required_before_hooks();
        registry.add_before_hook(Arc::new(before_fn("b", |_, _| Ok(()))), false);

        assert_eq!(before_names(&snapshot), vec!["a"]);
        assert_eq!(before_names(&registry.required_before_hooks()), vec!["a", "b"]);
    }

    #[test]
    fn test_required_run_in_registration_order() {
        let counter = Arc::new(AtomicUsize::new(0));
        let seen_a = Arc::new(AtomicUsize::new(usize::MAX));
        let seen_b = Arc::new(AtomicUsize::new(usize::MAX));

        let registry = HookRegistry::new();
        for (name, slot) in [("a", seen_a.clone()), ("b", seen_b.clone())] {
            let counter = counter.clone();
            registry.add_before_hook(
                Arc::new(before_fn(name, move |_, _| {
                    slot.store(counter.fetch_add(1, Ordering::SeqCst), Ordering::SeqCst);
                    Ok(())
                })),
                false,
            );
        }

        let chain = BeforeChain::new(
            registry
                .required_before_hooks()
                .into_iter()
                .chain(registry.optional_before_hooks())
                .collect(),
        );
        let mut req = RequestContext::new(Method::GET, "/");
        chain.run(&mut req, &PathParams::new()).unwrap();

        assert_eq!(seen_a.load(Ordering::SeqCst), 0);
        assert_eq!(seen_b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_debug_lists_names() {
        let registry = HookRegistry::new();
        registry.add_after_hook(Arc::new(after_fn("tail", |_, resp| resp)), true);
        let rendered = format!("{registry:?}");
        assert!(rendered.contains("tail"));
    }
}
