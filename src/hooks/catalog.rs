//! Hook modules available by name.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::auth::{SharedAuthSettings, TokenValidator};
use crate::hooks::{admin_token, auth_token, log, required, HookSet};

/// Collaborators handed to every installer.
#[derive(Clone)]
pub struct HookDeps {
    pub auth: SharedAuthSettings,
    pub tokens: Arc<dyn TokenValidator>,
}

impl HookDeps {
    pub fn new(auth: SharedAuthSettings, tokens: Arc<dyn TokenValidator>) -> Self {
        Self { auth, tokens }
    }
}

impl fmt::Debug for HookDeps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookDeps").finish_non_exhaustive()
    }
}

/// Registers a module's hooks.
pub type HookInstaller = fn(&mut HookSet, &HookDeps);

#[derive(Clone, Default)]
pub struct HookCatalog {
    modules: BTreeMap<String, HookInstaller>,
}

impl fmt::Debug for HookCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.modules.keys()).finish()
    }
}

impl HookCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register(required::MODULE, required::install);
        catalog.register(admin_token::MODULE, admin_token::install);
        catalog.register(auth_token::MODULE, auth_token::install);
        catalog.register(log::MODULE, log::install);
        catalog
    }

    /// Add or replace the installer for `name`.
    pub fn register(&mut self, name: impl Into<String>, installer: HookInstaller) {
        self.modules.insert(name.into(), installer);
    }

    pub fn get(&self, name: &str) -> Option<HookInstaller> {
        self.modules.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }
}
