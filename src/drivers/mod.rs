//! Backend drivers: the seam where resource handlers are bound to routes.
//!
//! # Data Flow
//! ```text
//! services.<name>.driver (config)
//!     → DriverRegistry::get
//!     → Driver::setup_routes(app, service, dispatcher)
//!         → Dispatcher::set_handler for the endpoints it implements
//!         → App::add_before_hook / add_error_handler for its collaborators
//! ```

pub mod versions;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::app::{App, LoadError};
use crate::routing::Dispatcher;

pub use versions::{VersionDetail, VersionIndex, VersionsDriver};

pub trait Driver: Send + Sync {
    fn name(&self) -> &str;

    /// Bind handlers for `service` on its dispatcher.
    fn setup_routes(
        &self,
        app: &mut App,
        service: &str,
        disp: &mut Dispatcher,
    ) -> Result<(), LoadError>;
}

#[derive(Clone, Default)]
pub struct DriverRegistry {
    drivers: BTreeMap<String, Arc<dyn Driver>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(VersionsDriver));
        registry
    }

    /// Add or replace a driver under its own name.
    pub fn register(&mut self, driver: Arc<dyn Driver>) {
        self.drivers.insert(driver.name().to_string(), driver);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Driver>> {
        self.drivers.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.drivers.keys().map(String::as_str)
    }
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.drivers.keys()).finish()
    }
}
