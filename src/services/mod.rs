//! OpenStack services and their endpoint declarations.
//!
//! # Data Flow
//! ```text
//! enabled_services (config)
//!     → lookup(name) → ServiceModule
//!     → declare_endpoints(&mut Dispatcher)   (names and templates only)
//!     → drivers bind handlers later
//! ```
//!
//! # Design Decisions
//! - Static registration table instead of loading modules by name
//! - Declarations never bind handlers

pub mod baremetal;
pub mod compute;
pub mod identity;
pub mod image;
pub mod network;
pub mod volume;

use crate::routing::{Dispatcher, RoutingError};

/// Every service the shim knows how to expose, in load order.
pub const SUPPORTED_SERVICES: &[&str] = &[
    "baremetal",
    "compute",
    "identity",
    "image",
    "network",
    "volume",
];

pub type DeclareEndpoints = fn(&mut Dispatcher) -> Result<(), RoutingError>;

/// One advertised API version of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersion {
    pub id: &'static str,
    /// Endpoints describing this version; the first is the self link.
    pub endpoints: &'static [&'static str],
    pub status: &'static str,
    /// Empty when not advertised.
    pub updated: &'static str,
}

impl ApiVersion {
    pub fn self_endpoint(&self) -> &'static str {
        self.endpoints[0]
    }
}

pub struct ServiceModule {
    pub name: &'static str,
    pub declare_endpoints: DeclareEndpoints,
    pub versions: &'static [ApiVersion],
}

static SERVICES: &[ServiceModule] = &[
    ServiceModule {
        name: "baremetal",
        declare_endpoints: baremetal::declare_endpoints,
        versions: baremetal::VERSIONS,
    },
    ServiceModule {
        name: "compute",
        declare_endpoints: compute::declare_endpoints,
        versions: compute::VERSIONS,
    },
    ServiceModule {
        name: "identity",
        declare_endpoints: identity::declare_endpoints,
        versions: identity::VERSIONS,
    },
    ServiceModule {
        name: "image",
        declare_endpoints: image::declare_endpoints,
        versions: image::VERSIONS,
    },
    ServiceModule {
        name: "network",
        declare_endpoints: network::declare_endpoints,
        versions: network::VERSIONS,
    },
    ServiceModule {
        name: "volume",
        declare_endpoints: volume::declare_endpoints,
        versions: volume::VERSIONS,
    },
];

pub fn lookup(name: &str) -> Option<&'static ServiceModule> {
    SERVICES.iter().find(|s| s.name == name)
}

pub fn is_supported(name: &str) -> bool {
    SUPPORTED_SERVICES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_service_declares_endpoints() {
        for name in SUPPORTED_SERVICES {
            let module = lookup(name).unwrap();
            let mut disp = Dispatcher::new("/mount");
            (module.declare_endpoints)(&mut disp).unwrap();
            assert!(!disp.table().is_empty(), "{name} declared nothing");
            assert!(disp.table().contains("index"), "{name} has no index");

            for version in module.versions {
                for endpoint in version.endpoints {
                    assert!(
                        disp.table().contains(endpoint),
                        "{name} advertises undeclared {endpoint}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_declarations_are_repeatable() {
        let mut disp = Dispatcher::new("/volume");
        volume::declare_endpoints(&mut disp).unwrap();
        let count = disp.table().len();
        volume::declare_endpoints(&mut disp).unwrap();
        assert_eq!(disp.table().len(), count);
    }

    #[test]
    fn test_unknown_service() {
        assert!(lookup("object-store").is_none());
        assert!(!is_supported("object-store"));
        assert!(is_supported("volume"));
    }
}
