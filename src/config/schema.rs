//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the shim.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::auth::DEFAULT_NO_AUTH_ROUTES;

/// Root configuration for the shim.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShimConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Services to expose; each must have a `[services.<name>]` entry.
    pub enabled_services: Vec<String>,

    /// Per-service mount and driver.
    pub services: BTreeMap<String, ServiceConfig>,

    /// Hook modules to load besides `core`.
    pub hooks: HooksConfig,

    /// Token handling.
    pub auth: AuthConfig,

    /// Backend cloud API.
    pub backend: BackendConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ShimConfig {
    fn default() -> Self {
        let services = [
            ("baremetal", "/baremetal"),
            ("compute", "/compute"),
            ("identity", ""),
            ("image", "/image"),
            ("network", "/network"),
            ("volume", "/volume"),
        ]
        .into_iter()
        .map(|(name, mount)| (name.to_string(), ServiceConfig::mounted(mount)))
        .collect();

        Self {
            listener: ListenerConfig::default(),
            enabled_services: ["compute", "identity", "image", "network", "volume"]
                .into_iter()
                .map(String::from)
                .collect(),
            services,
            hooks: HooksConfig::default(),
            auth: AuthConfig::default(),
            backend: BackendConfig::default(),
            timeouts: TimeoutConfig::default(),
            security: SecurityConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ShimConfig {
    /// A service is installed when listed and not switched off in its section.
    pub fn is_enabled(&self, service: &str) -> bool {
        self.enabled_services.iter().any(|s| s == service)
            && self.services.get(service).map_or(true, |s| s.enabled)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// One OpenStack service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Path prefix for every endpoint (empty for the root).
    pub mount: String,

    /// Driver that binds handlers.
    pub driver: String,

    pub enabled: bool,
}

impl ServiceConfig {
    pub fn mounted(mount: &str) -> Self {
        Self {
            mount: mount.to_string(),
            ..Self::default()
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            mount: String::new(),
            driver: "versions".to_string(),
            enabled: true,
        }
    }
}

/// Hook modules, applied in order after `core`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HooksConfig {
    pub request_hooks: Vec<String>,
    pub response_hooks: Vec<String>,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            request_hooks: vec![
                "admin_token".to_string(),
                "auth_token".to_string(),
                "log".to_string(),
            ],
            response_hooks: vec!["log".to_string()],
        }
    }
}

/// Authentication settings. Reloaded live.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared secret that grants admin; unset or empty disables it.
    pub admin_token: Option<String>,

    /// `METHOD:path` regexes reachable without a token.
    pub no_auth_routes: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_token: None,
            no_auth_routes: DEFAULT_NO_AUTH_ROUTES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Backend cloud API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the REST API.
    pub endpoint: String,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.softlayer.com/rest/v3".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Handler execution bound in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
