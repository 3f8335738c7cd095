//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (enabled services have a section)
//! - Validate value ranges (timeouts > 0, mounts well formed)
//! - Compile the no-auth allowlist ahead of use
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ShimConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use regex::Regex;
use url::Url;

use crate::config::schema::ShimConfig;
use crate::services;

/// One semantic problem, with the offending key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &ShimConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    for service in &config.enabled_services {
        if !services::is_supported(service) {
            errors.push(ValidationError::new(
                "enabled_services",
                format!("unsupported service '{service}'"),
            ));
        } else if !config.services.contains_key(service) {
            errors.push(ValidationError::new(
                "enabled_services",
                format!("service '{service}' has no [services.{service}] section"),
            ));
        }
    }

    for (name, service) in &config.services {
        let mount = &service.mount;
        if !mount.is_empty() && (!mount.starts_with('/') || mount.ends_with('/')) {
            errors.push(ValidationError::new(
                format!("services.{name}.mount"),
                format!("'{mount}' must be empty or start with '/' and not end with '/'"),
            ));
        }
        if service.driver.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("services.{name}.driver"),
                "driver must not be empty",
            ));
        }
    }

    for pattern in &config.auth.no_auth_routes {
        if let Err(e) = Regex::new(pattern) {
            errors.push(ValidationError::new(
                "auth.no_auth_routes",
                format!("'{pattern}' does not compile: {e}"),
            ));
        }
    }

    if Url::parse(&config.backend.endpoint).is_err() {
        errors.push(ValidationError::new(
            "backend.endpoint",
            format!("'{}' is not a URL", config.backend.endpoint),
        ));
    }
    if config.backend.timeout_secs == 0 {
        errors.push(ValidationError::new("backend.timeout_secs", "must be positive"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be positive"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be positive"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ServiceConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ShimConfig::default()), Ok(()));
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = ShimConfig::default();
        config.enabled_services.push("object-store".into());
        config.services.remove("volume");
        config
            .services
            .insert("compute".into(), ServiceConfig::mounted("compute/"));
        config.auth.no_auth_routes.push("GET:/(".into());
        config.backend.endpoint = "not a url".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "enabled_services",
                "enabled_services",
                "services.compute.mount",
                "auth.no_auth_routes",
                "backend.endpoint",
                "timeouts.request_secs",
            ]
        );
    }
}
