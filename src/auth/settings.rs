//! Live-reloadable authentication settings.

use std::sync::Arc;

use arc_swap::ArcSwap;
use regex::RegexSet;
use tokio::sync::mpsc;

use crate::config::{AuthConfig, ShimConfig};

/// Routes reachable without a token, matched against `"{METHOD}:{path}"`.
pub const DEFAULT_NO_AUTH_ROUTES: &[&str] = &[
    r"GET:/$",
    r"GET:/compute/?$",
    r"GET:/v\d+/?$",
    r"GET:/v\d+.\d+/?$",
    r"POST:/v\d+/auth/tokens$",
    r"POST:/v\d+.\d+/tokens$",
    r"GET:/v\d+/tokens/\w+$",
    r"GET:/v\d+.\d+/tokens/\w+$",
];

#[derive(Debug, Clone)]
pub struct AuthSettings {
    admin_token: Option<String>,
    no_auth: RegexSet,
}

impl AuthSettings {
    /// Patterns match from the start of the target, like the allowlist
    /// entries are written.
    pub fn new<I, S>(admin_token: Option<String>, no_auth_routes: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let anchored = no_auth_routes
            .into_iter()
            .map(|pattern| format!("^(?:{})", pattern.as_ref()));
        Ok(Self {
            admin_token: admin_token.filter(|t| !t.is_empty()),
            no_auth: RegexSet::new(anchored)?,
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, regex::Error> {
        Self::new(config.admin_token.clone(), &config.no_auth_routes)
    }

    pub fn admin_token(&self) -> Option<&str> {
        self.admin_token.as_deref()
    }

    pub fn no_auth_patterns(&self) -> &[String] {
        self.no_auth.patterns()
    }

    /// Whether `method path` requires a token.
    pub fn is_protected(&self, method: &str, path: &str) -> bool {
        !self.no_auth.is_match(&format!("{method}:{path}"))
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self::new(None, DEFAULT_NO_AUTH_ROUTES).expect("default no-auth routes compile")
    }
}

/// Settings shared by the auth hooks and swapped on reload.
pub type SharedAuthSettings = Arc<ArcSwap<AuthSettings>>;

pub fn shared_settings(settings: AuthSettings) -> SharedAuthSettings {
    Arc::new(ArcSwap::from_pointee(settings))
}

/// Apply the auth section of every reloaded configuration until the
/// sender is dropped.
pub async fn follow_updates(shared: SharedAuthSettings, mut updates: mpsc::UnboundedReceiver<ShimConfig>) {
    while let Some(config) = updates.recv().await {
        match AuthSettings::from_config(&config.auth) {
            Ok(settings) => {
                tracing::info!(
                    no_auth_routes = settings.no_auth_patterns().len(),
                    admin_token = settings.admin_token().is_some(),
                    "Auth settings reloaded"
                );
                shared.store(Arc::new(settings));
            }
            Err(e) => {
                tracing::error!(error = %e, "Rejected auth settings, keeping current ones");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allowlist() {
        let settings = AuthSettings::default();
        assert!(!settings.is_protected("GET", "/"));
        assert!(!settings.is_protected("GET", "/compute"));
        assert!(!settings.is_protected("GET", "/compute/"));
        assert!(!settings.is_protected("GET", "/v2"));
        assert!(!settings.is_protected("GET", "/v2.0/"));
        assert!(!settings.is_protected("POST", "/v3/auth/tokens"));
        assert!(!settings.is_protected("POST", "/v2.0/tokens"));
        assert!(!settings.is_protected("GET", "/v2.0/tokens/abc123"));

        assert!(settings.is_protected("DELETE", "/v2.0/tokens/abc123"));
        assert!(settings.is_protected("GET", "/compute/v2/123/servers"));
        assert!(settings.is_protected("POST", "/"));
    }

    #[test]
    fn test_patterns_are_anchored_at_start() {
        let settings = AuthSettings::new(None, ["GET:/ping$"]).unwrap();
        assert!(!settings.is_protected("GET", "/ping"));
        assert!(settings.is_protected("GET", "/x/GET:/ping"));
    }

    #[test]
    fn test_empty_admin_token_disabled() {
        let settings = AuthSettings::new(Some(String::new()), DEFAULT_NO_AUTH_ROUTES).unwrap();
        assert_eq!(settings.admin_token(), None);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        assert!(AuthSettings::new(None, ["GET:/("]).is_err());
    }

    #[tokio::test]
    async fn test_follow_updates_swaps_settings() {
        let shared = shared_settings(AuthSettings::default());
        let (tx, rx) = mpsc::unbounded_channel();

        let mut config = ShimConfig::default();
        config.auth.admin_token = Some("s3cret".into());
        tx.send(config).unwrap();
        drop(tx);

        follow_updates(shared.clone(), rx).await;
        assert_eq!(shared.load().admin_token(), Some("s3cret"));
    }
}
