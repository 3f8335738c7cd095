//! Token validation.
//!
//! # Responsibilities
//! - Define the validated token shape carried in the request context
//! - Define the validator seam used by the `auth_token` hook
//! - Provide an in-memory token store for tests and standalone use
//!
//! # Design Decisions
//! - Store is a DashMap, read concurrently by every request
//! - Unknown, expired and tenant-mismatched tokens are all `InvalidToken`

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ApiError;

/// A validated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub user_id: String,
    pub username: String,
    pub tenant_id: String,
    /// Unix seconds; `None` never expires.
    pub expires: Option<u64>,
    pub auth_type: String,
}

impl AuthToken {
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            tenant_id: tenant_id.into(),
            expires: None,
            auth_type: "token".to_string(),
        }
    }

    pub fn expiring_in(mut self, ttl: Duration) -> Self {
        self.expires = Some(unix_now() + ttl.as_secs());
        self
    }

    pub fn is_expired(&self) -> bool {
        self.expires.is_some_and(|expires| expires <= unix_now())
    }
}

/// Resolves a token id into an identity.
pub trait TokenValidator: Send + Sync {
    /// Validate `token`, optionally scoped to `tenant_id`.
    fn validate(&self, token: &str, tenant_id: Option<&str>) -> Result<AuthToken, ApiError>;
}

#[derive(Debug, Default)]
pub struct TokenStore {
    tokens: DashMap<String, AuthToken>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `token` under a fresh id and return the id.
    pub fn issue(&self, token: AuthToken) -> String {
        let id = Uuid::new_v4().simple().to_string();
        self.tokens.insert(id.clone(), token);
        id
    }

    /// Store `token` under a caller-chosen id.
    pub fn insert(&self, id: impl Into<String>, token: AuthToken) {
        self.tokens.insert(id.into(), token);
    }

    pub fn revoke(&self, id: &str) -> bool {
        self.tokens.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenValidator for TokenStore {
    fn validate(&self, token: &str, tenant_id: Option<&str>) -> Result<AuthToken, ApiError> {
        let auth = self
            .tokens
            .get(token)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ApiError::InvalidToken("Invalid authentication token".to_string()))?;

        if auth.is_expired() {
            self.tokens.remove(token);
            return Err(ApiError::InvalidToken("Token has expired".to_string()));
        }
        if let Some(tenant_id) = tenant_id {
            if tenant_id != auth.tenant_id {
                return Err(ApiError::InvalidToken(format!(
                    "Token is not valid for tenant {tenant_id}"
                )));
            }
        }
        Ok(auth)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
