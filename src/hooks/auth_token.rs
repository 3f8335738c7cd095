//! The `auth_token` hook module.
//!
//! | context                          | token header | allowlisted | outcome                 |
//! |----------------------------------|--------------|-------------|-------------------------|
//! | remote user, admin or auth set   | any          | any         | no-op                   |
//! | -                                | present      | any         | validate, set auth      |
//! | -                                | absent       | yes         | no-op                   |
//! | -                                | absent       | no          | `Unauthorized`          |

use std::sync::Arc;

use crate::auth::{SharedAuthSettings, TokenValidator};
use crate::errors::ApiError;
use crate::hooks::{BeforeHook, HookDeps, HookSet};
use crate::http::{PathParams, RequestContext, X_AUTH_PROJECT_ID, X_AUTH_TOKEN};

pub const MODULE: &str = "auth_token";

pub fn install(hooks: &mut HookSet, deps: &HookDeps) {
    hooks.add_before_hook(
        Arc::new(ValidateToken::new(deps.auth.clone(), deps.tokens.clone())),
        true,
    );
}

pub struct ValidateToken {
    settings: SharedAuthSettings,
    tokens: Arc<dyn TokenValidator>,
}

impl ValidateToken {
    pub fn new(settings: SharedAuthSettings, tokens: Arc<dyn TokenValidator>) -> Self {
        Self { settings, tokens }
    }
}

impl BeforeHook for ValidateToken {
    fn name(&self) -> &str {
        "validate_token"
    }

    fn before(&self, req: &mut RequestContext, params: &PathParams) -> Result<(), ApiError> {
        if req.is_preauthenticated() {
            return Ok(());
        }

        let Some(token) = req.header(X_AUTH_TOKEN).map(str::to_string) else {
            let method = req.method().as_str();
            if self.settings.load().is_protected(method, req.path()) {
                return Err(ApiError::Unauthorized(format!(
                    "Authentication token required for {}:{}",
                    method,
                    req.path()
                )));
            }
            return Ok(());
        };

        if req.tenant_id().is_none() {
            let tenant_id = params
                .get("tenant_id")
                .or_else(|| req.header(X_AUTH_PROJECT_ID))
                .map(str::to_string);
            req.set_tenant_id(tenant_id);
        }

        tracing::debug!(
            request_id = req.request_id().unwrap_or("-"),
            tenant_id = req.tenant_id().unwrap_or("-"),
            "Authenticating request token"
        );
        let auth = self.tokens.validate(&token, req.tenant_id())?;
        req.set_auth(auth);
        Ok(())
    }
}
