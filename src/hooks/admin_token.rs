//! The `admin_token` hook module: a static shared secret that marks the
//! request as admin. Load it before `auth_token` so the flag is seen there.

use std::sync::Arc;

use subtle::ConstantTimeEq;

use crate::auth::SharedAuthSettings;
use crate::errors::ApiError;
use crate::hooks::{BeforeHook, HookDeps, HookSet};
use crate::http::{PathParams, RequestContext, X_AUTH_TOKEN};

pub const MODULE: &str = "admin_token";

pub fn install(hooks: &mut HookSet, deps: &HookDeps) {
    hooks.add_before_hook(Arc::new(AdminToken::new(deps.auth.clone())), true);
}

pub struct AdminToken {
    settings: SharedAuthSettings,
}

impl AdminToken {
    pub fn new(settings: SharedAuthSettings) -> Self {
        Self { settings }
    }
}

impl BeforeHook for AdminToken {
    fn name(&self) -> &str {
        "admin_token"
    }

    fn before(&self, req: &mut RequestContext, _params: &PathParams) -> Result<(), ApiError> {
        let settings = self.settings.load();
        let Some(admin_token) = settings.admin_token() else {
            return Ok(());
        };
        let Some(presented) = req.header(X_AUTH_TOKEN) else {
            return Ok(());
        };
        if bool::from(presented.as_bytes().ct_eq(admin_token.as_bytes())) {
            tracing::debug!(
                request_id = req.request_id().unwrap_or("-"),
                "Admin token presented"
            );
            req.set_admin(true);
        }
        Ok(())
    }
}
