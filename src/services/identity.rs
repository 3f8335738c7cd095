//! Identity (Keystone v2.0 and v3) endpoints.

use crate::routing::{Dispatcher, RoutingError};
use crate::services::ApiVersion;

pub const VERSIONS: &[ApiVersion] = &[
    ApiVersion {
        id: "v3.0",
        endpoints: &["v3_detail"],
        status: "stable",
        updated: "2013-03-06T00:00:00Z",
    },
    ApiVersion {
        id: "v2.0",
        endpoints: &["v2_detail"],
        status: "stable",
        updated: "2014-04-17T00:00:00Z",
    },
];

pub fn declare_endpoints(disp: &mut Dispatcher) -> Result<(), RoutingError> {
    disp.add_endpoint("index", "/")?;

    disp.add_endpoint("v2_detail", "/v2.0")?;
    disp.add_endpoint("v2_tokens", "/v2.0/tokens")?;
    disp.add_endpoint("v2_token", "/v2.0/tokens/{token_id}")?;
    disp.add_endpoint("v2_token_endpoints", "/v2.0/tokens/{token_id}/endpoints")?;
    disp.add_endpoint("v2_tenants", "/v2.0/tenants")?;
    disp.add_endpoint("v2_user", "/v2.0/users/{user_id}")?;

    disp.add_endpoint("v3_detail", "/v3")?;
    disp.add_endpoint("v3_auth_tokens", "/v3/auth/tokens")?;
    Ok(())
}
