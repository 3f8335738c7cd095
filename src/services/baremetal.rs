//! Bare metal (Ironic v1) endpoints.

use crate::routing::{Dispatcher, RoutingError};
use crate::services::ApiVersion;

pub const VERSIONS: &[ApiVersion] = &[ApiVersion {
    id: "v1",
    endpoints: &["v1_detail"],
    status: "CURRENT",
    updated: "",
}];

pub fn declare_endpoints(disp: &mut Dispatcher) -> Result<(), RoutingError> {
    disp.add_endpoint("index", "/")?;
    disp.add_endpoint("v1_detail", "/v1")?;
    disp.add_endpoint("v1_nodes", "/v1/nodes")?;
    disp.add_endpoint("v1_nodes_detail", "/v1/nodes/detail")?;
    disp.add_endpoint("v1_node", "/v1/nodes/{node_id}")?;
    disp.add_endpoint("v1_drivers", "/v1/drivers")?;
    disp.add_endpoint("v1_driver", "/v1/drivers/{driver_name}")?;
    Ok(())
}
