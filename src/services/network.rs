//! Network (Neutron v2.0) endpoints.

use crate::routing::{Dispatcher, RoutingError};
use crate::services::ApiVersion;

pub const VERSIONS: &[ApiVersion] = &[ApiVersion {
    id: "v2.0",
    endpoints: &["v2_detail"],
    status: "CURRENT",
    updated: "",
}];

pub fn declare_endpoints(disp: &mut Dispatcher) -> Result<(), RoutingError> {
    disp.add_endpoint("index", "/")?;
    disp.add_endpoint("v2_detail", "/v2.0")?;
    disp.add_endpoint("v2_extensions", "/v2.0/extensions")?;
    disp.add_endpoint("v2_networks", "/v2.0/networks")?;
    disp.add_endpoint("v2_network", "/v2.0/networks/{network_id}")?;
    disp.add_endpoint("v2_subnets", "/v2.0/subnets")?;
    disp.add_endpoint("v2_subnet", "/v2.0/subnets/{subnet_id}")?;
    disp.add_endpoint("v2_ports", "/v2.0/ports")?;
    disp.add_endpoint("v2_port", "/v2.0/ports/{port_id}")?;
    Ok(())
}
