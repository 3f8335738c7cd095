//! Compute (Nova v2) endpoints.

use crate::routing::{Dispatcher, RoutingError};
use crate::services::ApiVersion;

pub const VERSIONS: &[ApiVersion] = &[ApiVersion {
    id: "v2.0",
    endpoints: &["v2_detail", "v2_tenant_detail"],
    status: "CURRENT",
    updated: "2011-01-21T11:33:21Z",
}];

pub fn declare_endpoints(disp: &mut Dispatcher) -> Result<(), RoutingError> {
    disp.add_endpoint("index", "/")?;
    disp.add_endpoint("v2_detail", "/v2")?;
    disp.add_endpoint("v2_tenant_detail", "/v2/{tenant_id}")?;

    disp.add_endpoint("v2_servers", "/v2/{tenant_id}/servers")?;
    disp.add_endpoint("v2_servers_detail", "/v2/{tenant_id}/servers/detail")?;
    disp.add_endpoint("v2_server", "/v2/{tenant_id}/servers/{server_id}")?;
    disp.add_endpoint("v2_server_action", "/v2/{tenant_id}/servers/{instance_id}/action")?;
    disp.add_endpoint("v2_server_ips", "/v2/{tenant_id}/servers/{server_id}/ips")?;
    disp.add_endpoint(
        "v2_server_ips_network",
        "/v2/{tenant_id}/servers/{server_id}/ips/{network_label}",
    )?;
    disp.add_endpoint(
        "v2_os_volume_attachments",
        "/v2/{tenant_id}/servers/{instance_id}/os-volume_attachments",
    )?;
    disp.add_endpoint(
        "v2_os_volume_attachment",
        "/v2/{tenant_id}/servers/{instance_id}/os-volume_attachments/{volume_id}",
    )?;

    disp.add_endpoint("v2_flavors", "/v2/{tenant_id}/flavors")?;
    disp.add_endpoint("v2_flavors_detail", "/v2/{tenant_id}/flavors/detail")?;
    disp.add_endpoint("v2_flavor", "/v2/{tenant_id}/flavors/{flavor_id}")?;
    disp.add_endpoint(
        "v2_os_extra_specs",
        "/v2/{tenant_id}/flavors/{flavor_id}/os-extra_specs",
    )?;
    disp.add_endpoint(
        "v2_os_extra_spec",
        "/v2/{tenant_id}/flavors/{flavor_id}/os-extra_specs/{key_id}",
    )?;

    disp.add_endpoint("v2_images", "/v2/{tenant_id}/images")?;
    disp.add_endpoint("v2_images_detail", "/v2/{tenant_id}/images/detail")?;
    disp.add_endpoint("v2_image", "/v2/{tenant_id}/images/{image_id}")?;

    disp.add_endpoint("v2_os_keypairs", "/v2/{tenant_id}/os-keypairs")?;
    disp.add_endpoint("v2_os_keypair", "/v2/{tenant_id}/os-keypairs/{keypair_name}")?;
    disp.add_endpoint("v2_limits", "/v2/{tenant_id}/limits")?;
    disp.add_endpoint("v2_availability_zone", "/v2/{tenant_id}/os-availability-zone")?;
    disp.add_endpoint("v2_quota_set", "/v2/{tenant_id}/os-quota-sets/{target_id}")?;
    disp.add_endpoint("v2_os_networks", "/v2/{tenant_id}/os-networks")?;
    disp.add_endpoint("v2_os_network", "/v2/{tenant_id}/os-networks/{network_id}")?;
    Ok(())
}
