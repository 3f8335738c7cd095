//! Image (Glance v1 and v2) endpoints.

use crate::routing::{Dispatcher, RoutingError};
use crate::services::ApiVersion;

pub const VERSIONS: &[ApiVersion] = &[
    ApiVersion {
        id: "v2.0",
        endpoints: &["v2_version"],
        status: "CURRENT",
        updated: "",
    },
    ApiVersion {
        id: "v1.0",
        endpoints: &["v1_version"],
        status: "SUPPORTED",
        updated: "",
    },
];

pub fn declare_endpoints(disp: &mut Dispatcher) -> Result<(), RoutingError> {
    disp.add_endpoint("index", "/")?;
    disp.add_endpoint("versions", "/versions")?;

    disp.add_endpoint("v2_version", "/v2")?;
    disp.add_endpoint("v2_schema_image", "/v2/schemas/image")?;
    disp.add_endpoint("v2_schema_images", "/v2/schemas/images")?;
    disp.add_endpoint("v2_images", "/v2/images")?;
    disp.add_endpoint("v2_image", "/v2/images/{image_guid}")?;
    disp.add_endpoint("v2_image_file", "/v2/images/{image_guid}/file")?;

    disp.add_endpoint("v1_version", "/v1")?;
    disp.add_endpoint("v1_images", "/v1/images")?;
    disp.add_endpoint("v1_images_detail", "/v1/images/detail")?;
    disp.add_endpoint("v1_image", "/v1/images/{image_guid}")?;
    Ok(())
}
