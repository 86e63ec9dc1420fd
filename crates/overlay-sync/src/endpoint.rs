//! Tile endpoint resolution for generated raster layers.

use overlay_common::CdnUrls;

use crate::config::Protocol;

/// Inputs to endpoint resolution that come from session configuration rather
/// than from the instantiation response.
#[derive(Debug, Clone, Copy)]
pub struct EndpointContext<'a> {
    pub protocol: Protocol,
    pub username: &'a str,
    pub maps_host: &'a str,
}

/// Build the tile URL template for an instantiated layer group.
///
/// Prefers a CDN domain for the active protocol when the descriptor carries
/// one. Over plain HTTP the `{s}.` wildcard subdomain token is prefixed so
/// tile clients can shard requests across CDN subdomains; TLS certificates
/// rule that out for HTTPS. Without a usable CDN entry, falls back to the
/// protocol-relative direct per-user endpoint. Deterministic given its
/// inputs.
pub fn resolve_endpoint(
    layer_group_id: &str,
    cdn: Option<&CdnUrls>,
    ctx: &EndpointContext<'_>,
) -> String {
    if let Some(cdn) = cdn {
        match ctx.protocol {
            Protocol::Http => {
                if let Some(domain) = &cdn.http {
                    return format!(
                        "http://{{s}}.{}/{}/api/v1/map/{}/{{z}}/{{x}}/{{y}}.png",
                        domain, ctx.username, layer_group_id
                    );
                }
            }
            Protocol::Https => {
                if let Some(domain) = &cdn.https {
                    return format!(
                        "https://{}/{}/api/v1/map/{}/{{z}}/{{x}}/{{y}}.png",
                        domain, ctx.username, layer_group_id
                    );
                }
            }
        }
    }

    format!(
        "//{}/user/{}/api/v1/map/{}/{{z}}/{{x}}/{{y}}.png",
        ctx.maps_host, ctx.username, layer_group_id
    )
}
