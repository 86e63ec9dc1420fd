//! Render routing: direct tile layers vs. generated rasters.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use overlay_common::{LayerGroupDescriptor, OverlayError, OverlayRecord, OverlayResult, TileLayer};

use crate::config::MapsApiConfig;
use crate::endpoint::{resolve_endpoint, EndpointContext};

/// Fixed translucent style applied to generated raster layers.
const RASTER_CARTOCSS: &str = "#layer { raster-opacity: 0.6; }";
const CARTOCSS_VERSION: &str = "2.3.0";
const LAYER_GROUP_VERSION: &str = "1.3.1";

/// JSON layer-group configuration POSTed to the map-instantiation endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct LayerGroupConfig {
    version: &'static str,
    layers: Vec<LayerGroupLayer>,
}

#[derive(Debug, Clone, Serialize)]
struct LayerGroupLayer {
    #[serde(rename = "type")]
    kind: &'static str,
    options: LayerGroupOptions,
}

#[derive(Debug, Clone, Serialize)]
struct LayerGroupOptions {
    sql: String,
    cartocss: String,
    cartocss_version: &'static str,
}

impl LayerGroupConfig {
    /// Configuration referencing `layer_name` as a SQL source with the fixed
    /// translucent raster style.
    pub fn for_source(layer_name: &str) -> Self {
        Self {
            version: LAYER_GROUP_VERSION,
            layers: vec![LayerGroupLayer {
                kind: "cartodb",
                options: LayerGroupOptions {
                    sql: format!("SELECT * FROM {}", layer_name),
                    cartocss: RASTER_CARTOCSS.to_string(),
                    cartocss_version: CARTOCSS_VERSION,
                },
            }],
        }
    }
}

/// Performs the server-side map-instantiation round trip.
#[async_trait]
pub trait MapInstantiator: Send + Sync + 'static {
    async fn instantiate(&self, config: &LayerGroupConfig) -> OverlayResult<LayerGroupDescriptor>;
}

/// reqwest-backed instantiator against the mapping service.
pub struct HttpMapInstantiator {
    client: Client,
    config: MapsApiConfig,
}

impl HttpMapInstantiator {
    pub fn new(config: MapsApiConfig) -> OverlayResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| OverlayError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl MapInstantiator for HttpMapInstantiator {
    async fn instantiate(&self, config: &LayerGroupConfig) -> OverlayResult<LayerGroupDescriptor> {
        let response = self
            .client
            .post(self.config.instantiation_url())
            .query(&[("api_key", self.config.api_key.as_str())])
            .json(config)
            .send()
            .await
            .map_err(|e| OverlayError::Transport(format!("Instantiation request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| OverlayError::Transport(format!("Failed to read response body: {}", e)))?;

        // Status and body are surfaced verbatim so an operator can see what
        // the mapping service rejected.
        if !(200..300).contains(&status) {
            return Err(OverlayError::RenderFailed { status, body });
        }

        serde_json::from_str(&body).map_err(|e| {
            OverlayError::EndpointNegotiationFailed(format!(
                "malformed layer-group response: {}",
                e
            ))
        })
    }
}

/// Routes an overlay record to the right rendering path.
///
/// Branches purely on `is_generated_raster`; name classification and the
/// confirm/rename interaction happen upstream, the record already carries the
/// final chosen name.
pub struct RenderRouter<I: MapInstantiator> {
    instantiator: I,
    config: MapsApiConfig,
}

impl<I: MapInstantiator> RenderRouter<I> {
    pub fn new(instantiator: I, config: MapsApiConfig) -> Self {
        Self {
            instantiator,
            config,
        }
    }

    /// The instantiator backing the raster path.
    pub fn instantiator(&self) -> &I {
        &self.instantiator
    }

    /// Produce the tile layer for a record.
    ///
    /// Direct path: the source URL is already a tile template. Raster path:
    /// instantiate a layer group server-side, then negotiate the tile
    /// endpoint from the returned descriptor. A failed instantiation is
    /// returned to the caller, never swallowed.
    pub async fn render(&self, record: &OverlayRecord) -> OverlayResult<TileLayer> {
        if !record.is_generated_raster {
            debug!(layer = %record.layer_name, "Rendering direct tile layer");
            return Ok(TileLayer::overlay(&record.source_url));
        }

        let group_config = LayerGroupConfig::for_source(&record.layer_name);
        let descriptor = self.instantiator.instantiate(&group_config).await?;

        let ctx = EndpointContext {
            protocol: self.config.protocol,
            username: &self.config.username,
            maps_host: &self.config.maps_host,
        };
        let url = resolve_endpoint(&descriptor.layergroupid, descriptor.cdn_url.as_ref(), &ctx);

        info!(
            layer = %record.layer_name,
            layer_group = %descriptor.layergroupid,
            "Instantiated raster layer group"
        );

        Ok(TileLayer::overlay(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_group_config_shape() {
        let config = LayerGroupConfig::for_source("field_scan");
        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(json["version"], "1.3.1");
        assert_eq!(json["layers"][0]["type"], "cartodb");
        assert_eq!(json["layers"][0]["options"]["sql"], "SELECT * FROM field_scan");
        assert_eq!(
            json["layers"][0]["options"]["cartocss"],
            "#layer { raster-opacity: 0.6; }"
        );
    }
}
