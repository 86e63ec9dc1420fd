//! Overlay record and layer-group types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::map::TileLayer;

/// A persisted overlay row.
///
/// At most one row per (`dashboard_id`, `layer_name`) pair is logically live;
/// soft-deleted rows keep `visible = false` and are never physically removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayRecord {
    /// Visualization identifier the overlay belongs to.
    pub dashboard_id: String,

    /// Natural key within a dashboard.
    pub layer_name: String,

    /// Tile-template URL, or a table/source name for generated rasters.
    pub source_url: String,

    /// Selects the generated-raster render path when true.
    pub is_generated_raster: bool,

    /// Soft-delete flag.
    pub visible: bool,
}

impl OverlayRecord {
    pub fn new(
        dashboard_id: impl Into<String>,
        layer_name: impl Into<String>,
        source_url: impl Into<String>,
        is_generated_raster: bool,
    ) -> Self {
        Self {
            dashboard_id: dashboard_id.into(),
            layer_name: layer_name.into(),
            source_url: source_url.into(),
            is_generated_raster,
            visible: true,
        }
    }

    /// The natural key of this record.
    pub fn natural_key(&self) -> (&str, &str) {
        (&self.dashboard_id, &self.layer_name)
    }
}

/// Stable opaque identifier for a registered overlay list entry.
///
/// Used to correlate UI rows, map layers and remote rows instead of a
/// positional index, which would go stale after a removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An overlay registered with the list controller for the current session.
#[derive(Debug, Clone)]
pub struct OverlayListEntry {
    /// Stable identity of the entry across list mutations.
    pub id: EntryId,

    /// Cached copy of the persisted record; the remote store is authoritative
    /// on conflict.
    pub record: OverlayRecord,

    /// The tile layer definition handed to the map surface.
    pub layer: TileLayer,
}

/// Response of a map-instantiation call.
///
/// Ephemeral: consumed to build a tile endpoint, then discarded.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerGroupDescriptor {
    pub layergroupid: String,

    #[serde(default)]
    pub cdn_url: Option<CdnUrls>,
}

/// Optional CDN domain table keyed by protocol.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CdnUrls {
    #[serde(default)]
    pub http: Option<String>,

    #[serde(default)]
    pub https: Option<String>,
}
