//! Map surface collaborator interface.
//!
//! The subsystem never touches map internals; it depends on four operations
//! of the hosting map component plus tile-layer construction from a URL
//! template. `LayerStack` is a minimal concrete implementation used by the
//! CLI wiring and by tests.

use serde::{Deserialize, Serialize};

/// Index 0 of the map's layer stack is reserved for the base layer, so list
/// positions and map-layer indices are offset by this constant. It must be
/// applied consistently on add and remove.
pub const BASE_LAYER_OFFSET: usize = 1;

/// Z-index assigned to overlays so they draw above the base layers.
pub const OVERLAY_Z_INDEX: i32 = 10;

/// A tile layer built from a URL template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    /// URL template with `{z}`, `{x}`, `{y}` (and optionally `{s}`) tokens.
    pub url_template: String,

    /// Stacking order relative to other layers.
    pub z_index: i32,

    /// Layer opacity in [0, 1].
    pub opacity: f32,
}

impl TileLayer {
    /// Build an overlay tile layer from a URL template, raised above base
    /// layers.
    pub fn overlay(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            z_index: OVERLAY_Z_INDEX,
            opacity: 1.0,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

/// The narrow interface the subsystem needs from the hosting map component.
///
/// The map owns live layers; callers only issue add/remove calls and must
/// apply [`BASE_LAYER_OFFSET`] when translating list positions to indices.
pub trait MapSurface {
    /// Append a layer to the top of the stack.
    fn add_layer(&mut self, layer: TileLayer);

    /// Layer at a stack index, base layer included at index 0.
    fn layer_at(&self, index: usize) -> Option<&TileLayer>;

    /// Remove and return the layer at a stack index.
    fn remove_layer_at(&mut self, index: usize) -> Option<TileLayer>;

    /// Number of attached layers, base layer included.
    fn layer_count(&self) -> usize;
}

/// In-process layer stack implementing [`MapSurface`].
#[derive(Debug, Default)]
pub struct LayerStack {
    layers: Vec<TileLayer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stack seeded with a base layer at index 0.
    pub fn with_base(base: TileLayer) -> Self {
        Self { layers: vec![base] }
    }
}

impl MapSurface for LayerStack {
    fn add_layer(&mut self, layer: TileLayer) {
        self.layers.push(layer);
    }

    fn layer_at(&self, index: usize) -> Option<&TileLayer> {
        self.layers.get(index)
    }

    fn remove_layer_at(&mut self, index: usize) -> Option<TileLayer> {
        if index < self.layers.len() {
            Some(self.layers.remove(index))
        } else {
            None
        }
    }

    fn layer_count(&self) -> usize {
        self.layers.len()
    }
}
