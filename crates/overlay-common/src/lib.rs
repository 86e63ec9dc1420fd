//! Common types and utilities shared across the overlay-sync crates.

pub mod classify;
pub mod error;
pub mod map;
pub mod record;

pub use classify::{classify, Classification};
pub use error::{OverlayError, OverlayResult};
pub use map::{LayerStack, MapSurface, TileLayer, BASE_LAYER_OFFSET, OVERLAY_Z_INDEX};
pub use record::{CdnUrls, EntryId, LayerGroupDescriptor, OverlayListEntry, OverlayRecord};
