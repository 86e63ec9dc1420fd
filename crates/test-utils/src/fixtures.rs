//! Overlay record fixtures.

use overlay_common::OverlayRecord;

/// Dashboard id used across fixtures.
pub const TEST_DASHBOARD: &str = "viz-test";

/// A direct-tile overlay record for [`TEST_DASHBOARD`].
pub fn tile_record(layer_name: &str) -> OverlayRecord {
    OverlayRecord::new(
        TEST_DASHBOARD,
        layer_name,
        format!("https://tiles.example.com/{}/{{z}}/{{x}}/{{y}}.png", layer_name),
        false,
    )
}

/// A generated-raster overlay record for [`TEST_DASHBOARD`].
pub fn raster_record(layer_name: &str) -> OverlayRecord {
    OverlayRecord::new(TEST_DASHBOARD, layer_name, layer_name, true)
}
