//! Error types for the overlay-sync crates.

use thiserror::Error;

/// Result type alias using OverlayError.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Primary error type for overlay persistence and rendering operations.
#[derive(Debug, Error)]
pub enum OverlayError {
    // === Remote store errors ===
    #[error("Backing table not provisioned: {0}")]
    SchemaMissing(String),

    #[error("Remote write failed: {0}")]
    RemoteWriteFailed(String),

    #[error("Remote read failed: {0}")]
    RemoteReadFailed(String),

    // === Render errors ===
    #[error("Render failed with status {status}: {body}")]
    RenderFailed { status: u16, body: String },

    #[error("Tile endpoint negotiation failed: {0}")]
    EndpointNegotiationFailed(String),

    // === Input validation ===
    #[error("No URL supplied for the layer")]
    MissingUrl,

    #[error("Overlay not found: {0}")]
    EntryNotFound(String),

    // === Infrastructure errors ===
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl OverlayError {
    /// Whether the failure only degrades durability of the current session.
    ///
    /// Persistence writes are best-effort: the in-memory overlay stays
    /// visible even when its row never reached the backing table.
    pub fn is_durability_only(&self) -> bool {
        matches!(
            self,
            OverlayError::RemoteWriteFailed(_) | OverlayError::SchemaMissing(_)
        )
    }
}

// Conversion from common error types
impl From<serde_json::Error> for OverlayError {
    fn from(err: serde_json::Error) -> Self {
        OverlayError::Decode(format!("JSON error: {}", err))
    }
}
