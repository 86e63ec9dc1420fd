//! Overlay rendering and list synchronization.
//!
//! Ties the persisted overlay rows to live map layers for one dashboard
//! session: the [`router::RenderRouter`] turns a record into a tile layer
//! (directly, or through a server-side map instantiation with CDN endpoint
//! negotiation), and the [`controller::OverlayListController`] keeps the
//! in-memory ordered list, the map's layer stack, and the remote store in
//! step across loads, adds and removals.

pub mod config;
pub mod controller;
pub mod endpoint;
pub mod router;

pub use config::{MapsApiConfig, Protocol};
pub use controller::{DashboardSession, OverlayListController};
pub use endpoint::{resolve_endpoint, EndpointContext};
pub use router::{HttpMapInstantiator, LayerGroupConfig, MapInstantiator, RenderRouter};
