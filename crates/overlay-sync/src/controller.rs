//! In-memory overlay list, kept in step with the map and the remote store.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use overlay_common::{
    EntryId, MapSurface, OverlayError, OverlayListEntry, OverlayRecord, OverlayResult,
    BASE_LAYER_OFFSET,
};
use overlay_store::{OverlayRecordStore, QueryTransport};

use crate::router::{MapInstantiator, RenderRouter};

/// Per-dashboard session context.
///
/// Passed in at construction instead of living in module globals, so several
/// dashboards on one page cannot leak state into each other.
#[derive(Debug, Clone)]
pub struct DashboardSession {
    pub dashboard_id: String,
}

impl DashboardSession {
    pub fn new(dashboard_id: impl Into<String>) -> Self {
        Self {
            dashboard_id: dashboard_id.into(),
        }
    }
}

/// Owns the ordered list of active overlays for one dashboard session.
///
/// Entries are correlated with map layers and remote rows through stable
/// opaque [`EntryId`]s; positions are derived from the dense vector index, so
/// a removal renumbers everything after it and no stale index can reach the
/// map's layer stack. The remote store is updated after the in-memory state
/// (UI responsiveness over strict consistency); a failed write is logged and
/// never rolled back.
pub struct OverlayListController<I, T, M>
where
    I: MapInstantiator,
    T: QueryTransport,
    M: MapSurface,
{
    session: DashboardSession,
    router: RenderRouter<I>,
    store: Arc<OverlayRecordStore<T>>,
    map: M,
    entries: Vec<OverlayListEntry>,
    pending: Vec<JoinHandle<()>>,
}

impl<I, T, M> OverlayListController<I, T, M>
where
    I: MapInstantiator,
    T: QueryTransport,
    M: MapSurface,
{
    pub fn new(
        session: DashboardSession,
        router: RenderRouter<I>,
        store: Arc<OverlayRecordStore<T>>,
        map: M,
    ) -> Self {
        Self {
            session,
            router,
            store,
            map,
            entries: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Rehydrate previously saved overlays: fetch visible rows and register
    /// them in store order.
    pub async fn load(&mut self) -> OverlayResult<()> {
        let records = self.store.list_visible(&self.session.dashboard_id).await?;
        info!(
            dashboard_id = %self.session.dashboard_id,
            count = records.len(),
            "Restoring saved overlays"
        );
        self.register_loaded(records).await;
        Ok(())
    }

    /// Render and attach a batch of already-persisted records.
    ///
    /// A record that fails to render is skipped with a warning; it gets no
    /// list entry and no persistence write (it is still saved remotely and
    /// will be retried on the next load).
    pub async fn register_loaded(&mut self, records: Vec<OverlayRecord>) {
        for record in records {
            match self.router.render(&record).await {
                Ok(layer) => {
                    self.map.add_layer(layer.clone());
                    self.entries.push(OverlayListEntry {
                        id: EntryId::new(),
                        record,
                        layer,
                    });
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        layer = %record.layer_name,
                        "Saved overlay failed to render, skipping"
                    );
                }
            }
        }
    }

    /// Add a new overlay: render, attach, register, then persist.
    ///
    /// The entry is registered before the remote write is confirmed; the
    /// upsert runs fire-and-forget and a failure only degrades durability. A
    /// render failure leaves the overlay unregistered: no entry, no write.
    pub async fn add(
        &mut self,
        source_url: &str,
        layer_name: &str,
        is_generated_raster: bool,
    ) -> OverlayResult<EntryId> {
        if source_url.trim().is_empty() {
            return Err(OverlayError::MissingUrl);
        }

        let record = OverlayRecord::new(
            self.session.dashboard_id.clone(),
            layer_name,
            source_url,
            is_generated_raster,
        );

        let layer = self.router.render(&record).await?;
        self.map.add_layer(layer.clone());

        let id = EntryId::new();
        self.entries.push(OverlayListEntry {
            id,
            record: record.clone(),
            layer,
        });

        info!(
            dashboard_id = %record.dashboard_id,
            layer = %record.layer_name,
            position = self.entries.len(),
            "Overlay added"
        );

        let store = self.store.clone();
        self.pending.push(tokio::spawn(async move {
            if let Err(e) = store.upsert(&record).await {
                warn!(
                    error = %e,
                    layer = %record.layer_name,
                    "Overlay not durably saved"
                );
            }
        }));

        Ok(id)
    }

    /// Remove an overlay by its stable id.
    ///
    /// Detaches the map layer at the entry's index plus the base-layer
    /// offset, drops the entry (later entries shift down), and soft-deletes
    /// the remote row by source URL.
    pub fn remove(&mut self, id: EntryId) -> OverlayResult<()> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| OverlayError::EntryNotFound(id.to_string()))?;

        if self.map.remove_layer_at(index + BASE_LAYER_OFFSET).is_none() {
            warn!(index, "No map layer at the expected index during removal");
        }
        let entry = self.entries.remove(index);

        info!(
            dashboard_id = %entry.record.dashboard_id,
            layer = %entry.record.layer_name,
            "Overlay removed"
        );

        let store = self.store.clone();
        let dashboard_id = entry.record.dashboard_id;
        let source_url = entry.record.source_url;
        self.pending.push(tokio::spawn(async move {
            if let Err(e) = store.soft_delete(&dashboard_id, &source_url).await {
                warn!(error = %e, url = %source_url, "Overlay removal not durably saved");
            }
        }));

        Ok(())
    }

    /// Await all outstanding persistence writes. Used by tests and on
    /// session shutdown; normal operation never blocks on them.
    pub async fn flush(&mut self) {
        for handle in self.pending.drain(..) {
            handle.await.ok();
        }
    }

    /// Registered entries in list order.
    pub fn entries(&self) -> &[OverlayListEntry] {
        &self.entries
    }

    /// 1-based UI position of an entry, dense and contiguous.
    pub fn position_of(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id).map(|i| i + 1)
    }

    /// Entry whose record carries the given layer name.
    pub fn find_by_name(&self, layer_name: &str) -> Option<&OverlayListEntry> {
        self.entries.iter().find(|e| e.record.layer_name == layer_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The underlying map surface.
    pub fn map(&self) -> &M {
        &self.map
    }
}
