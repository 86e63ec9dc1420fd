//! Overlay record store: idempotent upsert and soft delete.

use std::sync::Arc;

use overlay_common::{OverlayError, OverlayRecord, OverlayResult};

use crate::schema::SchemaGate;
use crate::statement::Statement;
use crate::transport::QueryTransport;

/// Remote store for overlay rows, keyed by (dashboard id, layer name).
///
/// Every operation passes through the schema gate first, so the backing table
/// is provisioned on the first use within a session.
pub struct OverlayRecordStore<T: QueryTransport> {
    transport: Arc<T>,
    gate: SchemaGate<T>,
}

impl<T: QueryTransport> OverlayRecordStore<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            gate: SchemaGate::new(transport.clone()),
            transport,
        }
    }

    /// All rows with `visible = true` for a dashboard, in arrival order.
    ///
    /// Row order carries no meaning beyond "render in listed order".
    pub async fn list_visible(&self, dashboard_id: &str) -> OverlayResult<Vec<OverlayRecord>> {
        self.gate.ensure_table(dashboard_id).await?;

        let outcome = self
            .transport
            .execute(&Statement::ListVisible {
                dashboard_id: dashboard_id.to_string(),
            })
            .await?;

        if !outcome.is_success() {
            return Err(OverlayError::RemoteReadFailed(format!(
                "status {}: {}",
                outcome.status, outcome.body
            )));
        }

        Ok(outcome.rows)
    }

    /// Update the row matching the record's natural key, inserting it if
    /// absent.
    ///
    /// The update runs first; the conditional insert that follows holds a
    /// table-level exclusive lock and re-checks the natural key, so a
    /// concurrent first-time add of the same layer name from another session
    /// cannot produce a duplicate. Calling twice with the same key leaves
    /// exactly one live row carrying the latest values.
    pub async fn upsert(&self, record: &OverlayRecord) -> OverlayResult<()> {
        self.gate.ensure_table(&record.dashboard_id).await?;

        let updated = self
            .transport
            .execute(&Statement::Update {
                record: record.clone(),
            })
            .await?;
        if !updated.is_success() {
            return Err(OverlayError::RemoteWriteFailed(format!(
                "update returned status {}: {}",
                updated.status, updated.body
            )));
        }

        // No-op when the update matched; the guard makes it safe either way.
        let inserted = self
            .transport
            .execute(&Statement::InsertIfAbsent {
                record: record.clone(),
            })
            .await?;
        if !inserted.is_success() {
            return Err(OverlayError::RemoteWriteFailed(format!(
                "conditional insert returned status {}: {}",
                inserted.status, inserted.body
            )));
        }

        Ok(())
    }

    /// Set `visible = false` on the row matching (dashboard, source URL).
    ///
    /// Rows are never physically removed; the history stays queryable by
    /// natural key.
    pub async fn soft_delete(&self, dashboard_id: &str, source_url: &str) -> OverlayResult<()> {
        self.gate.ensure_table(dashboard_id).await?;

        let outcome = self
            .transport
            .execute(&Statement::SoftDelete {
                dashboard_id: dashboard_id.to_string(),
                source_url: source_url.to_string(),
            })
            .await?;

        if !outcome.is_success() {
            return Err(OverlayError::RemoteWriteFailed(format!(
                "soft delete returned status {}: {}",
                outcome.status, outcome.body
            )));
        }

        Ok(())
    }
}
