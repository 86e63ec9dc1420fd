//! Lazy provisioning of the backing table.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use overlay_common::{OverlayError, OverlayResult};

use crate::statement::Statement;
use crate::transport::QueryTransport;

/// Ensures the backing table exists before any read or write for a dashboard.
///
/// The first successful probe (or provisioning pass) per dashboard is
/// remembered for the session, so repeated calls issue at most one create and
/// one catalog registration.
pub struct SchemaGate<T: QueryTransport> {
    transport: Arc<T>,
    provisioned: Mutex<HashSet<String>>,
}

impl<T: QueryTransport> SchemaGate<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            provisioned: Mutex::new(HashSet::new()),
        }
    }

    /// Probe the table with a trivial scoped read; a non-2xx answer means the
    /// relation does not exist yet, in which case the table is created and
    /// registered with the platform catalog.
    ///
    /// Idempotent: a no-op once the table has been seen for this dashboard in
    /// the current session.
    pub async fn ensure_table(&self, dashboard_id: &str) -> OverlayResult<()> {
        // Held across the provisioning round trips so concurrent callers for
        // the same session cannot double-create.
        let mut provisioned = self.provisioned.lock().await;
        if provisioned.contains(dashboard_id) {
            return Ok(());
        }

        let probe = self
            .transport
            .execute(&Statement::Probe {
                dashboard_id: dashboard_id.to_string(),
            })
            .await?;

        if probe.is_success() {
            provisioned.insert(dashboard_id.to_string());
            return Ok(());
        }

        info!(
            dashboard_id,
            status = probe.status,
            "Backing table missing, provisioning"
        );

        let created = self.transport.execute(&Statement::CreateTable).await?;
        if !created.is_success() {
            warn!(status = created.status, body = %created.body, "Table creation failed");
            return Err(OverlayError::SchemaMissing(format!(
                "create table failed with status {}: {}",
                created.status, created.body
            )));
        }

        let registered = self.transport.execute(&Statement::RegisterTable).await?;
        if !registered.is_success() {
            warn!(status = registered.status, body = %registered.body, "Catalog registration failed");
            return Err(OverlayError::SchemaMissing(format!(
                "catalog registration failed with status {}: {}",
                registered.status, registered.body
            )));
        }

        info!(dashboard_id, "Backing table provisioned");
        provisioned.insert(dashboard_id.to_string());
        Ok(())
    }
}
