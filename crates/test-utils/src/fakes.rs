//! In-memory stand-ins for the remote collaborators.

use std::sync::Mutex;

use async_trait::async_trait;

use overlay_common::{OverlayRecord, OverlayResult};
use overlay_store::{QueryOutcome, QueryTransport, Statement};

/// Counters for the statements a [`MemoryQueryTransport`] has seen.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatementCounts {
    pub probes: usize,
    pub creates: usize,
    pub registrations: usize,
    pub writes: usize,
}

#[derive(Debug, Default)]
struct MemoryTable {
    provisioned: bool,
    rows: Vec<OverlayRecord>,
    counts: StatementCounts,
    fail_writes: bool,
}

/// A [`QueryTransport`] that interprets statements against an in-memory
/// table, mirroring the backing-table semantics closely enough for store and
/// controller tests.
#[derive(Debug, Default)]
pub struct MemoryQueryTransport {
    table: Mutex<MemoryTable>,
}

impl MemoryQueryTransport {
    /// An empty transport whose table does not exist yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose table already exists.
    pub fn provisioned() -> Self {
        let transport = Self::default();
        transport.table.lock().unwrap().provisioned = true;
        transport
    }

    /// Seed the table with rows (marks it provisioned).
    pub fn with_rows(rows: Vec<OverlayRecord>) -> Self {
        let transport = Self::provisioned();
        transport.table.lock().unwrap().rows = rows;
        transport
    }

    /// Make every subsequent write statement fail with a 500.
    pub fn fail_writes(&self, fail: bool) {
        self.table.lock().unwrap().fail_writes = fail;
    }

    pub fn counts(&self) -> StatementCounts {
        self.table.lock().unwrap().counts
    }

    /// Snapshot of all rows, soft-deleted ones included.
    pub fn rows(&self) -> Vec<OverlayRecord> {
        self.table.lock().unwrap().rows.clone()
    }

    /// Direct lookup by natural key, bypassing the visibility filter.
    pub fn find(&self, dashboard_id: &str, layer_name: &str) -> Option<OverlayRecord> {
        self.table
            .lock()
            .unwrap()
            .rows
            .iter()
            .find(|r| r.dashboard_id == dashboard_id && r.layer_name == layer_name)
            .cloned()
    }
}

#[async_trait]
impl QueryTransport for MemoryQueryTransport {
    async fn execute(&self, statement: &Statement) -> OverlayResult<QueryOutcome> {
        let mut table = self.table.lock().unwrap();

        if statement.is_write() && table.fail_writes {
            table.counts.writes += 1;
            return Ok(QueryOutcome::failure(500, "injected write failure"));
        }

        let outcome = match statement {
            Statement::Probe { .. } => {
                table.counts.probes += 1;
                if table.provisioned {
                    QueryOutcome::success(Vec::new())
                } else {
                    QueryOutcome::failure(404, "relation \"tileo_layers\" does not exist")
                }
            }
            Statement::CreateTable => {
                table.counts.creates += 1;
                table.counts.writes += 1;
                table.provisioned = true;
                QueryOutcome::success(Vec::new())
            }
            Statement::RegisterTable => {
                table.counts.registrations += 1;
                table.counts.writes += 1;
                QueryOutcome::success(Vec::new())
            }
            Statement::ListVisible { dashboard_id } => {
                if !table.provisioned {
                    QueryOutcome::failure(404, "relation \"tileo_layers\" does not exist")
                } else {
                    let rows = table
                        .rows
                        .iter()
                        .filter(|r| r.dashboard_id == *dashboard_id && r.visible)
                        .cloned()
                        .collect();
                    QueryOutcome::success(rows)
                }
            }
            Statement::Update { record } => {
                table.counts.writes += 1;
                for row in table.rows.iter_mut().filter(|r| {
                    r.dashboard_id == record.dashboard_id && r.layer_name == record.layer_name
                }) {
                    row.source_url = record.source_url.clone();
                    row.is_generated_raster = record.is_generated_raster;
                    row.visible = true;
                }
                QueryOutcome::success(Vec::new())
            }
            Statement::InsertIfAbsent { record } => {
                table.counts.writes += 1;
                let exists = table.rows.iter().any(|r| {
                    r.dashboard_id == record.dashboard_id && r.layer_name == record.layer_name
                });
                if !exists {
                    table.rows.push(record.clone());
                }
                QueryOutcome::success(Vec::new())
            }
            Statement::SoftDelete {
                dashboard_id,
                source_url,
            } => {
                table.counts.writes += 1;
                for row in table
                    .rows
                    .iter_mut()
                    .filter(|r| r.dashboard_id == *dashboard_id && r.source_url == *source_url)
                {
                    row.visible = false;
                }
                QueryOutcome::success(Vec::new())
            }
        };

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_flips_after_create() {
        let transport = MemoryQueryTransport::new();

        let probe = transport
            .execute(&Statement::Probe {
                dashboard_id: "viz".into(),
            })
            .await
            .unwrap();
        assert!(!probe.is_success());

        transport.execute(&Statement::CreateTable).await.unwrap();

        let probe = transport
            .execute(&Statement::Probe {
                dashboard_id: "viz".into(),
            })
            .await
            .unwrap();
        assert!(probe.is_success());
    }

    #[tokio::test]
    async fn test_injected_write_failure() {
        let transport = MemoryQueryTransport::provisioned();
        transport.fail_writes(true);

        let outcome = transport
            .execute(&Statement::SoftDelete {
                dashboard_id: "viz".into(),
                source_url: "u".into(),
            })
            .await
            .unwrap();
        assert_eq!(outcome.status, 500);
    }
}
