//! Record store and schema gate tests against the in-memory transport.

use std::sync::Arc;

use overlay_common::OverlayError;
use overlay_store::{OverlayRecordStore, SchemaGate};
use test_utils::{tile_record, MemoryQueryTransport, TEST_DASHBOARD};

// ============================================================================
// Schema gate
// ============================================================================

#[tokio::test]
async fn test_ensure_table_provisions_once() {
    let transport = Arc::new(MemoryQueryTransport::new());
    let gate = SchemaGate::new(transport.clone());

    for _ in 0..5 {
        gate.ensure_table(TEST_DASHBOARD).await.unwrap();
    }

    let counts = transport.counts();
    assert_eq!(counts.creates, 1);
    assert_eq!(counts.registrations, 1);
    // Provisioned set short-circuits repeat calls entirely.
    assert_eq!(counts.probes, 1);
}

#[tokio::test]
async fn test_ensure_table_noop_when_table_exists() {
    let transport = Arc::new(MemoryQueryTransport::provisioned());
    let gate = SchemaGate::new(transport.clone());

    gate.ensure_table(TEST_DASHBOARD).await.unwrap();
    gate.ensure_table("another-viz").await.unwrap();

    let counts = transport.counts();
    assert_eq!(counts.creates, 0);
    assert_eq!(counts.registrations, 0);
}

// ============================================================================
// Upsert
// ============================================================================

#[tokio::test]
async fn test_upsert_inserts_on_first_use() {
    let transport = Arc::new(MemoryQueryTransport::new());
    let store = OverlayRecordStore::new(transport.clone());

    store.upsert(&tile_record("NDVI")).await.unwrap();

    let visible = store.list_visible(TEST_DASHBOARD).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].layer_name, "NDVI");
}

#[tokio::test]
async fn test_upsert_is_idempotent_on_natural_key() {
    let transport = Arc::new(MemoryQueryTransport::provisioned());
    let store = OverlayRecordStore::new(transport.clone());

    let mut record = tile_record("NDVI");
    store.upsert(&record).await.unwrap();

    record.source_url = "https://other.example.com/{z}/{x}/{y}.png".to_string();
    store.upsert(&record).await.unwrap();

    let rows = transport.rows();
    assert_eq!(rows.len(), 1, "duplicate row for the same natural key");
    assert_eq!(rows[0].source_url, "https://other.example.com/{z}/{x}/{y}.png");
    assert!(rows[0].visible);
}

#[tokio::test]
async fn test_upsert_revives_soft_deleted_row() {
    let transport = Arc::new(MemoryQueryTransport::provisioned());
    let store = OverlayRecordStore::new(transport.clone());

    let record = tile_record("NDVI");
    store.upsert(&record).await.unwrap();
    store
        .soft_delete(TEST_DASHBOARD, &record.source_url)
        .await
        .unwrap();

    store.upsert(&record).await.unwrap();

    let visible = store.list_visible(TEST_DASHBOARD).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(transport.rows().len(), 1);
}

#[tokio::test]
async fn test_upsert_failure_surfaces_as_remote_write() {
    let transport = Arc::new(MemoryQueryTransport::provisioned());
    transport.fail_writes(true);
    let store = OverlayRecordStore::new(transport);

    let err = store.upsert(&tile_record("NDVI")).await.unwrap_err();
    assert!(matches!(err, OverlayError::RemoteWriteFailed(_)));
    assert!(err.is_durability_only());
}

// ============================================================================
// Soft delete
// ============================================================================

#[tokio::test]
async fn test_soft_delete_retains_history() {
    let transport = Arc::new(MemoryQueryTransport::provisioned());
    let store = OverlayRecordStore::new(transport.clone());

    let record = tile_record("NDVI");
    store.upsert(&record).await.unwrap();
    store
        .soft_delete(TEST_DASHBOARD, &record.source_url)
        .await
        .unwrap();

    let visible = store.list_visible(TEST_DASHBOARD).await.unwrap();
    assert!(visible.is_empty());

    // The row is still there by natural key, just hidden.
    let hidden = transport.find(TEST_DASHBOARD, "NDVI").unwrap();
    assert!(!hidden.visible);
}

#[tokio::test]
async fn test_soft_delete_only_touches_matching_url() {
    let transport = Arc::new(MemoryQueryTransport::provisioned());
    let store = OverlayRecordStore::new(transport.clone());

    let ndvi = tile_record("NDVI");
    let rgb = tile_record("RGB");
    store.upsert(&ndvi).await.unwrap();
    store.upsert(&rgb).await.unwrap();

    store
        .soft_delete(TEST_DASHBOARD, &ndvi.source_url)
        .await
        .unwrap();

    let visible = store.list_visible(TEST_DASHBOARD).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].layer_name, "RGB");
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_visible_scopes_by_dashboard() {
    let transport = Arc::new(MemoryQueryTransport::provisioned());
    let store = OverlayRecordStore::new(transport);

    store.upsert(&tile_record("NDVI")).await.unwrap();
    let mut other = tile_record("NDVI");
    other.dashboard_id = "someone-elses-viz".to_string();
    store.upsert(&other).await.unwrap();

    let visible = store.list_visible(TEST_DASHBOARD).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].dashboard_id, TEST_DASHBOARD);
}
