//! Typed query statements and their SQL rendering.
//!
//! The record store never interpolates user input into SQL directly: every
//! statement is built as a variant here, and every user-supplied field passes
//! through [`encode_text_literal`] when the statement is rendered for the
//! wire.

use overlay_common::OverlayRecord;

/// Name of the backing table holding overlay rows for all dashboards.
pub const TABLE_NAME: &str = "tileo_layers";

/// A query against the backing table.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Trivial scoped read used to detect whether the table exists.
    Probe { dashboard_id: String },

    /// Create the backing table with the full five-column schema.
    CreateTable,

    /// Register the table with the hosting platform's internal catalog so it
    /// stays queryable through the same API.
    RegisterTable,

    /// All visible rows for a dashboard, arrival order.
    ListVisible { dashboard_id: String },

    /// Update the row matching the record's natural key.
    Update { record: OverlayRecord },

    /// Insert the record unless its natural key already exists. Rendered as a
    /// transaction holding a table-level exclusive lock so two racing
    /// first-time adds of the same name cannot both insert.
    InsertIfAbsent { record: OverlayRecord },

    /// Mark the row matching (dashboard, source URL) invisible. The UI
    /// identifies rows by URL at delete time, not by name.
    SoftDelete {
        dashboard_id: String,
        source_url: String,
    },
}

impl Statement {
    /// Whether the statement mutates the backing table.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Statement::CreateTable
                | Statement::RegisterTable
                | Statement::Update { .. }
                | Statement::InsertIfAbsent { .. }
                | Statement::SoftDelete { .. }
        )
    }

    /// Render the statement to SQL text for the query endpoint.
    pub fn to_sql(&self) -> String {
        match self {
            Statement::Probe { dashboard_id } => format!(
                "SELECT layername FROM {} WHERE vis = {} LIMIT 1",
                TABLE_NAME,
                encode_text_literal(dashboard_id)
            ),
            Statement::CreateTable => format!(
                "CREATE TABLE {} (tileo_layer_url TEXT, vis TEXT, layername TEXT, \
                 is_layer_geotiff BOOLEAN, visible BOOLEAN)",
                TABLE_NAME
            ),
            Statement::RegisterTable => {
                format!("SELECT CDB_CartodbfyTable('{}')", TABLE_NAME)
            }
            Statement::ListVisible { dashboard_id } => format!(
                "SELECT tileo_layer_url, vis, layername, is_layer_geotiff, visible \
                 FROM {} WHERE vis = {} AND visible = true",
                TABLE_NAME,
                encode_text_literal(dashboard_id)
            ),
            Statement::Update { record } => format!(
                "UPDATE {} SET tileo_layer_url = {}, is_layer_geotiff = {}, visible = true \
                 WHERE vis = {} AND layername = {}",
                TABLE_NAME,
                encode_text_literal(&record.source_url),
                bool_literal(record.is_generated_raster),
                encode_text_literal(&record.dashboard_id),
                encode_text_literal(&record.layer_name)
            ),
            Statement::InsertIfAbsent { record } => format!(
                "BEGIN; LOCK TABLE {table} IN EXCLUSIVE MODE; \
                 INSERT INTO {table} (tileo_layer_url, vis, layername, is_layer_geotiff, visible) \
                 SELECT {url}, {vis}, {name}, {geotiff}, true \
                 WHERE NOT EXISTS (SELECT 1 FROM {table} WHERE vis = {vis} AND layername = {name}); \
                 COMMIT;",
                table = TABLE_NAME,
                url = encode_text_literal(&record.source_url),
                vis = encode_text_literal(&record.dashboard_id),
                name = encode_text_literal(&record.layer_name),
                geotiff = bool_literal(record.is_generated_raster),
            ),
            Statement::SoftDelete {
                dashboard_id,
                source_url,
            } => format!(
                "UPDATE {} SET visible = false WHERE vis = {} AND tileo_layer_url = {}",
                TABLE_NAME,
                encode_text_literal(dashboard_id),
                encode_text_literal(source_url)
            ),
        }
    }
}

/// Encode a user-supplied value as a SQL text literal.
///
/// Single quotes are doubled and the value is wrapped in quotes. URL-level
/// encoding of the whole query string is the transport's job.
pub fn encode_text_literal(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', "''"))
}

fn bool_literal(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> OverlayRecord {
        OverlayRecord::new("viz-1", "NDVI", "https://t/{z}/{x}/{y}.png", false)
    }

    #[test]
    fn test_encode_doubles_single_quotes() {
        assert_eq!(encode_text_literal("O'Brien"), "'O''Brien'");
        assert_eq!(encode_text_literal("'; DROP TABLE x; --"), "'''; DROP TABLE x; --'");
    }

    #[test]
    fn test_probe_is_scoped_read() {
        let sql = Statement::Probe {
            dashboard_id: "viz-1".into(),
        }
        .to_sql();
        assert_eq!(
            sql,
            "SELECT layername FROM tileo_layers WHERE vis = 'viz-1' LIMIT 1"
        );
    }

    #[test]
    fn test_create_table_has_all_five_columns() {
        let sql = Statement::CreateTable.to_sql();
        for column in [
            "tileo_layer_url TEXT",
            "vis TEXT",
            "layername TEXT",
            "is_layer_geotiff BOOLEAN",
            "visible BOOLEAN",
        ] {
            assert!(sql.contains(column), "missing column in: {}", sql);
        }
    }

    #[test]
    fn test_update_encodes_user_fields() {
        let mut rec = record();
        rec.layer_name = "it's".into();
        let sql = Statement::Update { record: rec }.to_sql();
        assert!(sql.contains("layername = 'it''s'"));
        assert!(sql.contains("visible = true"));
    }

    #[test]
    fn test_insert_if_absent_holds_exclusive_lock() {
        let sql = Statement::InsertIfAbsent { record: record() }.to_sql();
        assert!(sql.starts_with("BEGIN; LOCK TABLE tileo_layers IN EXCLUSIVE MODE;"));
        assert!(sql.contains("WHERE NOT EXISTS"));
        assert!(sql.trim_end().ends_with("COMMIT;"));
    }

    #[test]
    fn test_soft_delete_matches_by_url() {
        let sql = Statement::SoftDelete {
            dashboard_id: "viz-1".into(),
            source_url: "https://t/{z}/{x}/{y}.png".into(),
        }
        .to_sql();
        assert!(sql.contains("SET visible = false"));
        assert!(sql.contains("tileo_layer_url = 'https://t/{z}/{x}/{y}.png'"));
        assert!(!sql.contains("layername ="));
    }

    #[test]
    fn test_write_classification() {
        assert!(!Statement::Probe {
            dashboard_id: "v".into()
        }
        .is_write());
        assert!(!Statement::ListVisible {
            dashboard_id: "v".into()
        }
        .is_write());
        assert!(Statement::CreateTable.is_write());
        assert!(Statement::RegisterTable.is_write());
        assert!(Statement::Update { record: record() }.is_write());
        assert!(Statement::InsertIfAbsent { record: record() }.is_write());
        assert!(Statement::SoftDelete {
            dashboard_id: "v".into(),
            source_url: "u".into()
        }
        .is_write());
    }
}
