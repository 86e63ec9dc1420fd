//! Query transport against the SQL-over-HTTP endpoint.
//!
//! The endpoint accepts a raw query string (`q`) and an API key; any 2xx
//! status is success, non-2xx signals failure (including "relation does not
//! exist" during schema probing). [`QueryTransport`] is the seam tests use to
//! substitute an in-memory table.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use overlay_common::{OverlayError, OverlayRecord, OverlayResult};

use crate::statement::Statement;

/// Connection settings for the query endpoint.
#[derive(Debug, Clone)]
pub struct SqlApiConfig {
    /// Full URL of the query endpoint, e.g. `https://acme.example.com/api/v2/sql`.
    pub endpoint: String,
    /// Pre-issued API key; authentication itself is out of scope.
    pub api_key: String,
    /// HTTP request timeout.
    pub request_timeout: Duration,
}

impl Default for SqlApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://example.com/api/v2/sql".to_string(),
            api_key: String::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Outcome of a single executed statement.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// HTTP status returned by the endpoint.
    pub status: u16,
    /// Decoded overlay rows for read statements; empty for writes.
    pub rows: Vec<OverlayRecord>,
    /// Raw response body, kept for operator-facing error messages.
    pub body: String,
}

impl QueryOutcome {
    pub fn success(rows: Vec<OverlayRecord>) -> Self {
        Self {
            status: 200,
            rows,
            body: String::new(),
        }
    }

    pub fn failure(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            rows: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes typed statements against the backing table.
#[async_trait]
pub trait QueryTransport: Send + Sync + 'static {
    /// Execute a statement. `Err` is reserved for transport-level failures
    /// (network, decode); endpoint rejections come back as a non-2xx
    /// [`QueryOutcome`].
    async fn execute(&self, statement: &Statement) -> OverlayResult<QueryOutcome>;
}

/// reqwest-backed transport: GET for reads, POST for writes.
pub struct HttpQueryTransport {
    client: Client,
    config: SqlApiConfig,
}

impl HttpQueryTransport {
    pub fn new(config: SqlApiConfig) -> OverlayResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| OverlayError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl QueryTransport for HttpQueryTransport {
    async fn execute(&self, statement: &Statement) -> OverlayResult<QueryOutcome> {
        let sql = statement.to_sql();
        let params = [("q", sql.as_str()), ("api_key", self.config.api_key.as_str())];

        // The query serializer URL-encodes the statement text; literal
        // escaping already happened in Statement::to_sql.
        let request = if statement.is_write() {
            self.client.post(&self.config.endpoint).form(&params)
        } else {
            self.client.get(&self.config.endpoint).query(&params)
        };

        let response = request
            .send()
            .await
            .map_err(|e| OverlayError::Transport(format!("Query request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| OverlayError::Transport(format!("Failed to read response body: {}", e)))?;

        debug!(status, write = statement.is_write(), "Query executed");

        let rows = if (200..300).contains(&status) && !statement.is_write() {
            decode_rows(&body)?
        } else {
            Vec::new()
        };

        Ok(QueryOutcome { status, rows, body })
    }
}

/// JSON body shape of the query endpoint: `{ "rows": [...], "total_rows": N }`.
#[derive(Deserialize)]
struct SqlApiBody {
    #[serde(default)]
    rows: Vec<SqlApiRow>,
}

#[derive(Deserialize)]
struct SqlApiRow {
    #[serde(default)]
    tileo_layer_url: String,
    #[serde(default)]
    vis: String,
    #[serde(default)]
    layername: String,
    #[serde(default)]
    is_layer_geotiff: bool,
    #[serde(default)]
    visible: bool,
}

impl From<SqlApiRow> for OverlayRecord {
    fn from(row: SqlApiRow) -> Self {
        OverlayRecord {
            dashboard_id: row.vis,
            layer_name: row.layername,
            source_url: row.tileo_layer_url,
            is_generated_raster: row.is_layer_geotiff,
            visible: row.visible,
        }
    }
}

fn decode_rows(body: &str) -> OverlayResult<Vec<OverlayRecord>> {
    let parsed: SqlApiBody = serde_json::from_str(body)
        .map_err(|e| OverlayError::Decode(format!("Malformed query response: {}", e)))?;
    Ok(parsed.rows.into_iter().map(OverlayRecord::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rows_maps_columns() {
        let body = r#"{
            "rows": [
                {"tileo_layer_url": "https://t/{z}/{x}/{y}.png", "vis": "viz-1",
                 "layername": "NDVI", "is_layer_geotiff": false, "visible": true}
            ],
            "total_rows": 1
        }"#;

        let rows = decode_rows(body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].dashboard_id, "viz-1");
        assert_eq!(rows[0].layer_name, "NDVI");
        assert_eq!(rows[0].source_url, "https://t/{z}/{x}/{y}.png");
        assert!(!rows[0].is_generated_raster);
        assert!(rows[0].visible);
    }

    #[test]
    fn test_decode_rows_empty_result() {
        let rows = decode_rows(r#"{"rows": [], "total_rows": 0}"#).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_decode_rows_rejects_malformed_body() {
        assert!(matches!(
            decode_rows("<html>gateway timeout</html>"),
            Err(OverlayError::Decode(_))
        ));
    }

    #[test]
    fn test_outcome_success_range() {
        assert!(QueryOutcome::success(vec![]).is_success());
        assert!(QueryOutcome::failure(204, "").is_success());
        assert!(!QueryOutcome::failure(404, "relation does not exist").is_success());
        assert!(!QueryOutcome::failure(500, "boom").is_success());
    }
}
