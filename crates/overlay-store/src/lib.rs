//! Remote persistence for dashboard overlay records.
//!
//! Overlay rows live in a backing table on a hosted SQL-over-HTTP service.
//! The table is provisioned lazily the first time a dashboard saves an
//! overlay ([`schema::SchemaGate`]), and rows are written with idempotent
//! upsert and soft-delete semantics ([`records::OverlayRecordStore`]).
//!
//! Queries are built as typed [`statement::Statement`]s and executed through
//! the [`transport::QueryTransport`] seam, so tests can run against an
//! in-memory table instead of the network.

pub mod records;
pub mod schema;
pub mod statement;
pub mod transport;

pub use records::OverlayRecordStore;
pub use schema::SchemaGate;
pub use statement::{encode_text_literal, Statement, TABLE_NAME};
pub use transport::{HttpQueryTransport, QueryOutcome, QueryTransport, SqlApiConfig};
