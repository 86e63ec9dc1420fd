//! Shared test utilities for the overlay-sync workspace.
//!
//! This crate provides common testing infrastructure including:
//! - An in-memory query transport backed by a fake overlay table
//! - Overlay record fixtures
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fakes;
pub mod fixtures;

// Re-export commonly used items at the crate root
pub use fakes::*;
pub use fixtures::*;
