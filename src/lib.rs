//! Music catalog server library
//!
//! Exposes the catalog, persistence and HTTP layers for the binary and the
//! end-to-end tests.

pub mod catalog;
pub mod config;
pub mod server;
pub mod sqlite_persistence;

pub use catalog::SqliteRecordStore;
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
