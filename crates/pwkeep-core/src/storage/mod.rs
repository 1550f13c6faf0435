//! Storage layer
//!
//! SQLite schema management and the error types surfaced by the record
//! store.
//!
//! ## Layout
//!
//! - `passwords`: one row per record, `id` is the primary key
//! - `schema_info`: key/value pairs, currently only `version`

pub mod error;
pub mod schema;

pub use error::{StorageError, StorageResult, StoreError, StoreResult};
pub use schema::{init_schema, needs_init, verify_schema, SCHEMA_VERSION};
