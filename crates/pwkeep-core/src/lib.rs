//! pwkeep Core Library
//!
//! This crate provides the record store for pwkeep, a local,
//! single-user keeper of credential records (name, login, password,
//! description, URL) backed by SQLite.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut store = RecordStore::open(&config)?;
//!
//! // Add a record
//! let fields = RecordFields::new("Mail", "alice", "p@ss1", "personal", "mail.example.com");
//! let id = store.create(&fields)?;
//!
//! // Query records
//! let records = store.list()?;
//! let password = store.get_password(&id)?;
//! ```
//!
//! # Modules
//!
//! - `store`: Record store (main entry point)
//! - `models`: Records, fields and the per-field mask/copy policy
//! - `storage`: SQLite schema and error types
//! - `config`: Application configuration

pub mod config;
pub mod models;
pub mod storage;
pub mod store;

pub use config::Config;
pub use models::{
    mask, CopySource, Field, FieldPolicy, Record, RecordFields, RecordId, ValidationError,
};
pub use storage::{StorageError, StoreError, StoreResult};
pub use store::RecordStore;
