//! Record store
//!
//! The `RecordStore` owns the SQLite connection and is the only component
//! that touches the database file. It is constructed once with a resolved
//! path and handed by reference to whatever drives it.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = RecordStore::open(&config)?;
//!
//! let id = store.create(&RecordFields::new("Mail", "alice", "p@ss1", "personal", "mail.example.com"))?;
//! let password = store.get_password(&id)?;
//! let records = store.list()?;
//! ```
//!
//! Every mutating operation runs in its own transaction and is committed
//! with `synchronous = FULL` before returning.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};
use crate::config::Config;
use crate::models::{Record, RecordFields, RecordId};
use crate::storage::error::{StorageError, StoreError, StoreResult};
use crate::storage::schema::{
    get_schema_version, init_schema, needs_init, table_exists, verify_schema, RECORDS_TABLE,
};

const RECORD_SELECT_SQL: &str =
    "SELECT id, name, login, password, description, url FROM passwords";

/// Durable storage of credential records keyed by id
pub struct RecordStore {
    conn: Connection,
    /// Database file, `None` for in-memory stores
    path: Option<PathBuf>,
}

impl RecordStore {
    /// Open the store at the path resolved from the configuration
    pub fn open(config: &Config) -> StoreResult<Self> {
        Self::open_path(config.sqlite_path())
    }

    /// Open or create the database at a specific path
    pub fn open_path(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
        }

        let conn = Connection::open(&path).map_err(|source| StorageError::Open {
            path: path.clone(),
            source,
        })?;

        let store = Self::with_connection(conn, Some(path))?;
        info!(path = ?store.path, "Opened record store");
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, None)
    }

    fn with_connection(conn: Connection, path: Option<PathBuf>) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA synchronous = FULL;")?;
        let store = Self { conn, path };
        store.initialize()?;
        Ok(store)
    }

    /// Ensure the record table exists
    ///
    /// Idempotent: never alters or clears existing rows. Fails with a
    /// schema mismatch if an existing table lacks expected columns.
    pub fn initialize(&self) -> StoreResult<()> {
        // A foreign table must be rejected before anything is written
        if table_exists(&self.conn, RECORDS_TABLE)? {
            verify_schema(&self.conn)?;
        }

        if needs_init(&self.conn) {
            debug!("Initializing schema");
            let tx = self.conn.unchecked_transaction()?;
            init_schema(&tx)?;
            tx.commit()?;
        }
        verify_schema(&self.conn)?;
        Ok(())
    }

    /// Database file path, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Schema version recorded in the database
    pub fn schema_version(&self) -> StoreResult<Option<i32>> {
        Ok(get_schema_version(&self.conn)?)
    }

    /// All records in storage order
    pub fn list(&self) -> StoreResult<Vec<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY rowid", RECORD_SELECT_SQL))?;

        let records = stmt
            .query_map([], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = records.len(), "Listed records");
        Ok(records)
    }

    /// Get a record by id
    pub fn get(&self, id: &RecordId) -> StoreResult<Option<Record>> {
        let record = self
            .conn
            .query_row(
                &format!("{} WHERE id = ?1", RECORD_SELECT_SQL),
                params![id.as_str()],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    /// Get the plaintext password of a record
    pub fn get_password(&self, id: &RecordId) -> StoreResult<String> {
        let password: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT password FROM passwords WHERE id = ?1",
                params![id.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match password {
            Some(password) => Ok(password.unwrap_or_default()),
            None => Err(StoreError::NotFound { id: id.clone() }),
        }
    }

    /// Create a record with a freshly generated id
    pub fn create(&mut self, fields: &RecordFields) -> StoreResult<RecordId> {
        fields.validate()?;
        let id = RecordId::generate();

        let tx = self.conn.transaction()?;
        let result = tx.execute(
            "INSERT INTO passwords (id, name, login, password, description, url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id.as_str(),
                fields.name,
                fields.login,
                fields.password,
                fields.description,
                fields.url
            ],
        );

        match result {
            Ok(_) => {}
            Err(e) if is_primary_key_violation(&e) => return Err(StoreError::Constraint { id }),
            Err(e) => return Err(e.into()),
        }
        tx.commit()?;

        debug!(%id, "Created record");
        Ok(id)
    }

    /// Replace all fields of an existing record
    pub fn update(&mut self, id: &RecordId, fields: &RecordFields) -> StoreResult<()> {
        fields.validate()?;

        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE passwords SET
                name = ?2,
                login = ?3,
                password = ?4,
                description = ?5,
                url = ?6
             WHERE id = ?1",
            params![
                id.as_str(),
                fields.name,
                fields.login,
                fields.password,
                fields.description,
                fields.url
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound { id: id.clone() });
        }
        tx.commit()?;

        debug!(%id, "Updated record");
        Ok(())
    }

    /// Delete a record
    ///
    /// Deleting an id that does not exist is an error, not a no-op.
    pub fn delete(&mut self, id: &RecordId) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "DELETE FROM passwords WHERE id = ?1",
            params![id.as_str()],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound { id: id.clone() });
        }
        tx.commit()?;

        debug!(%id, "Deleted record");
        Ok(())
    }

    /// Number of stored records
    pub fn count(&self) -> StoreResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM passwords", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Ids starting with `prefix` (ASCII case-insensitive), in storage order
    pub fn find_by_prefix(&self, prefix: &str) -> StoreResult<Vec<RecordId>> {
        let prefix = prefix.trim().to_lowercase();
        let ids = self
            .list()?
            .into_iter()
            .map(|r| r.id)
            .filter(|id| id.as_str().to_lowercase().starts_with(&prefix))
            .collect();
        Ok(ids)
    }
}

/// Map a `passwords` row to a record; NULL text reads as empty
fn record_from_row(row: &Row<'_>) -> rusqlite::Result<Record> {
    let id: String = row.get(0)?;

    let text = |idx: usize| -> rusqlite::Result<String> {
        Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
    };

    Ok(Record {
        id: RecordId::from(id),
        name: text(1)?,
        login: text(2)?,
        password: text(3)?,
        description: text(4)?,
        url: text(5)?,
    })
}

fn is_primary_key_violation(error: &rusqlite::Error) -> bool {
    match error {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, ValidationError};
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn mail() -> RecordFields {
        RecordFields::new("Mail", "alice", "p@ss1", "personal", "mail.example.com")
    }

    fn bank() -> RecordFields {
        RecordFields::new("Bank", "alice.b", "s3cret!", "checking", "bank.example.com")
    }

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        }
    }

    #[test]
    fn test_open_creates_database_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let store = RecordStore::open(&config).unwrap();

        assert!(config.sqlite_path().exists());
        assert_eq!(store.path(), Some(config.sqlite_path().as_path()));
        assert_eq!(store.schema_version().unwrap(), Some(1));
    }

    #[test]
    fn test_open_creates_missing_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a").join("b").join("vault.db");

        RecordStore::open_path(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_create_then_list() {
        let mut store = RecordStore::open_in_memory().unwrap();

        let id = store.create(&mail()).unwrap();
        let records = store.list().unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, id);
        assert_eq!(record.name, "Mail");
        assert_eq!(record.login, "alice");
        assert_eq!(record.password, "p@ss1");
        assert_eq!(record.description, "personal");
        assert_eq!(record.url, "mail.example.com");
        assert_eq!(store.get_password(&id).unwrap(), "p@ss1");
    }

    #[test]
    fn test_create_generates_unique_ids() {
        let mut store = RecordStore::open_in_memory().unwrap();

        let mut ids = HashSet::new();
        for _ in 0..20 {
            let before = store.count().unwrap();
            let id = store.create(&mail()).unwrap();
            assert!(ids.insert(id.clone()), "id reused: {}", id);
            assert_eq!(store.count().unwrap(), before + 1);
        }
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let mut store = RecordStore::open_in_memory().unwrap();

        let first = store.create(&mail()).unwrap();
        let second = store.create(&bank()).unwrap();

        let ids: Vec<RecordId> = store.list().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn test_create_rejects_empty_field() {
        let mut store = RecordStore::open_in_memory().unwrap();

        let mut fields = mail();
        fields.set(Field::Description, "");

        let err = store.create(&fields).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::EmptyField(Field::Description))
        ));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_update_replaces_all_fields() {
        let mut store = RecordStore::open_in_memory().unwrap();

        let id = store.create(&mail()).unwrap();
        let other = store.create(&bank()).unwrap();

        let new_fields = RecordFields::new("Mailbox", "alice2", "n3w", "work", "mx.example.org");
        store.update(&id, &new_fields).unwrap();

        let updated = store.get(&id).unwrap().unwrap();
        assert_eq!(updated.fields(), new_fields);
        assert_eq!(store.get_password(&id).unwrap(), "n3w");

        // Other record untouched
        let untouched = store.get(&other).unwrap().unwrap();
        assert_eq!(untouched.fields(), bank());
    }

    #[test]
    fn test_update_missing_id_is_not_found() {
        let mut store = RecordStore::open_in_memory().unwrap();
        store.create(&mail()).unwrap();
        let before = store.list().unwrap();

        let missing = RecordId::generate();
        let err = store.update(&missing, &bank()).unwrap_err();

        assert!(matches!(err, StoreError::NotFound { ref id } if *id == missing));
        assert_eq!(store.list().unwrap(), before);
    }

    #[test]
    fn test_update_rejects_empty_field() {
        let mut store = RecordStore::open_in_memory().unwrap();
        let id = store.create(&mail()).unwrap();

        let mut fields = bank();
        fields.set(Field::Password, "");

        assert!(matches!(
            store.update(&id, &fields),
            Err(StoreError::Validation(_))
        ));
        assert_eq!(store.get_password(&id).unwrap(), "p@ss1");
    }

    #[test]
    fn test_delete_removes_record() {
        let mut store = RecordStore::open_in_memory().unwrap();

        let first = store.create(&mail()).unwrap();
        let second = store.create(&bank()).unwrap();

        store.delete(&first).unwrap();

        let records = store.list().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, second);
        assert_eq!(records[0].fields(), bank());

        assert!(matches!(
            store.get_password(&first),
            Err(StoreError::NotFound { .. })
        ));
        assert!(store.get(&first).unwrap().is_none());
    }

    #[test]
    fn test_delete_missing_id_is_not_found() {
        let mut store = RecordStore::open_in_memory().unwrap();
        store.create(&mail()).unwrap();

        let err = store.delete(&RecordId::generate()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_get_password_missing_id() {
        let store = RecordStore::open_in_memory().unwrap();
        assert!(matches!(
            store.get_password(&RecordId::generate()),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_initialize_twice_keeps_records() {
        let mut store = RecordStore::open_in_memory().unwrap();
        store.create(&mail()).unwrap();
        store.create(&bank()).unwrap();
        let before = store.list().unwrap();

        store.initialize().unwrap();
        store.initialize().unwrap();

        assert_eq!(store.list().unwrap(), before);
    }

    #[test]
    fn test_data_persists_across_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let id = {
            let mut store = RecordStore::open(&config).unwrap();
            store.create(&mail()).unwrap()
        };

        let store = RecordStore::open(&config).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get_password(&id).unwrap(), "p@ss1");
    }

    #[test]
    fn test_duplicate_id_is_constraint_error() {
        let mut store = RecordStore::open_in_memory().unwrap();
        let id = store.create(&mail()).unwrap();

        let err = store
            .conn
            .execute(
                "INSERT INTO passwords (id, name, login, password, description, url)
                 VALUES (?1, 'x', 'x', 'x', 'x', 'x')",
                params![id.as_str()],
            )
            .unwrap_err();

        assert!(is_primary_key_violation(&err));
    }

    #[test]
    fn test_null_columns_read_as_empty() {
        let store = RecordStore::open_in_memory().unwrap();
        let id = RecordId::generate();
        store
            .conn
            .execute(
                "INSERT INTO passwords (id, name) VALUES (?1, 'Legacy')",
                params![id.as_str()],
            )
            .unwrap();

        let record = store.get(&id).unwrap().unwrap();
        assert_eq!(record.name, "Legacy");
        assert_eq!(record.password, "");
        assert_eq!(store.get_password(&id).unwrap(), "");
    }

    #[test]
    fn test_opens_legacy_database() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("passwords.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE passwords (id TEXT PRIMARY KEY, name TEXT, login TEXT,
                 password TEXT, description TEXT, url TEXT);",
            )
            .unwrap();
            conn.execute(
                "INSERT INTO passwords VALUES (?1, 'Mail', 'alice', 'p@ss1', 'personal', 'mail.example.com')",
                params![RecordId::generate().as_str()],
            )
            .unwrap();
        }

        let store = RecordStore::open_path(&path).unwrap();
        let records = store.list().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].login, "alice");
        assert_eq!(store.schema_version().unwrap(), Some(1));
    }

    #[test]
    fn test_open_rejects_foreign_schema() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("other.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE passwords (id TEXT PRIMARY KEY, secret BLOB);")
                .unwrap();
        }

        let err = RecordStore::open_path(&path).err().unwrap();
        assert!(matches!(
            err,
            StoreError::Storage(StorageError::SchemaMismatch { .. })
        ));

        // The rejected file is left exactly as it was
        let conn = Connection::open(&path).unwrap();
        assert!(!table_exists(&conn, "schema_info").unwrap());
    }

    #[test]
    fn test_non_uuid_ids_stay_usable() {
        let mut store = RecordStore::open_in_memory().unwrap();
        store.create(&mail()).unwrap();
        store
            .conn
            .execute(
                "INSERT INTO passwords VALUES ('legacy-1', 'Bank', 'bob', 'pw', 'old', 'bank.example.com')",
                [],
            )
            .unwrap();

        let records = store.list().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id.as_str(), "legacy-1");

        let legacy = RecordId::from("legacy-1");
        assert_eq!(store.get_password(&legacy).unwrap(), "pw");
        assert_eq!(store.find_by_prefix("LEG").unwrap(), vec![legacy.clone()]);

        store.delete(&legacy).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_find_by_prefix() {
        let mut store = RecordStore::open_in_memory().unwrap();
        let id = store.create(&mail()).unwrap();
        store.create(&bank()).unwrap();

        let full = id.to_string();
        assert_eq!(store.find_by_prefix(&full).unwrap(), vec![id.clone()]);
        assert_eq!(
            store.find_by_prefix(&full[..8].to_uppercase()).unwrap(),
            vec![id]
        );
        assert_eq!(store.find_by_prefix("").unwrap().len(), 2);
        assert!(store.find_by_prefix("zzzz").unwrap().is_empty());
    }
}
