//! SQLite-backed record store, generic over the catalog kinds.
//!
//! One connection sits behind a mutex; every call takes the lock for its
//! whole duration, and writes run inside `BEGIN IMMEDIATE` so a failure
//! leaves nothing behind.

use super::models::{
    Artist, Customer, Genre, Label, NewRecord, Payment, Plan, Record, Timestamp, Track,
};
use super::resource::{Resource, ResourceKind, CREATED_COLUMN, ID_COLUMN, MODIFIED_COLUMN};
use super::schema::CATALOG_VERSIONED_SCHEMAS;
use crate::sqlite_persistence::open_versioned;
use anyhow::Context;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} with id {id} not found")]
    NotFound { kind: ResourceKind, id: i64 },

    #[error("{kind} with id {id} already exists")]
    DuplicateKey { kind: ResourceKind, id: i64 },

    #[error("{kind} with the same {field} already exists")]
    UniqueViolation { kind: ResourceKind, field: String },

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database connection lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Clone)]
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// Open (or create) the catalog database at `db_path`.
    pub fn new<P: AsRef<Path>>(db_path: P) -> anyhow::Result<Self> {
        let db_path = db_path.as_ref();
        let mut conn = Connection::open_with_flags(
            db_path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open catalog database {:?}", db_path))?;

        open_versioned(&mut conn, CATALOG_VERSIONED_SCHEMAS)
            .with_context(|| format!("Failed to prepare catalog database {:?}", db_path))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let store = Self::from_connection(conn);
        info!("Opened catalog {:?}: {}", db_path, store.contents_summary()?);
        Ok(store)
    }

    /// A throwaway store, mostly for tests.
    pub fn in_memory() -> anyhow::Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        open_versioned(&mut conn, CATALOG_VERSIONED_SCHEMAS)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        SqliteRecordStore {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Raw access to the connection, for tests that need a broken store.
    #[cfg(test)]
    pub(crate) fn execute_batch(&self, sql: &str) -> StoreResult<()> {
        self.lock()?.execute_batch(sql)?;
        Ok(())
    }

    /// "0 track, 2 artist, ..." for the startup log.
    fn contents_summary(&self) -> StoreResult<String> {
        let counts = [
            (Track::KIND, self.count::<Track>()?),
            (Artist::KIND, self.count::<Artist>()?),
            (Genre::KIND, self.count::<Genre>()?),
            (Label::KIND, self.count::<Label>()?),
            (Customer::KIND, self.count::<Customer>()?),
            (Plan::KIND, self.count::<Plan>()?),
            (Payment::KIND, self.count::<Payment>()?),
        ];
        Ok(counts
            .iter()
            .map(|(kind, count)| format!("{} {}", count, kind))
            .collect::<Vec<_>>()
            .join(", "))
    }

    pub fn create<R: Resource>(&self, new: NewRecord<R>) -> StoreResult<Record<R>> {
        let conn = self.lock()?;
        let NewRecord { id, mut fields } = new;
        let now = Timestamp::now();
        fields.on_create(now);

        write_transaction(&conn, |conn| {
            if let Some(id) = id {
                let exists: bool = conn.query_row(
                    &format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", R::TABLE.name),
                    params![id],
                    |r| r.get(0),
                )?;
                if exists {
                    return Err(StoreError::DuplicateKey { kind: R::KIND, id });
                }
            }

            let mut columns = Vec::new();
            let mut values = Vec::new();
            if let Some(id) = id {
                columns.push(ID_COLUMN);
                values.push(Value::Integer(id));
            }
            columns.extend(R::data_columns());
            values.extend(fields.to_sql_values());
            columns.push(CREATED_COLUMN);
            values.push(Value::Text(now.to_string()));
            columns.push(MODIFIED_COLUMN);
            values.push(Value::Text(now.to_string()));

            let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({})",
                R::TABLE.name,
                columns.join(", "),
                placeholders.join(", ")
            );
            conn.execute(&sql, params_from_iter(values.iter()))
                .map_err(|e| constraint_error::<R>(id, e))?;

            let id = conn.last_insert_rowid();
            debug!("Created {} {}", R::KIND, id);
            Ok(Record {
                id,
                fields,
                created: now,
                modified: now,
            })
        })
    }

    pub fn fetch<R: Resource>(&self, id: i64) -> StoreResult<Record<R>> {
        let conn = self.lock()?;
        select_one::<R>(&conn, id)?.ok_or(StoreError::NotFound { kind: R::KIND, id })
    }

    /// Every record of kind `R`, by ascending id.
    pub fn list<R: Resource>(&self) -> StoreResult<Vec<Record<R>>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} ORDER BY id",
            select_list::<R>(),
            R::TABLE.name
        ))?;
        let records = stmt
            .query_map([], record_from_row::<R>)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Merge `patch` into the stored record and bump `modified`.
    pub fn apply_patch<R: Resource>(&self, id: i64, patch: R::Patch) -> StoreResult<Record<R>> {
        let conn = self.lock()?;
        write_transaction(&conn, |conn| {
            let mut record =
                select_one::<R>(conn, id)?.ok_or(StoreError::NotFound { kind: R::KIND, id })?;
            record.fields.merge(patch);
            record.modified = Timestamp::now();

            let mut assignments: Vec<String> = R::data_columns()
                .iter()
                .enumerate()
                .map(|(i, column)| format!("{} = ?{}", column, i + 1))
                .collect();
            let mut values = record.fields.to_sql_values();
            values.push(Value::Text(record.modified.to_string()));
            assignments.push(format!("{} = ?{}", MODIFIED_COLUMN, values.len()));
            values.push(Value::Integer(id));

            let sql = format!(
                "UPDATE {} SET {} WHERE id = ?{}",
                R::TABLE.name,
                assignments.join(", "),
                values.len()
            );
            conn.execute(&sql, params_from_iter(values.iter()))
                .map_err(|e| constraint_error::<R>(None, e))?;

            debug!("Updated {} {}", R::KIND, id);
            Ok(record)
        })
    }

    pub fn delete<R: Resource>(&self, id: i64) -> StoreResult<()> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", R::TABLE.name),
            params![id],
        )?;
        if deleted == 0 {
            return Err(StoreError::NotFound { kind: R::KIND, id });
        }
        debug!("Deleted {} {}", R::KIND, id);
        Ok(())
    }

    pub fn count<R: Resource>(&self) -> StoreResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", R::TABLE.name),
            [],
            |r| r.get(0),
        )?;
        Ok(count as usize)
    }
}

fn write_transaction<T>(
    conn: &Connection,
    f: impl FnOnce(&Connection) -> StoreResult<T>,
) -> StoreResult<T> {
    conn.execute("BEGIN IMMEDIATE", [])?;
    match f(conn) {
        Ok(value) => {
            conn.execute("COMMIT", [])?;
            Ok(value)
        }
        Err(e) => {
            let _ = conn.execute("ROLLBACK", []);
            Err(e)
        }
    }
}

fn select_list<R: Resource>() -> String {
    R::TABLE
        .columns
        .iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn select_one<R: Resource>(conn: &Connection, id: i64) -> StoreResult<Option<Record<R>>> {
    let record = conn
        .query_row(
            &format!(
                "SELECT {} FROM {} WHERE id = ?1",
                select_list::<R>(),
                R::TABLE.name
            ),
            params![id],
            record_from_row::<R>,
        )
        .optional()?;
    Ok(record)
}

fn record_from_row<R: Resource>(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record<R>> {
    Ok(Record {
        id: row.get(ID_COLUMN)?,
        fields: R::from_row(row)?,
        created: row.get(CREATED_COLUMN)?,
        modified: row.get(MODIFIED_COLUMN)?,
    })
}

/// Turn SQLite constraint failures into the store's conflict outcomes.
fn constraint_error<R: Resource>(id: Option<i64>, err: rusqlite::Error) -> StoreError {
    let kind = R::KIND;
    if let rusqlite::Error::SqliteFailure(failure, message) = &err {
        match (failure.extended_code, id) {
            (rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY, Some(id)) => {
                return StoreError::DuplicateKey { kind, id };
            }
            (rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE, _) => {
                // "UNIQUE constraint failed: cliente.login"
                let field = message
                    .as_deref()
                    .and_then(|m| m.rsplit_once('.'))
                    .map(|(_, column)| column)
                    .or_else(|| unique_column::<R>())
                    .unwrap_or(ID_COLUMN)
                    .to_string();
                return StoreError::UniqueViolation { kind, field };
            }
            _ => {}
        }
    }
    StoreError::Sqlite(err)
}

fn unique_column<R: Resource>() -> Option<&'static str> {
    R::TABLE
        .columns
        .iter()
        .find(|column| column.is_unique)
        .map(|column| column.name)
}
