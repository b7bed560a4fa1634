use anyhow::{bail, Context, Result};
use rusqlite::{params, types::Type, Connection};

/// Offset added to every schema version stored in `PRAGMA user_version`, so a
/// database that was never stamped (version 0) is not mistaken for ours.
pub const BASE_DB_VERSION: usize = 4200;

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                is_unique: false,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }

    fn from_sql(s: &str) -> Option<&'static SqlType> {
        match s {
            "TEXT" => Some(&SqlType::Text),
            "INTEGER" => Some(&SqlType::Integer),
            "REAL" => Some(&SqlType::Real),
            _ => None,
        }
    }
}

pub struct Column<'a, S: AsRef<str>> {
    pub name: S,
    pub sql_type: &'a SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub is_unique: bool,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column<'static, &'static str>],
}

impl Table {
    pub fn create_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let mut def = format!("{} {}", column.name, column.sql_type.as_sql());
                if column.is_primary_key {
                    def.push_str(" PRIMARY KEY");
                }
                if column.non_null {
                    def.push_str(" NOT NULL");
                }
                if column.is_unique {
                    def.push_str(" UNIQUE");
                }
                def
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE {} ({});", self.name, columns)
    }

    pub fn create(&self, conn: &Connection) -> Result<()> {
        conn.execute(&self.create_sql(), params![])
            .with_context(|| format!("Failed to create table {}", self.name))?;
        Ok(())
    }

    pub fn unique_columns(&self, conn: &Connection) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(&format!("PRAGMA index_list({})", self.name))?;
        let unique_indices: Vec<String> = stmt
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, i32>(2)?)))?
            .filter_map(|r| r.ok())
            .filter(|(_, is_unique)| *is_unique == 1)
            .map(|(name, _)| name)
            .collect();

        let mut columns = Vec::new();
        for index_name in unique_indices {
            let mut idx_stmt = conn.prepare(&format!("PRAGMA index_info({})", index_name))?;
            let index_columns: Vec<String> = idx_stmt
                .query_map([], |row| row.get::<_, String>(2))?
                .filter_map(|r| r.ok())
                .collect();
            // Only single-column uniques are declared through `is_unique`.
            if let [column] = index_columns.as_slice() {
                columns.push(column.clone());
            }
        }
        Ok(columns)
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", self.name))?;
        let actual_columns: Vec<Column<'_, String>> = stmt
            .query_map(params![], |row| {
                let type_name = row.get::<_, String>(2)?;
                let sql_type = SqlType::from_sql(&type_name).ok_or_else(|| {
                    rusqlite::Error::InvalidColumnType(2, type_name.clone(), Type::Text)
                })?;
                Ok(Column {
                    name: row.get::<_, String>(1)?,
                    sql_type,
                    non_null: row.get::<_, i32>(3)? == 1,
                    is_primary_key: row.get::<_, i32>(5)? == 1,
                    is_unique: false,
                })
            })?
            .collect::<rusqlite::Result<_>>()
            .with_context(|| format!("Failed to read columns of table {}", self.name))?;

        if actual_columns.len() != self.columns.len() {
            bail!(
                "Table {} has {} columns, expected {}. Found column names: {}, expected: {}",
                self.name,
                actual_columns.len(),
                self.columns.len(),
                actual_columns
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                self.columns
                    .iter()
                    .map(|c| c.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        for (actual, expected) in actual_columns.iter().zip(self.columns.iter()) {
            if actual.name != expected.name {
                bail!(
                    "Table {} Column name mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    actual.name
                );
            }
            if actual.sql_type != expected.sql_type {
                bail!(
                    "Table {} Column {} type mismatch: expected {:?}, got {:?}",
                    self.name,
                    expected.name,
                    expected.sql_type,
                    actual.sql_type
                );
            }
            if actual.non_null != expected.non_null {
                bail!(
                    "Table {} Column {} non-null mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    expected.non_null,
                    actual.non_null
                );
            }
            if actual.is_primary_key != expected.is_primary_key {
                bail!(
                    "Table {} Column {} primary key mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    expected.is_primary_key,
                    actual.is_primary_key
                );
            }
        }

        let unique_columns = self.unique_columns(conn)?;
        for column in self.columns.iter().filter(|c| c.is_unique) {
            if !unique_columns.iter().any(|c| c == column.name) {
                bail!(
                    "Table {} is missing unique constraint on column {}",
                    self.name,
                    column.name
                );
            }
        }
        Ok(())
    }
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
    pub migration: Option<fn(&Connection) -> Result<()>>,
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.create(conn)?;
        }
        conn.pragma_update(None, "user_version", BASE_DB_VERSION + self.version)?;
        Ok(())
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.validate(conn)?;
        }
        Ok(())
    }
}

/// Bring `conn` to the last entry of `schemas`.
///
/// A database without tables gets the latest schema created directly. A
/// stamped database is validated against the schema it claims to be at and
/// then migrated forward inside a single transaction.
pub fn open_versioned(conn: &mut Connection, schemas: &[VersionedSchema]) -> Result<()> {
    let latest = schemas.last().context("No schema versions declared")?;

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;
    if table_count == 0 {
        tracing::info!("Creating database schema at version {}", latest.version);
        return latest.create(conn);
    }

    let raw_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    if raw_version < BASE_DB_VERSION as i64 {
        bail!(
            "Database has tables but no recognised schema version (user_version = {})",
            raw_version
        );
    }
    let db_version = (raw_version - BASE_DB_VERSION as i64) as usize;

    let current = schemas
        .iter()
        .find(|s| s.version == db_version)
        .with_context(|| format!("Unknown database version {}", db_version))?;
    current
        .validate(conn)
        .with_context(|| format!("Schema validation failed for version {}", db_version))?;

    if db_version >= latest.version {
        return Ok(());
    }

    let tx = conn.transaction()?;
    let mut reached = db_version;
    for schema in schemas.iter().filter(|s| s.version > db_version) {
        tracing::info!(
            "Migrating database from version {} to {}",
            reached,
            schema.version
        );
        if let Some(migration_fn) = schema.migration {
            migration_fn(&tx)
                .with_context(|| format!("Failed to run migration to version {}", schema.version))?;
        }
        reached = schema.version;
    }
    tx.pragma_update(None, "user_version", BASE_DB_VERSION + reached)?;
    tx.commit()?;
    Ok(())
}
