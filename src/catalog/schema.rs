//! Table layout of the catalog database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

pub const TRACK_TABLE: Table = Table {
    name: "music",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("nome", &SqlType::Text, non_null = true),
        sqlite_column!("duracao", &SqlType::Integer, non_null = true),
        sqlite_column!("generos_id", &SqlType::Integer, non_null = true),
        sqlite_column!("lancamento", &SqlType::Text, non_null = true),
        sqlite_column!("created", &SqlType::Text, non_null = true),
        sqlite_column!("modified", &SqlType::Text, non_null = true),
    ],
};

pub const ARTIST_TABLE: Table = Table {
    name: "artist",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("nome", &SqlType::Text, non_null = true),
        sqlite_column!("gravadoras_id", &SqlType::Integer, non_null = true),
        sqlite_column!("created", &SqlType::Text, non_null = true),
        sqlite_column!("modified", &SqlType::Text, non_null = true),
    ],
};

pub const GENRE_TABLE: Table = Table {
    name: "genero",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("descricao", &SqlType::Text, non_null = true),
        sqlite_column!("created", &SqlType::Text, non_null = true),
        sqlite_column!("modified", &SqlType::Text, non_null = true),
    ],
};

pub const LABEL_TABLE: Table = Table {
    name: "gravadora",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("nome", &SqlType::Text, non_null = true),
        sqlite_column!("valor", &SqlType::Integer, non_null = true),
        sqlite_column!("vencimento", &SqlType::Text, non_null = true),
        sqlite_column!("created", &SqlType::Text, non_null = true),
        sqlite_column!("modified", &SqlType::Text, non_null = true),
    ],
};

pub const CUSTOMER_TABLE: Table = Table {
    name: "cliente",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("login", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("senha", &SqlType::Text, non_null = true),
        sqlite_column!("planos_id", &SqlType::Integer, non_null = true),
        sqlite_column!("email", &SqlType::Text, non_null = true),
        sqlite_column!("created", &SqlType::Text, non_null = true),
        sqlite_column!("modified", &SqlType::Text, non_null = true),
    ],
};

pub const PLAN_TABLE: Table = Table {
    name: "plano",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("descricao", &SqlType::Text, non_null = true),
        sqlite_column!("valor", &SqlType::Real, non_null = true),
        sqlite_column!("limite", &SqlType::Integer, non_null = true),
        sqlite_column!("created", &SqlType::Text, non_null = true),
        sqlite_column!("modified", &SqlType::Text, non_null = true),
    ],
};

pub const PAYMENT_TABLE: Table = Table {
    name: "pagamento",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("data", &SqlType::Text, non_null = true),
        sqlite_column!("created", &SqlType::Text, non_null = true),
        sqlite_column!("modified", &SqlType::Text, non_null = true),
    ],
};

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        TRACK_TABLE,
        ARTIST_TABLE,
        GENRE_TABLE,
        LABEL_TABLE,
        CUSTOMER_TABLE,
        PLAN_TABLE,
        PAYMENT_TABLE,
    ],
    migration: None,
}];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::*;
    use crate::catalog::Resource;
    use crate::sqlite_persistence::{open_versioned, BASE_DB_VERSION};
    use rusqlite::Connection;

    #[test]
    fn fresh_database_gets_stamped_and_validates() {
        let mut conn = Connection::open_in_memory().unwrap();
        open_versioned(&mut conn, CATALOG_VERSIONED_SCHEMAS).unwrap();

        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, BASE_DB_VERSION as i64);

        // Opening again takes the validation path.
        open_versioned(&mut conn, CATALOG_VERSIONED_SCHEMAS).unwrap();
    }

    #[test]
    fn customer_login_is_unique_in_the_database() {
        let mut conn = Connection::open_in_memory().unwrap();
        open_versioned(&mut conn, CATALOG_VERSIONED_SCHEMAS).unwrap();
        assert_eq!(CUSTOMER_TABLE.unique_columns(&conn).unwrap(), vec!["login"]);
    }

    #[test]
    fn every_kind_maps_to_a_declared_table() {
        let declared: Vec<&str> = CATALOG_VERSIONED_SCHEMAS[0]
            .tables
            .iter()
            .map(|t| t.name)
            .collect();
        for name in [
            Track::TABLE.name,
            Artist::TABLE.name,
            Genre::TABLE.name,
            Label::TABLE.name,
            Customer::TABLE.name,
            Plan::TABLE.name,
            Payment::TABLE.name,
        ] {
            assert!(declared.contains(&name), "{} is not declared", name);
        }
    }
}
