//! Test fixture creation

use super::constants::*;
use anyhow::Result;
use music_catalog_server::catalog::{
    Artist, Customer, Genre, Label, NewRecord, Payment, Plan, Timestamp, Track,
};
use music_catalog_server::SqliteRecordStore;
use std::path::PathBuf;
use tempfile::TempDir;

/// Creates a temporary database holding one record of every kind.
/// Returns (temp_dir, db_path)
pub fn create_test_db() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("music_database.db");
    let store = SqliteRecordStore::new(&db_path)?;

    store.create(NewRecord::with_id(
        GENRE_1_ID,
        Genre {
            description: GENRE_1_DESCRIPTION.to_string(),
        },
    ))?;
    store.create(NewRecord::with_id(
        LABEL_1_ID,
        Label {
            name: LABEL_1_NAME.to_string(),
            fee: 1200,
            due_date: "2030-12-31".to_string(),
        },
    ))?;
    store.create(NewRecord::with_id(
        ARTIST_1_ID,
        Artist {
            name: ARTIST_1_NAME.to_string(),
            label_id: LABEL_1_ID,
        },
    ))?;
    store.create(NewRecord::with_id(
        TRACK_1_ID,
        Track {
            title: TRACK_1_TITLE.to_string(),
            duration: TRACK_1_DURATION,
            genre_id: GENRE_1_ID,
            release_date: "1976-01-01".to_string(),
        },
    ))?;
    store.create(NewRecord::with_id(
        PLAN_1_ID,
        Plan {
            description: "Premium".to_string(),
            price: PLAN_1_PRICE,
            limit: 4,
        },
    ))?;
    store.create(NewRecord::with_id(
        CUSTOMER_1_ID,
        Customer {
            login: CUSTOMER_1_LOGIN.to_string(),
            password: "s3nha".to_string(),
            plan_id: PLAN_1_ID,
            email: "ana@example.com".to_string(),
        },
    ))?;
    store.create(NewRecord::with_id(
        PAYMENT_1_ID,
        Payment {
            date: Timestamp::now(),
        },
    ))?;

    Ok((dir, db_path))
}
