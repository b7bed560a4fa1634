//! Catalog entities and their hand-written field tables.
//!
//! Each kind is a plain struct of its domain fields. Wire and column names
//! are the same (`nome`, `duracao`, ...), the Rust field names say what the
//! value is.

use super::resource::{Resource, ResourceKind};
use super::schema::{
    ARTIST_TABLE, CUSTOMER_TABLE, GENRE_TABLE, LABEL_TABLE, PAYMENT_TABLE, PLAN_TABLE,
    TRACK_TABLE,
};
use super::validation::{optional, required, to_cents_precision, JsonObject, ValidationResult};
use crate::sqlite_persistence::Table;
use chrono::{NaiveDateTime, Timelike, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Timestamps
// =============================================================================

/// Rendering used on the wire and in the database.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// A UTC instant with microsecond precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    pub fn now() -> Self {
        Self::from_naive(Utc::now().naive_utc())
    }

    /// Drops sub-microsecond precision so the value survives a round trip
    /// through its text form.
    pub fn from_naive(dt: NaiveDateTime) -> Self {
        let micros = dt.nanosecond() / 1_000 * 1_000;
        Timestamp(dt.with_nanosecond(micros).unwrap_or(dt))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").map(Timestamp::from_naive)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

// =============================================================================
// Envelopes
// =============================================================================

/// A persisted entity: id, domain fields and the two managed timestamps.
/// Serializes as one flat object.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Record<T> {
    pub id: i64,
    #[serde(flatten)]
    pub fields: T,
    pub created: Timestamp,
    pub modified: Timestamp,
}

/// A decoded creation request. Without an id the store assigns one.
#[derive(Clone, Debug, PartialEq)]
pub struct NewRecord<T> {
    pub id: Option<i64>,
    pub fields: T,
}

impl<T> NewRecord<T> {
    pub fn with_id(id: i64, fields: T) -> Self {
        NewRecord {
            id: Some(id),
            fields,
        }
    }
}

// =============================================================================
// Track
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Track {
    #[serde(rename = "nome")]
    pub title: String,
    #[serde(rename = "duracao")]
    pub duration: i64,
    #[serde(rename = "generos_id")]
    pub genre_id: i64,
    #[serde(rename = "lancamento")]
    pub release_date: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackPatch {
    pub title: Option<String>,
    pub duration: Option<i64>,
    pub genre_id: Option<i64>,
    pub release_date: Option<String>,
}

impl Resource for Track {
    type Patch = TrackPatch;
    const KIND: ResourceKind = ResourceKind::Track;
    const TABLE: &'static Table = &TRACK_TABLE;

    fn decode(body: &JsonObject) -> ValidationResult<Self> {
        Ok(Track {
            title: required(body, "nome")?,
            duration: required(body, "duracao")?,
            genre_id: required(body, "generos_id")?,
            release_date: required(body, "lancamento")?,
        })
    }

    fn decode_patch(body: &JsonObject) -> ValidationResult<TrackPatch> {
        Ok(TrackPatch {
            title: optional(body, "nome")?,
            duration: optional(body, "duracao")?,
            genre_id: optional(body, "generos_id")?,
            release_date: optional(body, "lancamento")?,
        })
    }

    fn merge(&mut self, patch: TrackPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(genre_id) = patch.genre_id {
            self.genre_id = genre_id;
        }
        if let Some(release_date) = patch.release_date {
            self.release_date = release_date;
        }
    }

    fn to_sql_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.title.clone()),
            Value::Integer(self.duration),
            Value::Integer(self.genre_id),
            Value::Text(self.release_date.clone()),
        ]
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Track {
            title: row.get("nome")?,
            duration: row.get("duracao")?,
            genre_id: row.get("generos_id")?,
            release_date: row.get("lancamento")?,
        })
    }
}

// =============================================================================
// Artist
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Artist {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "gravadoras_id")]
    pub label_id: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArtistPatch {
    pub name: Option<String>,
    pub label_id: Option<i64>,
}

impl Resource for Artist {
    type Patch = ArtistPatch;
    const KIND: ResourceKind = ResourceKind::Artist;
    const TABLE: &'static Table = &ARTIST_TABLE;

    fn decode(body: &JsonObject) -> ValidationResult<Self> {
        Ok(Artist {
            name: required(body, "nome")?,
            label_id: required(body, "gravadoras_id")?,
        })
    }

    fn decode_patch(body: &JsonObject) -> ValidationResult<ArtistPatch> {
        Ok(ArtistPatch {
            name: optional(body, "nome")?,
            label_id: optional(body, "gravadoras_id")?,
        })
    }

    fn merge(&mut self, patch: ArtistPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(label_id) = patch.label_id {
            self.label_id = label_id;
        }
    }

    fn to_sql_values(&self) -> Vec<Value> {
        vec![Value::Text(self.name.clone()), Value::Integer(self.label_id)]
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Artist {
            name: row.get("nome")?,
            label_id: row.get("gravadoras_id")?,
        })
    }
}

// =============================================================================
// Genre
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Genre {
    #[serde(rename = "descricao")]
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenrePatch {
    pub description: Option<String>,
}

impl Resource for Genre {
    type Patch = GenrePatch;
    const KIND: ResourceKind = ResourceKind::Genre;
    const TABLE: &'static Table = &GENRE_TABLE;

    fn decode(body: &JsonObject) -> ValidationResult<Self> {
        Ok(Genre {
            description: required(body, "descricao")?,
        })
    }

    fn decode_patch(body: &JsonObject) -> ValidationResult<GenrePatch> {
        Ok(GenrePatch {
            description: optional(body, "descricao")?,
        })
    }

    fn merge(&mut self, patch: GenrePatch) {
        if let Some(description) = patch.description {
            self.description = description;
        }
    }

    fn to_sql_values(&self) -> Vec<Value> {
        vec![Value::Text(self.description.clone())]
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Genre {
            description: row.get("descricao")?,
        })
    }
}

// =============================================================================
// Label
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Label {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "valor")]
    pub fee: i64,
    #[serde(rename = "vencimento")]
    pub due_date: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelPatch {
    pub name: Option<String>,
    pub fee: Option<i64>,
    pub due_date: Option<String>,
}

impl Resource for Label {
    type Patch = LabelPatch;
    const KIND: ResourceKind = ResourceKind::Label;
    const TABLE: &'static Table = &LABEL_TABLE;

    fn decode(body: &JsonObject) -> ValidationResult<Self> {
        Ok(Label {
            name: required(body, "nome")?,
            fee: required(body, "valor")?,
            due_date: required(body, "vencimento")?,
        })
    }

    fn decode_patch(body: &JsonObject) -> ValidationResult<LabelPatch> {
        Ok(LabelPatch {
            name: optional(body, "nome")?,
            fee: optional(body, "valor")?,
            due_date: optional(body, "vencimento")?,
        })
    }

    fn merge(&mut self, patch: LabelPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(fee) = patch.fee {
            self.fee = fee;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
    }

    fn to_sql_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Integer(self.fee),
            Value::Text(self.due_date.clone()),
        ]
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Label {
            name: row.get("nome")?,
            fee: row.get("valor")?,
            due_date: row.get("vencimento")?,
        })
    }
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Customer {
    pub login: String,
    #[serde(rename = "senha")]
    pub password: String,
    #[serde(rename = "planos_id")]
    pub plan_id: i64,
    pub email: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CustomerPatch {
    pub login: Option<String>,
    pub password: Option<String>,
    pub plan_id: Option<i64>,
    pub email: Option<String>,
}

impl Resource for Customer {
    type Patch = CustomerPatch;
    const KIND: ResourceKind = ResourceKind::Customer;
    const TABLE: &'static Table = &CUSTOMER_TABLE;

    fn decode(body: &JsonObject) -> ValidationResult<Self> {
        Ok(Customer {
            login: required(body, "login")?,
            password: required(body, "senha")?,
            plan_id: required(body, "planos_id")?,
            email: required(body, "email")?,
        })
    }

    fn decode_patch(body: &JsonObject) -> ValidationResult<CustomerPatch> {
        Ok(CustomerPatch {
            login: optional(body, "login")?,
            password: optional(body, "senha")?,
            plan_id: optional(body, "planos_id")?,
            email: optional(body, "email")?,
        })
    }

    fn merge(&mut self, patch: CustomerPatch) {
        if let Some(login) = patch.login {
            self.login = login;
        }
        if let Some(password) = patch.password {
            self.password = password;
        }
        if let Some(plan_id) = patch.plan_id {
            self.plan_id = plan_id;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
    }

    fn to_sql_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.login.clone()),
            Value::Text(self.password.clone()),
            Value::Integer(self.plan_id),
            Value::Text(self.email.clone()),
        ]
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Customer {
            login: row.get("login")?,
            password: row.get("senha")?,
            plan_id: row.get("planos_id")?,
            email: row.get("email")?,
        })
    }
}

// =============================================================================
// Plan
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Plan {
    #[serde(rename = "descricao")]
    pub description: String,
    /// Monthly price, two decimal places.
    #[serde(rename = "valor")]
    pub price: f64,
    #[serde(rename = "limite")]
    pub limit: i64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlanPatch {
    pub description: Option<String>,
    pub price: Option<f64>,
    pub limit: Option<i64>,
}

impl Resource for Plan {
    type Patch = PlanPatch;
    const KIND: ResourceKind = ResourceKind::Plan;
    const TABLE: &'static Table = &PLAN_TABLE;

    fn decode(body: &JsonObject) -> ValidationResult<Self> {
        Ok(Plan {
            description: required(body, "descricao")?,
            price: to_cents_precision(required(body, "valor")?),
            limit: required(body, "limite")?,
        })
    }

    fn decode_patch(body: &JsonObject) -> ValidationResult<PlanPatch> {
        Ok(PlanPatch {
            description: optional(body, "descricao")?,
            price: optional::<f64>(body, "valor")?.map(to_cents_precision),
            limit: optional(body, "limite")?,
        })
    }

    fn merge(&mut self, patch: PlanPatch) {
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(limit) = patch.limit {
            self.limit = limit;
        }
    }

    fn to_sql_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.description.clone()),
            Value::Real(self.price),
            Value::Integer(self.limit),
        ]
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Plan {
            description: row.get("descricao")?,
            price: row.get("valor")?,
            limit: row.get("limite")?,
        })
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment only records when it happened; `data` is always server-set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Payment {
    #[serde(rename = "data")]
    pub date: Timestamp,
}

/// Payments have no client-writable fields. Patching one only bumps
/// `modified`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaymentPatch;

impl Resource for Payment {
    type Patch = PaymentPatch;
    const KIND: ResourceKind = ResourceKind::Payment;
    const TABLE: &'static Table = &PAYMENT_TABLE;

    fn decode(_body: &JsonObject) -> ValidationResult<Self> {
        Ok(Payment {
            date: Timestamp::now(),
        })
    }

    fn decode_patch(_body: &JsonObject) -> ValidationResult<PaymentPatch> {
        Ok(PaymentPatch)
    }

    fn merge(&mut self, _patch: PaymentPatch) {}

    fn to_sql_values(&self) -> Vec<Value> {
        vec![Value::Text(self.date.to_string())]
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Payment {
            date: row.get("data")?,
        })
    }

    fn on_create(&mut self, now: Timestamp) {
        self.date = now;
    }
}
