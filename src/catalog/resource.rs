//! The resource abstraction shared by the seven catalog kinds.
//!
//! A [`Resource`] knows how to decode itself (and a sparse patch of itself)
//! from a request body, how to merge a patch, and how to move its domain
//! fields in and out of its table. Everything else (ids, timestamps,
//! transactions, HTTP) is handled once, generically, by the store and the
//! server.

use super::models::Timestamp;
use super::validation::{JsonObject, ValidationResult};
use crate::sqlite_persistence::Table;
use serde::Serialize;
use std::fmt;

/// Columns every catalog table carries besides the kind's own fields.
pub const ID_COLUMN: &str = "id";
pub const CREATED_COLUMN: &str = "created";
pub const MODIFIED_COLUMN: &str = "modified";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Track,
    Artist,
    Genre,
    Label,
    Customer,
    Plan,
    Payment,
}

/// What the caller was trying to do when a record turned out to be missing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Update,
    Delete,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Track,
        ResourceKind::Artist,
        ResourceKind::Genre,
        ResourceKind::Label,
        ResourceKind::Customer,
        ResourceKind::Plan,
        ResourceKind::Payment,
    ];

    /// Path segment under `/api/` for this kind's collection.
    pub fn collection_path(&self) -> &'static str {
        match self {
            ResourceKind::Track => "musicas",
            ResourceKind::Artist => "artistas",
            ResourceKind::Genre => "generos",
            ResourceKind::Label => "gravadora",
            ResourceKind::Customer => "clientes",
            ResourceKind::Plan => "planos",
            ResourceKind::Payment => "pagamentos",
        }
    }

    /// Name used in client-facing messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            ResourceKind::Track => "Música",
            ResourceKind::Artist => "Artista",
            ResourceKind::Genre => "Genero",
            ResourceKind::Label => "Gravadora",
            ResourceKind::Customer => "Cliente",
            ResourceKind::Plan => "Plano",
            ResourceKind::Payment => "Pagamento",
        }
    }

    fn is_feminine(&self) -> bool {
        matches!(self, ResourceKind::Track | ResourceKind::Label)
    }

    fn inflect(&self, masculine: &'static str, feminine: &'static str) -> &'static str {
        if self.is_feminine() {
            feminine
        } else {
            masculine
        }
    }

    pub fn created_message(&self) -> String {
        format!(
            "{} {} com sucesso!",
            self.display_name(),
            self.inflect("criado", "criada")
        )
    }

    pub fn updated_message(&self) -> String {
        format!(
            "{} {} com sucesso!",
            self.display_name(),
            self.inflect("atualizado", "atualizada")
        )
    }

    pub fn deleted_message(&self) -> String {
        format!(
            "{} {} com sucesso!",
            self.display_name(),
            self.inflect("deletado", "deletada")
        )
    }

    pub fn not_found_message(&self, operation: Operation) -> String {
        let suffix = match operation {
            Operation::Fetch => "",
            Operation::Update => " para atualização",
            Operation::Delete => " para deletar",
        };
        format!(
            "{} não {}{}!",
            self.display_name(),
            self.inflect("encontrado", "encontrada"),
            suffix
        )
    }

    pub fn duplicate_id_message(&self, id: i64) -> String {
        format!("{} com id {} já existe!", self.display_name(), id)
    }

    pub fn duplicate_field_message(&self, field: &str) -> String {
        format!("{} com este {} já existe!", self.display_name(), field)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Track => "track",
            ResourceKind::Artist => "artist",
            ResourceKind::Genre => "genre",
            ResourceKind::Label => "label",
            ResourceKind::Customer => "customer",
            ResourceKind::Plan => "plan",
            ResourceKind::Payment => "payment",
        };
        write!(f, "{}", name)
    }
}

/// One catalog entity kind.
///
/// Implementors hold only their domain fields; the persisted envelope is
/// [`super::models::Record`]. Field order in [`Resource::to_sql_values`] must
/// follow the table's data columns (every column except `id`, `created` and
/// `modified`, in declaration order).
pub trait Resource: Serialize + Clone + Send + Sync + Sized + 'static {
    /// Sparse update: every field present-or-absent.
    type Patch: Send;

    const KIND: ResourceKind;
    const TABLE: &'static Table;

    /// Decode a creation body. Every domain field is required.
    fn decode(body: &JsonObject) -> ValidationResult<Self>;

    /// Decode a patch body. No field is required; absent keys stay absent.
    fn decode_patch(body: &JsonObject) -> ValidationResult<Self::Patch>;

    /// Overwrite the fields present in `patch`, leave the others untouched.
    fn merge(&mut self, patch: Self::Patch);

    fn to_sql_values(&self) -> Vec<rusqlite::types::Value>;

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self>;

    /// Called once, right before insertion, with the creation instant.
    fn on_create(&mut self, _now: Timestamp) {}

    /// Names of the table columns holding this kind's domain fields.
    fn data_columns() -> Vec<&'static str> {
        Self::TABLE
            .columns
            .iter()
            .map(|c| c.name)
            .filter(|name| ![ID_COLUMN, CREATED_COLUMN, MODIFIED_COLUMN].contains(name))
            .collect()
    }
}
