mod models;
mod resource;
mod schema;
mod store;
mod validation;

pub use models::*;
pub use resource::{Operation, Resource, ResourceKind};
pub use schema::CATALOG_VERSIONED_SCHEMAS;
pub use store::{SqliteRecordStore, StoreError, StoreResult};
pub use validation::{decode_new, decode_patch, JsonObject, ValidationError, ValidationResult};
