//! CRUD handlers, generic over the catalog kind.
//!
//! Each handler is instantiated once per [`Resource`] by the router. Bodies
//! are taken as raw JSON and decoded by the kind itself so that every
//! validation failure can name its field.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use super::state::GuardedRecordStore;
use crate::catalog::{
    decode_new, decode_patch, Operation, Resource, StoreError, ValidationError,
};

pub const INTERNAL_ERROR_MESSAGE: &str = "Erro interno do servidor";

#[derive(Serialize)]
struct MessageBody {
    message: String,
}

fn message_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(MessageBody {
            message: message.into(),
        }),
    )
        .into_response()
}

fn validation_failure(err: ValidationError) -> Response {
    debug!("Rejected request body: {}", err);
    message_response(StatusCode::BAD_REQUEST, err.to_string())
}

fn body_rejection(rejection: JsonRejection) -> Response {
    debug!("Rejected request body: {}", rejection);
    message_response(rejection.status(), rejection.body_text())
}

fn store_failure(err: StoreError, operation: Operation) -> Response {
    match err {
        StoreError::NotFound { kind, .. } => {
            message_response(StatusCode::NOT_FOUND, kind.not_found_message(operation))
        }
        StoreError::DuplicateKey { kind, id } => {
            message_response(StatusCode::CONFLICT, kind.duplicate_id_message(id))
        }
        StoreError::UniqueViolation { kind, field } => {
            message_response(StatusCode::CONFLICT, kind.duplicate_field_message(&field))
        }
        StoreError::Sqlite(_) | StoreError::Poisoned => {
            error!("Storage failure: {}", err);
            message_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}

pub async fn list_records<R: Resource>(State(store): State<GuardedRecordStore>) -> Response {
    match store.list::<R>() {
        Ok(records) => Json(records).into_response(),
        Err(err) => store_failure(err, Operation::Fetch),
    }
}

pub async fn create_record<R: Resource>(
    State(store): State<GuardedRecordStore>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return body_rejection(rejection),
    };
    let new_record = match decode_new::<R>(&body) {
        Ok(new_record) => new_record,
        Err(err) => return validation_failure(err),
    };
    match store.create(new_record) {
        Ok(_) => message_response(StatusCode::CREATED, R::KIND.created_message()),
        Err(err) => store_failure(err, Operation::Fetch),
    }
}

pub async fn get_record<R: Resource>(
    State(store): State<GuardedRecordStore>,
    Path(id): Path<i64>,
) -> Response {
    match store.fetch::<R>(id) {
        Ok(record) => Json(record).into_response(),
        Err(err) => store_failure(err, Operation::Fetch),
    }
}

pub async fn patch_record<R: Resource>(
    State(store): State<GuardedRecordStore>,
    Path(id): Path<i64>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return body_rejection(rejection),
    };
    let patch = match decode_patch::<R>(&body) {
        Ok(patch) => patch,
        Err(err) => return validation_failure(err),
    };
    match store.apply_patch::<R>(id, patch) {
        Ok(_) => message_response(StatusCode::OK, R::KIND.updated_message()),
        Err(err) => store_failure(err, Operation::Update),
    }
}

/// Answers 204 with the JSON message anyway; clients of the catalog read it.
pub async fn delete_record<R: Resource>(
    State(store): State<GuardedRecordStore>,
    Path(id): Path<i64>,
) -> Response {
    match store.delete::<R>(id) {
        Ok(()) => message_response(StatusCode::NO_CONTENT, R::KIND.deleted_message()),
        Err(err) => store_failure(err, Operation::Delete),
    }
}
