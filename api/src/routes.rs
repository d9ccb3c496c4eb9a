//! HTTP routing and error-to-status mapping.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tracing::debug;

use card2card_common::TransferError;
use card2card_engine::TransferEngine;

use crate::dto::{ConfirmDto, ErrorDto, OperationDto, TransferDto};
use crate::validation::{self, ValidationError};

/// Build the application router over a shared engine.
pub fn router(engine: Arc<TransferEngine>) -> Router {
    Router::new()
        .route("/transfer", post(transfer))
        .route("/confirmOperation", post(confirm_operation))
        .with_state(engine)
}

async fn transfer(
    State(engine): State<Arc<TransferEngine>>,
    Json(body): Json<TransferDto>,
) -> Response {
    debug!(source = %body.card_from_number, destination = %body.card_to_number, "transfer request");

    if let Err(rejection) = validation::validate_transfer(&body) {
        return validation_response(rejection);
    }

    match engine.create_transfer(body.into_request()) {
        Ok(operation_id) => operation_response(operation_id.to_string()),
        Err(error) => error_response(error),
    }
}

async fn confirm_operation(
    State(engine): State<Arc<TransferEngine>>,
    Json(body): Json<ConfirmDto>,
) -> Response {
    debug!(operation_id = %body.operation_id, action = %body.action, "confirm request");

    if let Err(rejection) = validation::validate_confirm(&body) {
        return validation_response(rejection);
    }

    match engine.confirm_transfer(&body.operation_id, &body.action) {
        Ok(operation_id) => operation_response(operation_id.to_string()),
        Err(error) => error_response(error),
    }
}

fn operation_response(operation_id: String) -> Response {
    (StatusCode::OK, Json(OperationDto { operation_id })).into_response()
}

fn validation_response(rejection: ValidationError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorDto {
            message: rejection.message,
            id: rejection.code,
        }),
    )
        .into_response()
}

fn error_response(error: TransferError) -> Response {
    debug!(kind = error.kind(), code = error.wire_code(), "request rejected");
    let body = ErrorDto {
        message: error.to_string(),
        id: error.wire_code(),
    };
    (status_for(&error), Json(body)).into_response()
}

/// Map an error kind to a transport status code.
fn status_for(error: &TransferError) -> StatusCode {
    match error {
        TransferError::AccountNotFound { .. } | TransferError::OperationNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        TransferError::InsufficientFunds { .. } => StatusCode::METHOD_NOT_ALLOWED,
        TransferError::AlreadyCommitted(_) | TransferError::AlreadyRolledBack(_) => {
            StatusCode::CONFLICT
        }
        TransferError::UnknownAction(_) => StatusCode::BAD_REQUEST,
        TransferError::UnknownTransferKind(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
