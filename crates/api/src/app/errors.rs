use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use kitforge_core::DomainError;
use kitforge_infra::{ServiceError, StoreError};

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Store(StoreError::NotFound { entity, id }) => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("{entity} {id} not found"),
        ),
        ServiceError::Store(StoreError::Duplicate { entity, id }) => json_error(
            StatusCode::CONFLICT,
            "conflict",
            format!("duplicate {entity} {id}"),
        ),
        ServiceError::Store(StoreError::Poisoned) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            "store lock poisoned",
        ),
        ServiceError::InvalidLine(line_item_id) => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_line",
            format!("line {line_item_id} cannot be reconciled"),
        ),
        ServiceError::Placement(msg) => json_error(StatusCode::BAD_GATEWAY, "placement_failed", msg),
        ServiceError::Publish(msg) => json_error(StatusCode::BAD_GATEWAY, "publish_error", msg),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation { field, reason } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            axum::Json(json!({
                "error": "validation_error",
                "field": field,
                "message": reason,
            })),
        )
            .into_response(),
        DomainError::MissingSelection(part) => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "missing_selection",
            format!("no variant selected for part {part}"),
        ),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
