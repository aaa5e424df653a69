//! Error taxonomy for the reservation core.
//!
//! Every variant is handled at the request boundary and rendered as a JSON
//! envelope with an error kind and message; none crashes the serving
//! process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// No matching reservation/item within the caller's scope.
    #[error("{0}")]
    NotFound(String),

    /// The actor already holds or confirmed this unit within the duplicate
    /// window. Recoverable: pick another unit or retry later.
    #[error("already reserved: {0}")]
    DuplicateReservation(String),

    /// Another actor's live claim won the unit at the store level.
    #[error("unit already claimed: {0}")]
    UnitConflict(String),

    /// No positive capacity derivable for the item. Not retryable without
    /// operator intervention.
    #[error("capacity unresolved for {0}")]
    CapacityUnresolved(String),

    /// The actor's role lacks permission for the requested mode.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Missing or malformed required fields/selectors.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// No verified actor identity on a call that mutates state.
    #[error("authentication required")]
    AuthenticationRequired,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl Error {
    /// Stable machine-readable kind for the response envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::DuplicateReservation(_) => "duplicate_reservation",
            Error::UnitConflict(_) => "unit_conflict",
            Error::CapacityUnresolved(_) => "capacity_unresolved",
            Error::Forbidden(_) => "forbidden",
            Error::ValidationFailed(_) => "validation_failed",
            Error::AuthenticationRequired => "authentication_required",
            Error::Database(_) => "database_error",
            Error::Internal(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::DuplicateReservation(_) | Error::UnitConflict(_) => StatusCode::CONFLICT,
            Error::CapacityUnresolved(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            Error::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Error::Database(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(json!({
            "kind": self.kind(),
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_statuses() {
        assert_eq!(
            Error::DuplicateReservation("seat 2".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::UnitConflict("seat 2".into()).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn kinds_are_stable() {
        assert_eq!(Error::AuthenticationRequired.kind(), "authentication_required");
        assert_eq!(Error::NotFound("x".into()).kind(), "not_found");
    }
}
