use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tally_db::LedgerError;
use tally_types::api::{ErrorResponse, FailureResponse};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Invalid request body")]
    BadBody,

    #[error("User code is required")]
    MissingCode,

    #[error("Operation must be \"suma\" or \"resta\"")]
    InvalidOperation,

    #[error("User not found")]
    NotFound,

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Ledger(LedgerError::Storage(_) | LedgerError::SaveFailed) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            // Unknown codes on a mutation are a bad request, not a missing resource.
            ApiError::Ledger(_) => StatusCode::BAD_REQUEST,
            ApiError::BadBody | ApiError::MissingCode | ApiError::InvalidOperation => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn log(&self) {
        if let ApiError::Ledger(LedgerError::Storage(e)) = self {
            error!("Store unavailable: {:#}", e);
        }
    }
}

/// Read endpoints answer failures with `{ "error": ... }`.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

/// Failure of a mutating endpoint, rendered as `{ "success": false, "message": ... }`.
#[derive(Debug)]
pub struct ActionError(pub ApiError);

impl From<ApiError> for ActionError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl From<LedgerError> for ActionError {
    fn from(e: LedgerError) -> Self {
        Self(ApiError::Ledger(e))
    }
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        self.0.log();
        let status = self.0.status();
        let body = FailureResponse {
            success: false,
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_category() {
        assert_eq!(ApiError::from(LedgerError::DuplicateName).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(LedgerError::UserNotFound).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(LedgerError::SaveFailed).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ApiError::from(LedgerError::Storage(storage_error())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::InvalidOperation.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn ledger_messages_pass_through() {
        assert_eq!(
            ApiError::from(LedgerError::DuplicateName).to_string(),
            "A user with that name already exists"
        );
        // Storage details stay in the logs.
        assert_eq!(
            ApiError::from(LedgerError::Storage(storage_error())).to_string(),
            "Internal server error"
        );
    }

    fn storage_error() -> anyhow::Error {
        anyhow::anyhow!("connection refused")
    }
}
