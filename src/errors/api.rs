use poem_openapi::{payload::Json, ApiResponse};

use crate::errors::{InternalError, SubmissionError};
use crate::types::dto::common::{ErrorResponse, FieldViolation, ValidationProblem};

/// Standard error surface shared by all endpoints
#[derive(ApiResponse, Debug)]
pub enum ApiError {
    /// Missing or invalid credentials/token
    #[oai(status = 401)]
    Unauthorized(Json<ErrorResponse>),

    /// Authenticated but not allowed to touch this resource
    #[oai(status = 403)]
    Forbidden(Json<ErrorResponse>),

    /// Target entity does not exist
    #[oai(status = 404)]
    NotFound(Json<ErrorResponse>),

    /// State conflict, e.g. deleting a row that events still reference
    #[oai(status = 409)]
    Conflict(Json<ErrorResponse>),

    /// Submission rejected by validation
    #[oai(status = 422)]
    Unprocessable(Json<ValidationProblem>),

    /// Internal server error
    #[oai(status = 500)]
    Internal(Json<ErrorResponse>),
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(Json(ErrorResponse {
            error: "unauthorized".to_string(),
            message: message.into(),
            status_code: 401,
        }))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(Json(ErrorResponse {
            error: "forbidden".to_string(),
            message: message.into(),
            status_code: 403,
        }))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(Json(ErrorResponse {
            error: "not_found".to_string(),
            message: message.into(),
            status_code: 404,
        }))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(Json(ErrorResponse {
            error: "conflict".to_string(),
            message: message.into(),
            status_code: 409,
        }))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(Json(ErrorResponse {
            error: "internal_error".to_string(),
            message: message.into(),
            status_code: 500,
        }))
    }
}

impl From<InternalError> for ApiError {
    fn from(err: InternalError) -> Self {
        match &err {
            InternalError::EntityNotFound { .. } => ApiError::not_found(err.to_string()),
            InternalError::ProtectedReference { .. } => ApiError::conflict(err.to_string()),
            InternalError::Database { .. } | InternalError::Crypto { .. } => {
                tracing::error!(error = %err, "internal error");
                ApiError::internal("internal server error")
            }
        }
    }
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Validation(errors) => {
                let mut violations: Vec<FieldViolation> = errors
                    .form_errors()
                    .map(|e| FieldViolation {
                        field: None,
                        code: e.code().to_string(),
                        message: e.to_string(),
                    })
                    .collect();
                violations.extend(errors.field_errors().map(|(field, e)| FieldViolation {
                    field: Some(field.to_string()),
                    code: e.code().to_string(),
                    message: e.to_string(),
                }));

                ApiError::Unprocessable(Json(ValidationProblem {
                    message: "the submission was rejected by validation".to_string(),
                    errors: violations,
                }))
            }
            SubmissionError::Internal(err) => err.into(),
        }
    }
}
