//! Errors surfaced by the HTTP/WS layer, rendered as `{ "error": ..., "details": [...] }`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::design::ValidationError;
use crate::domain::LessonStep;
use crate::mechanics::MechanicsError;
use crate::protocol::ErrorOut;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown session: {0}")]
    SessionNotFound(String),
    #[error("session is on step {actual:?}, this action belongs to {expected:?}")]
    WrongStep { expected: LessonStep, actual: LessonStep },
    #[error("design proposal rejected")]
    Validation(Vec<ValidationError>),
    #[error(transparent)]
    Mechanics(#[from] MechanicsError),
    #[error("{0}")]
    BadRequest(String),
    /// Request body that is not JSON or does not fit the expected shape.
    #[error("{message}")]
    InvalidBody { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::WrongStep { .. } => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Mechanics(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidBody { status, .. } => *status,
        }
    }

    pub fn to_out(&self) -> ErrorOut {
        let details = match self {
            ApiError::Validation(errs) => errs.iter().map(|e| e.to_string()).collect(),
            _ => Vec::new(),
        };
        ErrorOut { error: self.to_string(), details }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody { status: rejection.status(), message: rejection.body_text() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_out())).into_response()
    }
}
