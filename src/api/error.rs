//! HTTP error mapping.
//!
//! Every failure leaves a handler as an [`ApiError`] and is rendered as
//! `{"kind", "message", "errors"?}` with the status its kind implies.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use qms_lib::{ErrorKind, QmsError, ValidationError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Qms(#[from] QmsError),

    /// Login named no known account.
    #[error("Invalid username or password")]
    LoginFailed,

    /// Body was not valid JSON for the endpoint.
    #[error("Malformed request body: {0}")]
    BadBody(String),

    /// Path id was not a positive integer.
    #[error("Invalid id: {0}")]
    BadId(String),

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    ///
    /// An unverifiable token is 403 rather than 401; a missing token or
    /// missing role claim is 401.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Qms(QmsError::InvalidCredential { .. }) => StatusCode::FORBIDDEN,
            Self::Qms(err) => match err.kind() {
                ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
                ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Conflict => StatusCode::CONFLICT,
            },
            Self::LoginFailed => StatusCode::UNAUTHORIZED,
            Self::BadBody(_) | Self::BadId(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Qms(err) => err.kind().as_str(),
            Self::LoginFailed => ErrorKind::Unauthenticated.as_str(),
            Self::BadBody(_) | Self::BadId(_) => ErrorKind::Validation.as_str(),
            Self::Internal(_) => "Internal",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadBody(rejection.body_text())
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<ValidationError>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let Self::Internal(ref detail) = self {
            tracing::error!(%detail, "request failed");
        }
        let errors = match self {
            Self::Qms(ref err) => err.field_errors(),
            _ => Vec::new(),
        };
        let body = ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
            errors,
        };
        (status, Json(body)).into_response()
    }
}
