//! API error types and responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::AdvertisementError;

/// Errors returned by director API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid advertisement: {0}")]
    InvalidAdvertisement(#[from] AdvertisementError),

    #[error("Malformed request body: {message}")]
    MalformedBody { status: StatusCode, message: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// API error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::InvalidAdvertisement(_) => (StatusCode::BAD_REQUEST, "INVALID_ADVERTISEMENT"),
            ApiError::MalformedBody { status, .. } => (*status, "MALFORMED_BODY"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        // axum reports unparseable or mistyped JSON as 422; content-type and
        // body-size rejections keep their own status.
        let status = match &rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                StatusCode::BAD_REQUEST
            }
            other => other.status(),
        };
        ApiError::MalformedBody {
            status,
            message: rejection.body_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = ApiError::from(AdvertisementError::EmptyServerName);
        assert_eq!(err.to_string(), "Invalid advertisement: server name must not be empty");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = ApiError::NotFound("/osg".into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
