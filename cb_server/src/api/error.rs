//! HTTP error mapping.
//!
//! Every failure leaves a handler as an [`ApiError`], which picks the status
//! code and a sanitized `{"error": "..."}` body. Internal details are logged,
//! never returned.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use charmbook::{AuthError, ResourceError, db::StoreError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler error
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Request body is not the expected JSON
    #[error("bad json")]
    BadJson(#[from] JsonRejection),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(err) => match err {
                AuthError::Validation(_) => StatusCode::BAD_REQUEST,
                AuthError::EmailTaken => StatusCode::CONFLICT,
                AuthError::InvalidCredentials | AuthError::MissingSession | AuthError::Token(_) => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::InvalidSecret(_) | AuthError::HashingFailed | AuthError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Resource(err) => match err {
                ResourceError::Validation(_) => StatusCode::BAD_REQUEST,
                ResourceError::NotFound => StatusCode::NOT_FOUND,
                ResourceError::Forbidden => StatusCode::FORBIDDEN,
                ResourceError::Store(StoreError::DuplicateKey) => StatusCode::CONFLICT,
                ResourceError::Store(StoreError::Other(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadJson(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Body message safe to show to the client
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Auth(err) => err.client_message(),
            ApiError::Resource(err) => err.client_message(),
            ApiError::BadJson(_) => "bad json".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.client_message(),
            }),
        )
            .into_response()
    }
}
