// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::repository::RepositoryError;

/// Error body shared by every failing response:
/// `{"success": false, "error": "...", "message": "..."}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Always `false`
    pub success: bool,
    /// Short status label, e.g. `Unauthorized`
    pub error: String,
    /// Human-readable detail
    pub message: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ErrorBody {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(_) => ApiError::not_found(e.to_string()),
            RepositoryError::AlreadyExists(_) | RepositoryError::InvalidEmail(_) => {
                ApiError::bad_request(e.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let label = self
            .status
            .canonical_reason()
            .unwrap_or("Error")
            .to_string();
        (self.status, ErrorBody::new(label, self.message)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn helpers_pick_status() {
        let nf = ApiError::not_found("User usr_404 not found");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "User usr_404 not found");

        let bad = ApiError::bad_request("ttl");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);

        let internal = ApiError::internal("boom");
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn repository_errors_map_to_statuses() {
        let nf: ApiError = RepositoryError::NotFound("User u1".into()).into();
        assert_eq!(nf.status, StatusCode::NOT_FOUND);

        let dup: ApiError = RepositoryError::AlreadyExists("User a@b.pe".into()).into();
        assert_eq!(dup.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn renders_standard_error_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = std::str::from_utf8(&bytes).unwrap();
        assert_eq!(
            body,
            r#"{"success":false,"error":"Bad Request","message":"bad data"}"#
        );
    }
}
