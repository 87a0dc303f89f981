// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! The token taxonomy is internal. At the HTTP boundary every token
//! failure renders as the same 401 so callers cannot tell a forged token
//! from an expired one.

use std::time::Duration;

use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use super::roles::{describe_roles, Role};
use crate::error::ErrorBody;

/// Why a token failed to decode or verify.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Token is malformed")]
    Malformed,

    #[error("Token signature does not match")]
    SignatureMismatch,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid claims: {0}")]
    InvalidClaims(&'static str),

    #[error("Failed to encode token: {0}")]
    Encoding(String),
}

/// A TTL string that is not `<integer><unit>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TtlError {
    #[error("TTL is empty")]
    Empty,

    #[error("Unknown TTL unit '{0}' (expected s, m, h or d)")]
    UnknownUnit(char),

    #[error("Invalid TTL amount in '{0}'")]
    InvalidAmount(String),
}

/// Authentication error type.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No usable `Authorization: Bearer` header
    #[error("Authentication required")]
    MissingToken,

    /// Token present but rejected
    #[error("Invalid or expired token")]
    InvalidToken(#[source] TokenError),

    /// Authenticated, but the role is not allowed here
    #[error("Insufficient permissions. Required role: {}", describe_roles(.allowed))]
    InsufficientRole { role: Role, allowed: Vec<Role> },

    #[error("Too many requests. Please try again in {} seconds", .retry_after.as_secs())]
    RateLimitExceeded { retry_after: Duration },
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientRole { .. } => StatusCode::FORBIDDEN,
            AuthError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Short label used as the `error` field of the response body.
    pub fn label(&self) -> &'static str {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken(_) => "Unauthorized",
            AuthError::InsufficientRole { .. } => "Forbidden",
            AuthError::RateLimitExceeded { .. } => "Too Many Requests",
        }
    }

    fn public_message(&self) -> String {
        match self {
            // Same text for every token failure.
            AuthError::MissingToken | AuthError::InvalidToken(_) => {
                "Authentication required. Provide a valid bearer token".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        AuthError::InvalidToken(e)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody::new(self.label(), self.public_message());
        let mut response = (status, body).into_response();

        if let AuthError::RateLimitExceeded { retry_after } = &self {
            let secs = retry_after_secs(*retry_after);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }

        response
    }
}

/// Whole seconds a client should wait, rounded up and never zero.
fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}
