// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! If `require_auth` or a wrapped handler already decorated the request,
//! the extractor reuses that identity. Otherwise it verifies the bearer
//! token itself with the [`AuthGate`] found in the router state.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use super::{AuthError, AuthGate, AuthenticatedUser, Role};

/// Extractor for authenticated users.
pub struct Auth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for Auth
where
    AuthGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let gate = AuthGate::from_ref(state);
        let user = gate.authenticate(&parts.headers)?;
        parts.extensions.insert(user.clone());
        Ok(Auth(user))
    }
}

/// Extractor that requires the admin role.
pub struct AdminOnly(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AdminOnly
where
    AuthGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AuthError::InsufficientRole {
                role: user.role,
                allowed: vec![Role::Admin],
            });
        }

        Ok(AdminOnly(user))
    }
}
