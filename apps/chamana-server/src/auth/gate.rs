// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer-token gate shared by the middleware, handler wrappers and
//! extractors.

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use serde::Serialize;
use utoipa::ToSchema;

use super::claims::{AuthenticatedUser, Claims};
use super::error::{AuthError, TokenError};
use super::roles::Role;
use super::token;
use crate::clock::Clock;

/// Verifies bearer tokens and, optionally, restricts the accepted roles.
///
/// Cheap to clone. `with_roles` derives a restricted gate that shares the
/// secret and clock.
#[derive(Clone)]
pub struct AuthGate {
    secret: Arc<[u8]>,
    clock: Arc<dyn Clock>,
    allowed: Option<Arc<[Role]>>,
}

/// A freshly minted token and the claims it carries.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IssuedToken {
    pub token: String,
    /// Unix seconds
    pub issued_at: i64,
    /// Unix seconds
    pub expires_at: Option<i64>,
}

impl AuthGate {
    /// Gate that accepts any authenticated user.
    pub fn new(secret: impl AsRef<[u8]>, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
            clock,
            allowed: None,
        }
    }

    /// Same secret and clock, restricted to `roles`.
    pub fn with_roles(&self, roles: &[Role]) -> Self {
        Self {
            secret: Arc::clone(&self.secret),
            clock: Arc::clone(&self.clock),
            allowed: Some(Arc::from(roles)),
        }
    }

    pub fn allowed_roles(&self) -> Option<&[Role]> {
        self.allowed.as_deref()
    }

    /// Resolve the identity behind the request's bearer token.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthError> {
        let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
        let claims = token::verify_detailed(token, &self.secret, self.clock.now_secs())?;
        Ok(AuthenticatedUser::from_claims(claims))
    }

    /// Authenticate, then apply the role restriction if there is one.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthError> {
        let user = self.authenticate(headers)?;
        self.check_role(&user)?;
        Ok(user)
    }

    pub fn check_role(&self, user: &AuthenticatedUser) -> Result<(), AuthError> {
        match &self.allowed {
            Some(allowed) if !user.role.is_any_of(allowed) => Err(AuthError::InsufficientRole {
                role: user.role,
                allowed: allowed.to_vec(),
            }),
            _ => Ok(()),
        }
    }

    /// Mint a token for `user`, issued now and living for `ttl`.
    pub fn issue(&self, user: &AuthenticatedUser, ttl: &str) -> Result<IssuedToken, TokenError> {
        let claims = Claims::new(&user.id, &user.email, user.role, self.clock.now_secs());
        let token = token::encode(&claims, &self.secret, ttl)?;
        let claims = token::decode(&token)?;
        Ok(IssuedToken {
            token,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("secret", &"<redacted>")
            .field("allowed", &self.allowed)
            .finish()
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// A missing header, a different scheme or an empty token all yield `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
