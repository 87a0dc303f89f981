// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the authenticated identity derived from them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claims carried in a session token.
///
/// Field names follow the JWT registered claim names. `exp` is optional;
/// a token without it never expires by time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's id
    pub sub: String,

    pub email: String,

    pub role: Role,

    /// Issued at (Unix seconds)
    pub iat: i64,

    /// Expiration (Unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Claims {
    /// Claims issued at `iat` with no expiry set yet.
    pub fn new(sub: impl Into<String>, email: impl Into<String>, role: Role, iat: i64) -> Self {
        Self {
            sub: sub.into(),
            email: email.into(),
            role,
            iat,
            exp: None,
        }
    }

    pub fn with_expiry(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// `exp`, when present, must not precede `iat`.
    pub fn is_consistent(&self) -> bool {
        self.exp.is_none_or(|exp| exp >= self.iat)
    }

    /// Expired once `now` reaches `exp`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp.is_some_and(|exp| now >= exp)
    }
}

/// Authenticated user for the duration of one request.
///
/// Projected from verified claims; never loaded from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self::from_claims(claims)
    }
}

/// What a wrapped handler receives alongside the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuthContext {
    pub user: AuthenticatedUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims() -> Claims {
        Claims::new("user_123", "ana@chamana.pe", Role::Artisan, 1_700_000_000)
            .with_expiry(1_700_003_600)
    }

    #[test]
    fn from_claims_projects_identity() {
        let user = AuthenticatedUser::from_claims(sample_claims());
        assert_eq!(user.id, "user_123");
        assert_eq!(user.email, "ana@chamana.pe");
        assert_eq!(user.role, Role::Artisan);
        assert!(!user.is_admin());
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let claims = sample_claims();
        assert!(!claims.is_expired_at(1_700_003_599));
        assert!(claims.is_expired_at(1_700_003_600));
        assert!(claims.is_expired_at(1_700_003_601));
    }

    #[test]
    fn claims_without_expiry_never_expire() {
        let claims = Claims::new("u", "u@example.com", Role::Guest, 10);
        assert!(!claims.is_expired_at(i64::MAX));
        assert!(claims.is_consistent());
    }

    #[test]
    fn expiry_before_issue_is_inconsistent() {
        let claims = Claims::new("u", "u@example.com", Role::Guest, 100).with_expiry(99);
        assert!(!claims.is_consistent());
    }

    #[test]
    fn exp_is_omitted_when_absent() {
        let claims = Claims::new("u", "u@example.com", Role::Customer, 5);
        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("exp").is_none());
        assert_eq!(json["role"], "customer");
    }

    #[test]
    fn auth_context_serializes_under_user() {
        let ctx = AuthContext {
            user: AuthenticatedUser::from_claims(sample_claims()),
        };
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["user"]["id"], "user_123");
        assert_eq!(json["user"]["role"], "artisan");
    }
}
