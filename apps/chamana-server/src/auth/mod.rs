// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Session tokens and role gating for the CHAMANA API.
//!
//! ## Auth Flow
//!
//! 1. An admin (or the `issue-token` tool) mints a token for a user
//! 2. Clients send `Authorization: Bearer <token>`
//! 3. The server:
//!    - Verifies the HMAC-SHA256 signature with the shared secret
//!    - Rejects the token once `now >= exp`
//!    - Projects `sub`, `email` and `role` into an [`AuthenticatedUser`]
//!    - Applies the handler's allowed-role set, if any
//!
//! ## Security
//!
//! - Token claims are readable by anyone; only integrity is protected
//! - The role in a token is trusted until the token expires, even if the
//!   account changes server-side. Keep `TOKEN_TTL` short.
//! - No revocation list

pub mod claims;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod middleware;
pub mod roles;
pub mod token;

pub use claims::{AuthContext, AuthenticatedUser, Claims};
pub use error::{AuthError, TokenError, TtlError};
pub use extractor::{AdminOnly, Auth};
pub use gate::{bearer_token, AuthGate, IssuedToken};
pub use middleware::{require_auth, with_auth, with_roles, Guarded};
pub use roles::Role;
