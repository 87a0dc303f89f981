// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to storefront entities.
//!
//! The auth middleware never calls into this layer: identity comes from
//! token claims alone. Handlers use it for lookups.

pub mod users;

pub use users::{InMemoryUserRepository, User, UserRepository};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("Invalid email address: '{0}'")]
    InvalidEmail(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
