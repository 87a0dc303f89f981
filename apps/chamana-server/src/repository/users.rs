// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! Accounts live in PostgreSQL in production; this in-memory
//! implementation backs the admin endpoints and tests. Emails are unique
//! and compared case-insensitively.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{RepositoryError, RepositoryResult};
use crate::auth::{AuthenticatedUser, Role};

/// A storefront account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct User {
    /// Unique user identifier (UUID)
    pub id: String,
    pub email: String,
    /// Display name
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// New user with a generated id.
    pub fn new(email: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.into(),
            name: name.into(),
            role,
            created_at: Utc::now(),
        }
    }

    /// The identity a token for this user carries.
    pub fn identity(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            id: self.id.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Lookup capability consumed by the API layer.
pub trait UserRepository: Send + Sync {
    fn find_by_id(&self, id: &str) -> Option<User>;

    fn find_by_email(&self, email: &str) -> Option<User>;

    /// All users, oldest first.
    fn list(&self) -> Vec<User>;

    fn insert(&self, user: User) -> RepositoryResult<User>;

    /// Like `find_by_id`, but an absent user is an error.
    fn get(&self, id: &str) -> RepositoryResult<User> {
        self.find_by_id(id)
            .ok_or_else(|| RepositoryError::NotFound(format!("User {id}")))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn find_by_id(&self, id: &str) -> Option<User> {
        self.users.read().get(id).cloned()
    }

    fn find_by_email(&self, email: &str) -> Option<User> {
        let email = normalize_email(email);
        self.users
            .read()
            .values()
            .find(|user| user.email == email)
            .cloned()
    }

    fn list(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.read().values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.email.cmp(&b.email)));
        users
    }

    fn insert(&self, mut user: User) -> RepositoryResult<User> {
        user.email = normalize_email(&user.email);
        if !is_plausible_email(&user.email) {
            return Err(RepositoryError::InvalidEmail(user.email));
        }

        let mut users = self.users.write();
        if users.contains_key(&user.id) {
            return Err(RepositoryError::AlreadyExists(format!("User {}", user.id)));
        }
        if users.values().any(|existing| existing.email == user.email) {
            return Err(RepositoryError::AlreadyExists(format!(
                "User with email {}",
                user.email
            )));
        }

        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}
