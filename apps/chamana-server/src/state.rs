// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Instant;

use axum::extract::FromRef;

use crate::auth::AuthGate;
use crate::clock::{Clock, SystemClock};
use crate::config::{AppConfig, DEFAULT_TOKEN_TTL};
use crate::rate_limit::{RateLimitPolicy, RateLimiter};
use crate::repository::{InMemoryUserRepository, UserRepository};

/// Shared application state.
///
/// Everything with a lifetime beyond one request is constructed here and
/// passed in; there are no module-level singletons.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthGate,
    pub rate_limiter: RateLimiter,
    pub users: Arc<dyn UserRepository>,
    /// Lifetime of tokens minted through the admin API
    pub token_ttl: String,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        secret: impl AsRef<[u8]>,
        clock: Arc<dyn Clock>,
        policy: RateLimitPolicy,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            auth: AuthGate::new(secret, Arc::clone(&clock)),
            rate_limiter: RateLimiter::in_memory(clock, policy),
            users,
            token_ttl: DEFAULT_TOKEN_TTL.to_string(),
            started_at: Instant::now(),
        }
    }

    pub fn from_config(config: &AppConfig, users: Arc<dyn UserRepository>) -> Self {
        Self::new(
            &config.auth_secret,
            Arc::new(SystemClock),
            config.rate_limit,
            users,
        )
        .with_token_ttl(&config.token_ttl)
        .with_proxy_headers(config.trust_proxy_headers)
    }

    pub fn with_token_ttl(mut self, ttl: impl Into<String>) -> Self {
        self.token_ttl = ttl.into();
        self
    }

    pub fn with_proxy_headers(mut self, trust: bool) -> Self {
        self.rate_limiter = self.rate_limiter.with_proxy_headers(trust);
        self
    }
}

impl FromRef<AppState> for AuthGate {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for RateLimiter {
    fn from_ref(state: &AppState) -> Self {
        state.rate_limiter.clone()
    }
}

impl Default for AppState {
    /// Development state with a throwaway secret and an empty repository.
    fn default() -> Self {
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            Arc::new(SystemClock),
            RateLimitPolicy::default(),
            Arc::new(InMemoryUserRepository::new()),
        )
    }
}
