// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Rate Limiting
//!
//! Fixed-window request counting per client key.
//!
//! ## Per-key state machine
//!
//! | State | Request outcome |
//! |-------|-----------------|
//! | no record | create `{count: 1, reset_at: now + window}`, allow |
//! | `now > reset_at` | replace with a fresh record, allow |
//! | `now <= reset_at`, `count < limit` | increment, allow |
//! | `now <= reset_at`, `count >= limit` | reject with `retry_after = reset_at - now` |
//!
//! The store is injected ([`CounterStore`]), so tests get an isolated
//! instance and a multi-instance deployment can swap in a shared backend.

pub mod middleware;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::clock::Clock;

pub use middleware::{client_key, rate_limit};
pub use store::{CounterStore, InMemoryCounterStore, RateDecision, RateRecord};

/// Requests allowed per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window: Duration::from_secs(60),
        }
    }
}

/// Rate limiter handle. Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    policy: RateLimitPolicy,
    trust_proxy_headers: bool,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn CounterStore>, clock: Arc<dyn Clock>, policy: RateLimitPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
            trust_proxy_headers: false,
        }
    }

    /// Limiter over a fresh in-memory store.
    pub fn in_memory(clock: Arc<dyn Clock>, policy: RateLimitPolicy) -> Self {
        Self::new(Arc::new(InMemoryCounterStore::new()), clock, policy)
    }

    /// Key clients by `X-Forwarded-For` / `X-Real-IP` instead of the socket
    /// peer. Only safe behind a proxy that overwrites those headers.
    pub fn with_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    pub fn trusts_proxy_headers(&self) -> bool {
        self.trust_proxy_headers
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    pub fn store(&self) -> &Arc<dyn CounterStore> {
        &self.store
    }

    /// Count a request from `client_key` against an explicit limit and window.
    pub fn check_and_consume(&self, client_key: &str, limit: u32, window: Duration) -> RateDecision {
        self.store
            .consume(client_key, limit, window, self.clock.now_millis())
    }

    /// [`check_and_consume`](Self::check_and_consume) reduced to allow/deny.
    pub fn allow(&self, client_key: &str, limit: u32, window: Duration) -> bool {
        self.check_and_consume(client_key, limit, window).is_allowed()
    }

    /// Count a request against the configured policy.
    pub fn check(&self, client_key: &str) -> RateDecision {
        self.check_and_consume(client_key, self.policy.max_requests, self.policy.window)
    }

    /// Evict records whose window has closed.
    pub fn sweep(&self) -> usize {
        self.store.sweep_expired(self.clock.now_millis())
    }

    /// Periodically evict closed windows until `shutdown` fires.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(limiter.clone().run_sweeper(interval, shutdown.clone()));
    /// ```
    pub async fn run_sweeper(self, interval: Duration, shutdown: CancellationToken) {
        tracing::info!(interval_secs = interval.as_secs(), "Rate-limit sweeper starting");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    let removed = self.sweep();
                    if removed > 0 {
                        tracing::debug!(removed, tracked = self.store.len(), "Swept rate-limit records");
                    }
                }
                _ = shutdown.cancelled() => {
                    tracing::info!("Rate-limit sweeper shutting down");
                    return;
                }
            }
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("policy", &self.policy)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .field("tracked_keys", &self.store.len())
            .finish()
    }
}
