// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Counter stores backing the rate limiter.
//!
//! The gating logic only talks to [`CounterStore`]. The in-memory store
//! serves a single process; several instances behind a load balancer need
//! a shared store with atomic increment and expiry instead.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;

/// Per-client counter for the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateRecord {
    pub count: u32,
    /// Unix milliseconds at which the window closes
    pub reset_at_ms: i64,
}

impl RateRecord {
    fn fresh(now_ms: i64, window: Duration) -> Self {
        Self {
            count: 1,
            reset_at_ms: now_ms.saturating_add(window_millis(window)),
        }
    }

    fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms > self.reset_at_ms
    }
}

/// Outcome of one counted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

/// Storage for rate-limit counters.
pub trait CounterStore: Send + Sync {
    /// Count one request for `key` at `now_ms` and decide whether it may pass.
    ///
    /// A rejected request does not increment the counter.
    fn consume(&self, key: &str, limit: u32, window: Duration, now_ms: i64) -> RateDecision;

    /// Drop records whose window closed before `now_ms`. Returns how many
    /// were removed.
    fn sweep_expired(&self, now_ms: i64) -> usize;

    /// Number of tracked keys.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local counter store.
///
/// Records live until the process exits unless `sweep_expired` is called.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    records: Mutex<HashMap<String, RateRecord>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, key: &str) -> Option<RateRecord> {
        self.records.lock().get(key).copied()
    }
}

impl CounterStore for InMemoryCounterStore {
    fn consume(&self, key: &str, limit: u32, window: Duration, now_ms: i64) -> RateDecision {
        if limit == 0 {
            return RateDecision::Limited {
                retry_after: window,
            };
        }

        let mut records = self.records.lock();
        match records.get_mut(key) {
            Some(record) if !record.is_expired_at(now_ms) => {
                if record.count >= limit {
                    let wait_ms = record.reset_at_ms.saturating_sub(now_ms).max(0);
                    return RateDecision::Limited {
                        retry_after: Duration::from_millis(wait_ms as u64),
                    };
                }
                record.count += 1;
                RateDecision::Allowed {
                    remaining: limit - record.count,
                }
            }
            _ => {
                records.insert(key.to_string(), RateRecord::fresh(now_ms, window));
                RateDecision::Allowed {
                    remaining: limit - 1,
                }
            }
        }
    }

    fn sweep_expired(&self, now_ms: i64) -> usize {
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|_, record| !record.is_expired_at(now_ms));
        before - records.len()
    }

    fn len(&self) -> usize {
        self.records.lock().len()
    }
}

fn window_millis(window: Duration) -> i64 {
    i64::try_from(window.as_millis()).unwrap_or(i64::MAX)
}
