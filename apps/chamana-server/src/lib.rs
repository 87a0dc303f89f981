// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! CHAMANA - Storefront request edge
//!
//! Signed session tokens, role gating and per-client rate limiting in
//! front of the CHAMANA storefront and admin API.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Session tokens and role gating
//! - `rate_limit` - Fixed-window request limiting per client
//! - `repository` - User lookups consumed by the API
//! - `clock` - Injectable wall clock

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod rate_limit;
pub mod repository;
pub mod state;
