// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Mint a session token with the server's `AUTH_SECRET`.
//!
//! ```text
//! AUTH_SECRET=... issue-token <user-id> <email> <role> [ttl]
//! ```
//!
//! Used to bootstrap the first admin session; afterwards admins issue
//! tokens through `POST /v1/admin/tokens`.

use std::{env, process::ExitCode};

use chamana_server::{
    auth::{token, Claims, Role},
    clock::{Clock, SystemClock},
    config::{AUTH_SECRET_ENV, DEFAULT_TOKEN_TTL},
};

const USAGE: &str = "usage: issue-token <user-id> <email> <admin|customer|artisan|guest> [ttl]";

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let (id, email, role) = match args.as_slice() {
        [id, email, role, ..] => (id, email, role),
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    let Some(role) = Role::parse(role) else {
        eprintln!("unknown role '{role}'\n{USAGE}");
        return ExitCode::from(2);
    };

    let ttl = args.get(3).map(String::as_str).unwrap_or(DEFAULT_TOKEN_TTL);
    if let Err(e) = token::parse_ttl(ttl) {
        eprintln!("invalid ttl '{ttl}': {e}");
        return ExitCode::from(2);
    }

    let secret = match env::var(AUTH_SECRET_ENV) {
        Ok(secret) if !secret.trim().is_empty() => secret,
        _ => {
            eprintln!("{AUTH_SECRET_ENV} must be set");
            return ExitCode::FAILURE;
        }
    };

    let claims = Claims::new(id, email, role, SystemClock.now_secs());
    match token::encode(&claims, secret.trim().as_bytes(), ttl) {
        Ok(token) => {
            println!("{token}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("failed to issue token: {e}");
            ExitCode::FAILURE
        }
    }
}
