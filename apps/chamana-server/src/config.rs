// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup. Invalid
//! values stop the server instead of being replaced by defaults.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `AUTH_SECRET` | HMAC secret for session tokens | Required |
//! | `TOKEN_TTL` | Lifetime of issued tokens (`<n>s/m/h/d`) | `7d` |
//! | `RATE_LIMIT_MAX` | Requests per client per window | `30` |
//! | `RATE_LIMIT_WINDOW_SECS` | Rate-limit window length | `60` |
//! | `RATE_LIMIT_SWEEP_SECS` | Evict closed windows every N seconds (0 = never) | `0` |
//! | `TRUST_PROXY_HEADERS` | Key rate limits on `X-Forwarded-For` / `X-Real-IP` | `false` |
//! | `SEED_ADMIN_EMAIL` | Create an admin account at startup | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::time::Duration;

use crate::auth::{token::parse_ttl, TtlError};
use crate::rate_limit::RateLimitPolicy;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const AUTH_SECRET_ENV: &str = "AUTH_SECRET";
pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL";
pub const RATE_LIMIT_MAX_ENV: &str = "RATE_LIMIT_MAX";
pub const RATE_LIMIT_WINDOW_ENV: &str = "RATE_LIMIT_WINDOW_SECS";
pub const RATE_LIMIT_SWEEP_ENV: &str = "RATE_LIMIT_SWEEP_SECS";
pub const TRUST_PROXY_HEADERS_ENV: &str = "TRUST_PROXY_HEADERS";
pub const SEED_ADMIN_EMAIL_ENV: &str = "SEED_ADMIN_EMAIL";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TOKEN_TTL: &str = "7d";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("TOKEN_TTL is invalid: {0}")]
    TokenTtl(#[from] TtlError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub auth_secret: String,
    /// Validated `<n><unit>` string handed to the token codec
    pub token_ttl: String,
    pub rate_limit: RateLimitPolicy,
    /// `None` keeps every rate-limit record for the life of the process
    pub sweep_interval: Option<Duration>,
    /// Only enable behind a reverse proxy that overwrites forwarding headers
    pub trust_proxy_headers: bool,
    pub seed_admin_email: Option<String>,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; `from_env` uses the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(var(PORT_ENV), PORT_ENV, DEFAULT_PORT)?;
        let bind_addr = format!("{host}:{port}")
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: HOST_ENV,
                value: host.clone(),
                reason: e.to_string(),
            })?;

        let auth_secret = var(AUTH_SECRET_ENV).ok_or(ConfigError::Missing(AUTH_SECRET_ENV))?;

        let token_ttl = var(TOKEN_TTL_ENV).unwrap_or_else(|| DEFAULT_TOKEN_TTL.to_string());
        if parse_ttl(&token_ttl)? == 0 {
            return Err(ConfigError::Invalid {
                name: TOKEN_TTL_ENV,
                value: token_ttl,
                reason: "must be longer than zero".to_string(),
            });
        }

        let max_requests: u32 = parse_or(var(RATE_LIMIT_MAX_ENV), RATE_LIMIT_MAX_ENV, 30)?;
        if max_requests == 0 {
            return Err(ConfigError::Invalid {
                name: RATE_LIMIT_MAX_ENV,
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        let window_secs: u64 = parse_or(var(RATE_LIMIT_WINDOW_ENV), RATE_LIMIT_WINDOW_ENV, 60)?;
        if window_secs == 0 {
            return Err(ConfigError::Invalid {
                name: RATE_LIMIT_WINDOW_ENV,
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        let sweep_secs: u64 = parse_or(var(RATE_LIMIT_SWEEP_ENV), RATE_LIMIT_SWEEP_ENV, 0)?;
        let trust_proxy_headers = match var(TRUST_PROXY_HEADERS_ENV).map(|v| v.to_lowercase()) {
            None => false,
            Some(v) if v == "true" || v == "1" => true,
            Some(v) if v == "false" || v == "0" => false,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: TRUST_PROXY_HEADERS_ENV,
                    value: other,
                    reason: "expected true or false".to_string(),
                })
            }
        };

        let log_format = match var(LOG_FORMAT_ENV).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    value: other.to_string(),
                    reason: "expected 'json' or 'pretty'".to_string(),
                })
            }
        };

        Ok(Self {
            bind_addr,
            auth_secret,
            token_ttl,
            rate_limit: RateLimitPolicy {
                max_requests,
                window: Duration::from_secs(window_secs),
            },
            sweep_interval: (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs)),
            trust_proxy_headers,
            seed_admin_email: var(SEED_ADMIN_EMAIL_ENV),
            log_format,
        })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("auth_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("rate_limit", &self.rate_limit)
            .field("sweep_interval", &self.sweep_interval)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .field("seed_admin_email", &self.seed_admin_email)
            .field("log_format", &self.log_format)
            .finish()
    }
}

fn parse_or<T>(value: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
