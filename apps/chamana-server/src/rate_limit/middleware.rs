// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Rate limiting middleware.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/v1/products", get(list_products))
//!     .layer(axum::middleware::from_fn_with_state(limiter, rate_limit));
//! ```

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::{RateDecision, RateLimiter};
use crate::auth::AuthError;

const UNKNOWN_CLIENT: &str = "unknown";

/// Count the request against the caller's key; reject with 429 and
/// `Retry-After` once the window's quota is used up.
pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(request.headers(), peer, limiter.trusts_proxy_headers());

    match limiter.check(&key) {
        RateDecision::Allowed { .. } => next.run(request).await,
        RateDecision::Limited { retry_after } => {
            warn!(
                client = %key,
                path = %request.uri().path(),
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exceeded"
            );
            AuthError::RateLimitExceeded { retry_after }.into_response()
        }
    }
}

/// Identify the caller by socket peer IP.
///
/// With `trust_proxy_headers`, the first `X-Forwarded-For` hop and then
/// `X-Real-IP` take precedence over the peer. Clients can set those headers
/// freely, so they are ignored unless a proxy in front rewrites them.
pub fn client_key(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy_headers: bool,
) -> String {
    if trust_proxy_headers {
        if let Some(forwarded) = forwarded_client(headers) {
            return forwarded;
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    header("x-forwarded-for")
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header("x-real-ip"))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, time::Duration};

    use axum::{
        body::Body,
        http::{header::RETRY_AFTER, HeaderValue, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    use crate::clock::ManualClock;
    use crate::rate_limit::RateLimitPolicy;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    const PEER: &str = "192.168.1.9:5555";

    fn peer() -> SocketAddr {
        PEER.parse().unwrap()
    }

    #[test]
    fn client_key_ignores_proxy_headers_by_default() {
        let map = headers(&[
            ("x-forwarded-for", "203.0.113.5"),
            ("x-real-ip", "198.51.100.2"),
        ]);
        assert_eq!(client_key(&map, Some(peer()), false), "192.168.1.9");
        assert_eq!(client_key(&map, None, false), "unknown");
    }

    #[test]
    fn client_key_prefers_forwarded_for_when_trusted() {
        let map = headers(&[
            ("x-forwarded-for", "203.0.113.5, 10.0.0.1"),
            ("x-real-ip", "198.51.100.2"),
        ]);
        assert_eq!(client_key(&map, Some(peer()), true), "203.0.113.5");
    }

    #[test]
    fn trusted_client_key_falls_back_in_order() {
        assert_eq!(
            client_key(&headers(&[("x-real-ip", "198.51.100.2")]), Some(peer()), true),
            "198.51.100.2"
        );
        assert_eq!(
            client_key(&headers(&[("x-forwarded-for", " ")]), Some(peer()), true),
            "192.168.1.9"
        );
        assert_eq!(client_key(&HeaderMap::new(), None, true), "unknown");
    }

    fn limiter(clock: Arc<ManualClock>) -> RateLimiter {
        RateLimiter::in_memory(
            clock,
            RateLimitPolicy {
                max_requests: 30,
                window: Duration::from_secs(60),
            },
        )
    }

    fn app(limiter: RateLimiter) -> Router {
        Router::new()
            .route("/catalog", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(limiter, rate_limit))
    }

    /// A request arriving from `PEER` that claims to be forwarded for `ip`.
    fn request_from(ip: &str) -> Request {
        let mut request = Request::builder()
            .uri("/catalog")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap();
        request.extensions_mut().insert(ConnectInfo(peer()));
        request
    }

    #[tokio::test]
    async fn rejects_over_limit_with_retry_hint() {
        let clock = Arc::new(ManualClock::at_secs(1_700_000_000));
        let app = app(limiter(clock.clone()).with_proxy_headers(true));

        for _ in 0..30 {
            let response = app.clone().oneshot(request_from("203.0.113.5")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.clone().oneshot(request_from("203.0.113.5")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[RETRY_AFTER], "60");

        // Another client behind the same proxy is unaffected.
        let response = app.clone().oneshot(request_from("203.0.113.6")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        clock.advance_secs(61);
        let response = app.oneshot(request_from("203.0.113.5")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn rotating_forwarded_for_does_not_evade_limit() {
        let clock = Arc::new(ManualClock::at_secs(1_700_000_000));
        let app = app(limiter(clock));

        for i in 0..30 {
            let spoofed = format!("10.9.8.{i}");
            let response = app.clone().oneshot(request_from(&spoofed)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.oneshot(request_from("10.9.8.250")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
