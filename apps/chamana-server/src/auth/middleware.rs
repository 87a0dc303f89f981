// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Two ways to gate a handler:
//!
//! - Wrap a single handler with [`with_auth`] / [`with_roles`]. The wrapped
//!   function receives the request (already decorated with the identity) and
//!   an explicit [`AuthContext`].
//! - Layer [`require_auth`] over a router subtree with
//!   `axum::middleware::from_fn_with_state(gate, require_auth)` and read the
//!   identity with the [`Auth`](super::Auth) extractor.
//!
//! Either way, a missing or invalid token short-circuits with 401 and a
//! disallowed role with 403; the handler never runs. Neither path logs.
//!
//! ```rust,ignore
//! let admins = gate.with_roles(&[Role::Admin]);
//! let app = Router::new().route(
//!     "/v1/admin/ping",
//!     get(with_auth(admins, |_req: Request, ctx: AuthContext| async move {
//!         Json(ctx.user)
//!     })),
//! );
//! ```

use std::{future::Future, pin::Pin};

use axum::{
    extract::{Request, State},
    handler::Handler,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::claims::{AuthContext, AuthenticatedUser};
use super::gate::AuthGate;
use super::roles::Role;

/// Middleware that authenticates (and role-checks, if the gate is
/// restricted) every request passing through it.
pub async fn require_auth(
    State(gate): State<AuthGate>,
    mut request: Request,
    next: Next,
) -> Response {
    match gate.authorize(request.headers()) {
        Ok(user) => {
            decorate(&mut request, user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Require any authenticated user before running `handler`.
pub fn with_auth<H>(gate: AuthGate, handler: H) -> Guarded<H> {
    Guarded { gate, handler }
}

/// Require an authenticated user whose role is in `roles`.
pub fn with_roles<H>(gate: &AuthGate, roles: &[Role], handler: H) -> Guarded<H> {
    Guarded {
        gate: gate.with_roles(roles),
        handler,
    }
}

/// A handler behind an [`AuthGate`]. Built by [`with_auth`] / [`with_roles`].
#[derive(Clone)]
pub struct Guarded<H> {
    gate: AuthGate,
    handler: H,
}

/// Marker for the [`Handler`] implementation of [`Guarded`].
#[doc(hidden)]
pub struct GuardedMarker;

impl<H, Fut, R, S> Handler<GuardedMarker, S> for Guarded<H>
where
    H: Fn(Request, AuthContext) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
    S: Send + 'static,
{
    type Future = Pin<Box<dyn Future<Output = Response> + Send>>;

    fn call(self, mut request: Request, _state: S) -> Self::Future {
        Box::pin(async move {
            let user = match self.gate.authorize(request.headers()) {
                Ok(user) => user,
                Err(e) => return e.into_response(),
            };
            let context = decorate(&mut request, user);
            (self.handler)(request, context).await.into_response()
        })
    }
}

fn decorate(request: &mut Request, user: AuthenticatedUser) -> AuthContext {
    let context = AuthContext { user: user.clone() };
    request.extensions_mut().insert(user);
    request.extensions_mut().insert(context.clone());
    context
}
