// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{require_auth, with_auth, AuthenticatedUser, IssuedToken, Role},
    error::ErrorBody,
    rate_limit::rate_limit,
    repository::User,
    state::AppState,
};

pub mod extract;
pub mod health;
pub mod tokens;
pub mod users;

/// Build the application router.
///
/// Health checks and docs are open. Everything under `/v1` is rate
/// limited per client; `/v1/users/me` needs any valid token and the admin
/// routes need the admin role.
pub fn router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/users/{id}", get(users::get_user))
        .route("/admin/users", get(users::list_users))
        .route("/admin/tokens", post(tokens::issue_token))
        .route_layer(middleware::from_fn_with_state(
            state.auth.with_roles(&[Role::Admin]),
            require_auth,
        ));

    let v1_routes = Router::new()
        .route(
            "/users/me",
            get(with_auth(state.auth.clone(), users::current_user)),
        )
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .nest("/v1", v1_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        users::current_user,
        users::get_user,
        users::list_users,
        tokens::issue_token
    ),
    components(
        schemas(
            AuthenticatedUser,
            Role,
            User,
            IssuedToken,
            ErrorBody,
            health::ReadyResponse,
            health::HealthResponse,
            users::CurrentUserResponse,
            users::UserResponse,
            users::UserListResponse,
            tokens::IssueTokenRequest,
            tokens::IssueTokenResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness checks"),
        (name = "Users", description = "Identity and account lookup"),
        (name = "Admin", description = "Back-office operations")
    )
)]
struct ApiDoc;
