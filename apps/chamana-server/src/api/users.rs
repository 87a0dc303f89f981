// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{
    extract::{Request, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use super::extract::ApiPath;
use crate::{
    auth::{AdminOnly, AuthContext, AuthenticatedUser},
    error::ApiError,
    repository::User,
    state::AppState,
};

/// Response for GET /v1/users/me
#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentUserResponse {
    pub success: bool,
    pub user: AuthenticatedUser,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub success: bool,
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<User>,
    pub total: usize,
}

/// Get the identity carried by the caller's token.
///
/// Answers from the token alone; the repository is not consulted.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current identity", body = CurrentUserResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn current_user(_request: Request, ctx: AuthContext) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse {
        success: true,
        user: ctx.user,
    })
}

/// Look up a user by id (admin only).
#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Forbidden - admin role required"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn get_user(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.get(&id)?;
    Ok(Json(UserResponse {
        success: true,
        user,
    }))
}

/// List all users (admin only).
#[utoipa::path(
    get,
    path = "/v1/admin/users",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All users", body = UserListResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Forbidden - admin role required"),
    )
)]
pub async fn list_users(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Json<UserListResponse> {
    let users = state.users.list();
    Json(UserListResponse {
        success: true,
        total: users.len(),
        users,
    })
}
