// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin token issuance.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::extract::ApiJson;
use crate::{
    auth::{token::parse_ttl, AdminOnly, IssuedToken},
    error::ApiError,
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueTokenRequest {
    /// Email of the account to issue a token for
    pub email: String,
    /// Lifetime such as `15m` or `12h`; defaults to the server's `TOKEN_TTL`
    #[serde(default)]
    pub ttl: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IssueTokenResponse {
    pub success: bool,
    #[serde(flatten)]
    pub issued: IssuedToken,
}

/// Issue a session token for an existing user (admin only).
///
/// The token carries the user's current role; later role changes do not
/// affect tokens already issued.
#[utoipa::path(
    post,
    path = "/v1/admin/tokens",
    tag = "Admin",
    security(("bearer" = [])),
    request_body = IssueTokenRequest,
    responses(
        (status = 201, description = "Token issued", body = IssueTokenResponse),
        (status = 400, description = "Invalid or zero TTL, or unparseable body"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Forbidden - admin role required"),
        (status = 404, description = "No user with that email"),
        (status = 422, description = "Body is missing required fields"),
    )
)]
pub async fn issue_token(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<IssueTokenRequest>,
) -> Result<(StatusCode, Json<IssueTokenResponse>), ApiError> {
    // Explicit TTLs are validated here; the codec's lenient fallback only
    // covers the server default, which config already checked.
    let ttl = match request.ttl {
        Some(ttl) => match parse_ttl(&ttl) {
            Ok(0) => return Err(ApiError::bad_request("TTL must be longer than zero")),
            Ok(_) => ttl,
            Err(e) => return Err(ApiError::bad_request(e.to_string())),
        },
        None => state.token_ttl.clone(),
    };

    let user = state
        .users
        .find_by_email(&request.email)
        .ok_or_else(|| ApiError::not_found(format!("User with email {}", request.email)))?;

    let issued = state
        .auth
        .issue(&user.identity(), &ttl)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::info!(
        issued_by = %admin.id,
        user_id = %user.id,
        role = %user.role,
        expires_at = ?issued.expires_at,
        "Issued session token"
    );

    Ok((
        StatusCode::CREATED,
        Json(IssueTokenResponse {
            success: true,
            issued,
        }),
    ))
}
