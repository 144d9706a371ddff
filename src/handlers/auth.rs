// handlers/auth.rs - Session lifecycle: register, login, logout, status

use axum::extract::State;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Payload};
use crate::AppState;

/**
 * POST /admin/register - Create an account and sign in
 *
 * Expected Input:
 * ```json
 * {
 *   "username": "string",
 *   "email": "string",
 *   "password": "string",
 *   "isPrivateDevice": true    // Optional: long-lived token when true
 * }
 * ```
 *
 * Output: 201 with `message`, `auth_token`, `expiration` and `user`.
 */
pub async fn register(State(state): State<AppState>, payload: Payload) -> ApiResult {
    payload.require(&["username", "email", "password"])?;
    let username = payload.identity("username")?;
    let email = payload.identity("email")?;
    let password = payload.text("password")?;
    let is_private_device = payload.optional_flag("isPrivateDevice")?.unwrap_or(false);

    let user = state
        .credentials
        .register(&username, &email, &password)
        .await?;
    let issued = state.tokens.issue(user.id, is_private_device)?;

    Ok(ApiResponse::created()
        .message("Successfully registered.")
        .field("auth_token", issued.token)
        .field("expiration", issued.expires_at)
        .field("user", user))
}

/**
 * POST /admin/login - Exchange credentials for a token
 *
 * Accepts either `username` or `email` alongside `password`. An unknown
 * identifier and a wrong password both answer 404 "User does not exist.".
 */
pub async fn login(State(state): State<AppState>, payload: Payload) -> ApiResult {
    let identifier = match payload.optional_text("username")? {
        Some(username) => username,
        None => payload
            .optional_text("email")?
            .ok_or(ApiError::InvalidPayload)?,
    };
    let password = payload.text("password")?;
    let is_private_device = payload.optional_flag("isPrivateDevice")?.unwrap_or(false);

    let Some(user) = state.credentials.verify(&identifier, &password).await? else {
        warn!("Failed login for {}", identifier);
        return Err(ApiError::UserNotFound);
    };

    let issued = state.tokens.issue(user.id, is_private_device)?;
    info!("User {} logged in", user.username);

    Ok(ApiResponse::success()
        .message("Successfully logged in.")
        .field("auth_token", issued.token)
        .field("expiration", issued.expires_at)
        .field("user", user))
}

/// GET /admin/logout - tokens are stateless, so this only confirms the gate passed
pub async fn logout() -> ApiResponse {
    ApiResponse::success().message("Successfully logged out.")
}

pub async fn status(AuthUser(user): AuthUser) -> ApiResponse {
    ApiResponse::success().data(user)
}
