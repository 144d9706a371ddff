// handlers/users.rs - /admin/users handlers (all open)

use axum::extract::{Path, State};
use serde_json::json;

use super::record_id;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Payload};
use crate::AppState;

const KIND: &str = "User";

/// POST /admin/users - create an account without issuing a token
pub async fn create(State(state): State<AppState>, payload: Payload) -> ApiResult {
    payload.require(&["username", "email", "password"])?;
    let username = payload.identity("username")?;
    let email = payload.identity("email")?;
    let password = payload.text("password")?;

    let user = state
        .credentials
        .register(&username, &email, &password)
        .await?;

    Ok(ApiResponse::created()
        .message(format!("User {} was added!", user.username))
        .field("user", user))
}

pub async fn list(State(state): State<AppState>) -> ApiResult {
    let users = state.store.list_users().await?;
    Ok(ApiResponse::success().data(json!({ "users": users })))
}

pub async fn get(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let id = record_id(&raw_id, KIND)?;
    let user = state
        .store
        .find_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found(KIND))?;
    Ok(ApiResponse::success().data(user))
}
