// handlers/events.rs - GET /admin/events (admin gate)

use axum::extract::{rejection::QueryRejection, Query, State};
use serde::Deserialize;

use crate::database::models::DateWindow;
use crate::error::ApiError;
use crate::middleware::payload::parse_date;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Jobs and one-time expenses falling inside `startDate..=endDate`, plus the caller
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    query: Result<Query<EventsQuery>, QueryRejection>,
) -> ApiResult {
    // Repeated or undecodable parameters
    let Query(query) = query.map_err(|e| {
        tracing::debug!("Rejected events query: {}", e);
        ApiError::InvalidPayload
    })?;

    let start = query
        .start_date
        .as_deref()
        .ok_or(ApiError::InvalidDate("startDate"))
        .and_then(|raw| parse_date(raw, "startDate"))?;
    let end = query
        .end_date
        .as_deref()
        .ok_or(ApiError::InvalidDate("endDate"))
        .and_then(|raw| parse_date(raw, "endDate"))?;

    let events = state.calendar.events(DateWindow::new(start, end)).await?;

    Ok(ApiResponse::success().data(events).field("user", user))
}
