// handlers/mod.rs - Route handlers, one module per resource
//
// Gating is applied in the router, not here:
//   open        reads, registration/login, user and expense creation, ping
//   user gate   job creation, every update/delete, logout
//   subject     status (handler receives the caller as AuthUser)
//   admin gate  calendar events

pub mod auth;
pub mod events;
pub mod expenses;
pub mod general;
pub mod jobs;
pub mod users;

use crate::error::ApiError;

/// Path ids that fail to parse are indistinguishable from absent rows.
pub(crate) fn record_id(raw: &str, kind: &str) -> Result<i32, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found(kind))
}
