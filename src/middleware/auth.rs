use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::database::models::User;
use crate::error::ApiError;
use crate::AppState;

/// What a gated route demands of the caller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gate {
    /// Reject subjects whose `is_admin` flag is unset
    pub require_admin: bool,
    /// Load the subject and hand it to the handler as [`AuthUser`]
    pub pass_subject: bool,
}

impl Gate {
    /// Any valid token
    pub const USER: Gate = Gate {
        require_admin: false,
        pass_subject: false,
    };

    /// Any valid token; the handler receives the user
    pub const SUBJECT: Gate = Gate {
        require_admin: false,
        pass_subject: true,
    };

    /// Admin token; the handler receives the user
    pub const ADMIN: Gate = Gate {
        require_admin: true,
        pass_subject: true,
    };
}

/// Middleware state: the application plus the gate configuration
#[derive(Clone)]
pub struct GateState {
    pub app: AppState,
    pub gate: Gate,
}

impl GateState {
    pub fn new(app: &AppState, gate: Gate) -> Self {
        Self {
            app: app.clone(),
            gate,
        }
    }
}

/// The authenticated subject, available to handlers behind a passing gate
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().cloned().ok_or_else(|| {
            warn!("Handler expected an authenticated subject but no gate supplied one");
            ApiError::TokenMissing
        })
    }
}

/// Bearer-token gate. Missing header -> 401 "Provide a valid auth token.",
/// bad token -> invalid/expired 401, non-admin on admin gate -> 401.
pub async fn authorize(
    State(GateState { app, gate }): State<GateState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers()).ok_or_else(|| {
        debug!("Request to {} carried no bearer token", request.uri().path());
        ApiError::TokenMissing
    })?;

    let verified = app.tokens.decode(token).map_err(|e| {
        warn!("Rejected token: {}", e);
        ApiError::from(e)
    })?;

    if gate.require_admin || gate.pass_subject {
        let user = app.store.find_user(verified.subject).await?.ok_or_else(|| {
            warn!("Token subject {} no longer exists", verified.subject);
            ApiError::TokenInvalid
        })?;

        if gate.require_admin && !user.is_admin {
            warn!("User {} is not an admin", user.username);
            return Err(ApiError::NotAdmin);
        }

        if gate.pass_subject {
            request.extensions_mut().insert(AuthUser(user));
        }
    }

    Ok(next.run(request).await)
}

/// Token from `Authorization: Bearer <token>`; `None` when absent or garbled
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_missing_or_garbled_header() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
        assert_eq!(extract_bearer_token(&headers("Bearer")), None);
        assert_eq!(extract_bearer_token(&headers("Bearer   ")), None);
        assert_eq!(extract_bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
    }
}
