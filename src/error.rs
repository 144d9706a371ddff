// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::password::PasswordError;
use crate::auth::token::TokenError;
use crate::database::models::InvalidOption;
use crate::database::{max_amount, DatabaseError, MAX_IDENTITY_LEN};
use crate::services::credential_service::CredentialError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    InvalidPayload,
    InvalidEnumValue(InvalidOption),
    NonNumericAmount(&'static str),
    NegativeAmount(&'static str),
    AmountTooLarge(&'static str),
    TextTooLong(&'static str),
    InvalidDate(&'static str),
    DateOrderViolation,
    DuplicateIdentity,

    // 401 Unauthorized
    TokenMissing,
    TokenInvalid,
    TokenExpired,
    NotAdmin,

    // 404 Not Found
    RecordNotFound(String),
    UserNotFound,

    // 500 Internal Server Error
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload
            | ApiError::InvalidEnumValue(_)
            | ApiError::NonNumericAmount(_)
            | ApiError::NegativeAmount(_)
            | ApiError::AmountTooLarge(_)
            | ApiError::TextTooLong(_)
            | ApiError::InvalidDate(_)
            | ApiError::DateOrderViolation
            | ApiError::DuplicateIdentity => StatusCode::BAD_REQUEST,
            ApiError::TokenMissing
            | ApiError::TokenInvalid
            | ApiError::TokenExpired
            | ApiError::NotAdmin => StatusCode::UNAUTHORIZED,
            ApiError::RecordNotFound(_) | ApiError::UserNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::InvalidPayload => "Invalid payload.".to_string(),
            ApiError::InvalidEnumValue(invalid) => invalid.to_string(),
            ApiError::NonNumericAmount(field) => format!("'{}' must be a number.", field),
            ApiError::NegativeAmount(field) => format!("'{}' must not be negative.", field),
            ApiError::AmountTooLarge(field) => {
                format!("'{}' must not exceed {}.", field, max_amount())
            }
            ApiError::TextTooLong(field) => {
                format!("'{}' must be at most {} characters.", field, MAX_IDENTITY_LEN)
            }
            ApiError::InvalidDate(field) => {
                format!("'{}' must be a date in YYYY-MM-DD format.", field)
            }
            // Fields are named as they appear on the wire
            ApiError::DateOrderViolation => {
                "endDate must be equal to or later than startDate".to_string()
            }
            ApiError::DuplicateIdentity => "Sorry. That user already exists.".to_string(),
            ApiError::TokenMissing => "Provide a valid auth token.".to_string(),
            ApiError::TokenInvalid => "Auth token invalid. Please log in again.".to_string(),
            ApiError::TokenExpired => "Signature expired. Please log in again.".to_string(),
            ApiError::NotAdmin => "User must be admin.".to_string(),
            ApiError::RecordNotFound(message) => message.clone(),
            ApiError::UserNotFound => "User does not exist.".to_string(),
            ApiError::Internal(message) => message.clone(),
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidPayload => "INVALID_PAYLOAD",
            ApiError::InvalidEnumValue(_) => "INVALID_ENUM_VALUE",
            ApiError::NonNumericAmount(_) => "NON_NUMERIC_AMOUNT",
            ApiError::NegativeAmount(_) => "NEGATIVE_AMOUNT",
            ApiError::AmountTooLarge(_) => "AMOUNT_TOO_LARGE",
            ApiError::TextTooLong(_) => "TEXT_TOO_LONG",
            ApiError::InvalidDate(_) => "INVALID_DATE",
            ApiError::DateOrderViolation => "DATE_ORDER_VIOLATION",
            ApiError::DuplicateIdentity => "DUPLICATE_IDENTITY",
            ApiError::TokenMissing => "TOKEN_MISSING",
            ApiError::TokenInvalid => "TOKEN_INVALID",
            ApiError::TokenExpired => "TOKEN_EXPIRED",
            ApiError::NotAdmin => "NOT_ADMIN",
            ApiError::RecordNotFound(_) => "RECORD_NOT_FOUND",
            ApiError::UserNotFound => "USER_NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "status": "fail",
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

impl ApiError {
    /// 404 for a record kind, e.g. `not_found("Job")` -> "Job does not exist"
    pub fn not_found(kind: &str) -> Self {
        ApiError::RecordNotFound(format!("{} does not exist", kind))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

// Convert other error types to ApiError
impl From<InvalidOption> for ApiError {
    fn from(err: InvalidOption) -> Self {
        ApiError::InvalidEnumValue(err)
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueViolation(_) => ApiError::DuplicateIdentity,
            DatabaseError::CheckViolation(constraint) if constraint.ends_with("date_order") => {
                ApiError::DateOrderViolation
            }
            DatabaseError::CheckViolation(constraint) if constraint.ends_with("nonnegative") => {
                ApiError::NegativeAmount("amountPaid")
            }
            DatabaseError::CheckViolation(constraint) => {
                tracing::error!("Unmapped check constraint violated: {}", constraint);
                ApiError::internal("An error occurred while processing your request")
            }
            DatabaseError::OutOfRange(detail) => {
                tracing::warn!("Value rejected by storage: {}", detail);
                ApiError::InvalidPayload
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal("Database error occurred")
            }
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::internal("Database error occurred")
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => ApiError::TokenExpired,
            TokenError::Invalid => ApiError::TokenInvalid,
            TokenError::Encode(e) => {
                tracing::error!("Token encoding failed: {}", e);
                ApiError::internal("Failed to issue auth token")
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        tracing::error!("Password hashing error: {}", err);
        ApiError::internal("An error occurred while processing your request")
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::DuplicateIdentity => ApiError::DuplicateIdentity,
            CredentialError::Database(e) => e.into(),
            CredentialError::Password(e) => e.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
