use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::database::models::InvalidOption;
use crate::database::{max_amount, MAX_IDENTITY_LEN};
use crate::error::ApiError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Non-empty JSON object body. Anything else (no body, wrong content type,
/// malformed JSON, a non-object, `{}`) is rejected as "Invalid payload.".
#[derive(Debug, Clone)]
pub struct Payload(pub Map<String, Value>);

#[async_trait]
impl<S: Send + Sync> FromRequest<S> for Payload {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state).await.map_err(|e| {
            tracing::debug!("Rejected request body: {}", e);
            ApiError::InvalidPayload
        })?;

        match value {
            Value::Object(map) if !map.is_empty() => Ok(Payload(map)),
            _ => Err(ApiError::InvalidPayload),
        }
    }
}

impl Payload {
    /// Overlay this payload on the JSON form of an existing record, so an
    /// update only needs to carry the fields it changes.
    pub fn over(self, existing: impl Serialize) -> Result<Payload, ApiError> {
        let mut base = match serde_json::to_value(existing) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(ApiError::internal("Record did not serialize to an object")),
            Err(e) => {
                tracing::error!("Failed to serialize existing record: {}", e);
                return Err(ApiError::internal("Failed to read existing record"));
            }
        };
        base.extend(self.0);
        Ok(Payload(base))
    }

    fn present(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Required string field
    pub fn text(&self, key: &str) -> Result<String, ApiError> {
        match self.present(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(ApiError::InvalidPayload),
        }
    }

    /// Required string field no longer than a `VARCHAR(128)` identity column
    pub fn identity(&self, key: &'static str) -> Result<String, ApiError> {
        let value = self.text(key)?;
        if value.chars().count() > MAX_IDENTITY_LEN {
            return Err(ApiError::TextTooLong(key));
        }
        Ok(value)
    }

    /// Optional string field; absent and `null` both read as `None`
    pub fn optional_text(&self, key: &str) -> Result<Option<String>, ApiError> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(ApiError::InvalidPayload),
        }
    }

    /// Required boolean field
    pub fn flag(&self, key: &str) -> Result<bool, ApiError> {
        match self.present(key) {
            Some(Value::Bool(b)) => Ok(*b),
            _ => Err(ApiError::InvalidPayload),
        }
    }

    pub fn optional_flag(&self, key: &str) -> Result<Option<bool>, ApiError> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(ApiError::InvalidPayload),
        }
    }

    /// Every key must be present and non-null
    pub fn require(&self, keys: &[&str]) -> Result<(), ApiError> {
        if keys.iter().all(|key| self.present(key).is_some()) {
            Ok(())
        } else {
            Err(ApiError::InvalidPayload)
        }
    }

    /// Closed-set option given by its display string
    pub fn option<T>(&self, key: &str) -> Result<T, ApiError>
    where
        T: FromStr<Err = InvalidOption>,
    {
        match self.present(key) {
            Some(Value::String(s)) => Ok(s.parse()?),
            // Non-strings never match a display string; report the raw JSON
            Some(other) => Ok(other.to_string().parse()?),
            None => Err(ApiError::InvalidPayload),
        }
    }

    /// Non-negative amount, rounded to cents and no larger than the amount
    /// columns hold. Accepts JSON numbers and numeric strings. Every accepted
    /// value has few enough digits to survive the float wire format exactly.
    pub fn amount(&self, key: &'static str) -> Result<Decimal, ApiError> {
        let raw = match self.present(key) {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(_) => return Err(ApiError::NonNumericAmount(key)),
            None => return Err(ApiError::InvalidPayload),
        };

        let amount = Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .map_err(|_| ApiError::NonNumericAmount(key))?;

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(ApiError::NegativeAmount(key));
        }

        let amount = amount.round_dp(2);
        if amount > max_amount() {
            return Err(ApiError::AmountTooLarge(key));
        }
        Ok(amount)
    }

    /// Required `YYYY-MM-DD` date
    pub fn date(&self, key: &'static str) -> Result<NaiveDate, ApiError> {
        self.optional_date(key)?.ok_or(ApiError::InvalidPayload)
    }

    /// Optional `YYYY-MM-DD` date; absent, `null` and `""` read as `None`
    pub fn optional_date(&self, key: &'static str) -> Result<Option<NaiveDate>, ApiError> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => parse_date(s, key).map(Some),
            Some(_) => Err(ApiError::InvalidDate(key)),
        }
    }
}

pub fn parse_date(raw: &str, field: &'static str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| ApiError::InvalidDate(field))
}
