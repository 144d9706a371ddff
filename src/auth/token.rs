use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, SecurityConfig};

/// Signed token payload. `sub` carries the user id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signature expired")]
    Expired,

    #[error("token invalid")]
    Invalid,

    #[error("token encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: i32,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies HS256 tokens. Private devices get the long lifetime,
/// everything else the short one.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    long_lifetime: Duration,
    short_lifetime: Duration,
}

impl TokenService {
    pub fn new(security: &SecurityConfig) -> Result<Self, ConfigError> {
        let (long_lifetime, short_lifetime) = security.lifetimes()?;
        Ok(Self {
            encoding_key: EncodingKey::from_secret(security.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(security.secret_key.as_bytes()),
            long_lifetime,
            short_lifetime,
        })
    }

    pub fn lifetime(&self, is_private_device: bool) -> Duration {
        if is_private_device {
            self.long_lifetime
        } else {
            self.short_lifetime
        }
    }

    pub fn issue(&self, user_id: i32, is_private_device: bool) -> Result<IssuedToken, TokenError> {
        self.issue_at(user_id, is_private_device, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: i32,
        is_private_device: bool,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = now
            .checked_add_signed(self.lifetime(is_private_device))
            .ok_or_else(|| TokenError::Encode("expiry is out of range".to_string()))?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encode(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    pub fn decode(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        let subject = data.claims.sub.parse().map_err(|_| TokenError::Invalid)?;
        let expires_at = Utc
            .timestamp_opt(data.claims.exp, 0)
            .single()
            .ok_or(TokenError::Invalid)?;

        Ok(VerifiedToken { subject, expires_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, TokenLifetime};

    fn service() -> TokenService {
        TokenService::new(&AppConfig::development().security).unwrap()
    }

    #[test]
    fn test_issue_then_decode_returns_subject() {
        let service = service();
        let issued = service.issue(42, false).unwrap();
        let verified = service.decode(&issued.token).unwrap();
        assert_eq!(verified.subject, 42);
        assert_eq!(verified.expires_at.timestamp(), issued.expires_at.timestamp());
    }

    #[test]
    fn test_private_device_gets_long_lifetime() {
        let service = service();
        let now = Utc::now();
        let long = service.issue_at(1, true, now).unwrap();
        let short = service.issue_at(1, false, now).unwrap();
        assert_eq!(long.expires_at - now, Duration::days(30));
        assert_eq!(short.expires_at - now, Duration::seconds(600));
    }

    #[test]
    fn test_expired_token_is_distinguished() {
        let service = service();
        let issued = service
            .issue_at(7, true, Utc::now() - Duration::days(31))
            .unwrap();
        assert!(matches!(service.decode(&issued.token), Err(TokenError::Expired)));

        // The short lifetime has run out while the long one has not
        let issued = service
            .issue_at(7, false, Utc::now() - Duration::minutes(11))
            .unwrap();
        assert!(matches!(service.decode(&issued.token), Err(TokenError::Expired)));
        let issued = service
            .issue_at(7, true, Utc::now() - Duration::minutes(11))
            .unwrap();
        assert_eq!(service.decode(&issued.token).unwrap().subject, 7);
    }

    #[test]
    fn test_negative_lifetime_expires_immediately() {
        let mut security = AppConfig::testing().security;
        security.token_expire_short = TokenLifetime::new(0, -5);
        let service = TokenService::new(&security).unwrap();
        let issued = service.issue(3, false).unwrap();
        assert!(matches!(service.decode(&issued.token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_garbage_and_foreign_signatures_are_invalid() {
        let service = service();
        assert!(matches!(service.decode("not-a-token"), Err(TokenError::Invalid)));

        let mut other = AppConfig::development().security;
        other.secret_key = "another_secret".to_string();
        let foreign = TokenService::new(&other).unwrap().issue(1, true).unwrap();
        assert!(matches!(service.decode(&foreign.token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_unrepresentable_lifetime_is_refused() {
        let mut security = AppConfig::development().security;
        security.token_expire_long = TokenLifetime::new(1_000_000_000, 0);
        assert!(matches!(
            TokenService::new(&security),
            Err(ConfigError::LifetimeOutOfRange(_))
        ));
    }

    #[test]
    fn test_expiry_past_the_calendar_is_an_error() {
        let service = service();
        let near_end = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        assert!(matches!(
            service.issue_at(1, true, near_end),
            Err(TokenError::Encode(_))
        ));
    }
}
