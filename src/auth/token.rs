use crate::config::AuthConfig;
use crate::error::AppError;
use crate::models::AccountId;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Represents the claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// The account the token was issued to.
    pub sub: AccountId,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiration, seconds since epoch.
    pub exp: i64,
}

/// A freshly minted token together with its absolute expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies stateless HS256 session tokens.
///
/// Built once at startup from [`AuthConfig`] and shared read-only by every request.
/// Rebuilding it with a different secret invalidates all outstanding tokens.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(config: &AuthConfig) -> Self {
        Self::from_secret(config.jwt_secret.as_bytes(), config.token_ttl)
    }

    pub fn from_secret(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `verify_at` against an explicit clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Mints a token for `account_id` valid for the configured TTL from now.
    pub fn issue(&self, account_id: AccountId) -> Result<IssuedToken, AppError> {
        self.issue_at(account_id, Utc::now())
    }

    pub fn issue_at(&self, account_id: AccountId, now: DateTime<Utc>) -> Result<IssuedToken, AppError> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: account_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Resolves a bearer token to the account it was issued to.
    ///
    /// Fails with `MalformedToken`, `InvalidSignature` or `ExpiredToken`. No store
    /// lookup is performed.
    pub fn verify(&self, token: &str) -> Result<AccountId, AppError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<AccountId, AppError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)?.claims;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(AppError::MalformedToken)?;
        if now >= expires_at {
            return Err(AppError::ExpiredToken);
        }
        Ok(claims.sub)
    }
}
