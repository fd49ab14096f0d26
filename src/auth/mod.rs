pub mod credentials;
pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::AccountId;

// Re-export necessary items
pub use credentials::CredentialStore;
pub use extractors::AuthenticatedAccount;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password, MAX_PASSWORD_BYTES};
pub use token::{Claims, IssuedToken, SessionKeys};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Counts UTF-8 bytes, not characters, so no accepted password is ever truncated
/// by the hasher.
fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() || password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::new("password_length"));
    }
    Ok(())
}

/// Represents the payload for a login request.
///
/// Deliberately unvalidated beyond presence: any mismatch is reported as the same
/// generic login failure.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Represents the payload for a new account registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Must be between 3 and 32 characters, alphanumeric, and can include underscores or hyphens.
    /// Stored and compared case-sensitively.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    /// Between 1 and 72 bytes once UTF-8 encoded.
    #[validate(custom(
        function = "validate_password_bytes",
        message = "Password must be between 1 and 72 bytes"
    ))]
    pub password: String,
}

/// Response structure after a successful login.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// The bearer token to attach to subsequent requests.
    pub token: String,
    /// The account the token was issued to.
    pub account_id: AccountId,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}
