//!
//! # Custom Error Handling
//!
//! This module defines `AppError`, the single error type shared by the credential
//! store, the session issuer/verifier, the task gateway and the HTTP layer.
//!
//! The variants keep the precise cause of a failure (expired token vs. bad signature,
//! unknown user vs. wrong password) so it can be logged and tested, while the
//! `ResponseError` impl collapses every authentication failure into one undifferentiated
//! response body. Clients learn *that* they are unauthorized, never *why*.
//!
//! `From` impls for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error`, `bcrypt::BcryptError` and `tokio::task::JoinError`
//! allow the `?` operator throughout.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Body sent for every token failure.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";
/// Body sent for every failed login, whether the username or the password was wrong.
pub const LOGIN_FAILED_MESSAGE: &str = "Invalid username or password";

/// Postgres SQLSTATE for `unique_violation`.
const PG_UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for `foreign_key_violation`.
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// A unique resource already exists (HTTP 409). Used for duplicate usernames.
    Conflict(String),
    /// The requested resource does not exist, or exists but belongs to another
    /// account (HTTP 404). The two cases are deliberately indistinguishable.
    NotFound(String),
    /// A password did not match the stored hash.
    InvalidCredentials,
    /// The bearer token could not be parsed or decoded.
    MalformedToken,
    /// The bearer token was signed with a different key.
    InvalidSignature,
    /// The bearer token is past its embedded expiry.
    ExpiredToken,
    /// Authentication is required but missing, or the authenticated account is gone (HTTP 401).
    Unauthorized(String),
    /// A client-side error due to a malformed request (HTTP 400).
    BadRequest(String),
    /// Failed input validation (HTTP 422 Unprocessable Entity).
    ValidationError(String),
    /// An error originating from the store (HTTP 500).
    DatabaseError(String),
    /// An unexpected server-side error (HTTP 500).
    InternalServerError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::MalformedToken => write!(f, "Malformed token"),
            AppError::InvalidSignature => write!(f, "Invalid token signature"),
            AppError::ExpiredToken => write!(f, "Expired token"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// Token failures share one status and body. Store and internal failures are logged
/// here and reported to the client without their details.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidCredentials | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MalformedToken
            | AppError::InvalidSignature
            | AppError::ExpiredToken
            | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Conflict(msg)
            | AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::ValidationError(msg) => msg.clone(),
            AppError::InvalidCredentials => LOGIN_FAILED_MESSAGE.to_string(),
            AppError::MalformedToken
            | AppError::InvalidSignature
            | AppError::ExpiredToken
            | AppError::Unauthorized(_) => {
                log::debug!("rejecting request: {}", self);
                UNAUTHORIZED_MESSAGE.to_string()
            }
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                log::error!("{}", self);
                "Internal server error".to_string()
            }
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`; a unique violation (duplicate username) becomes
/// `Conflict`; a foreign-key violation means the owning account vanished underneath a
/// still-valid token, which is reported as `Unauthorized`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        if let sqlx::Error::Database(db_err) = &error {
            match db_err.code().as_deref() {
                Some(PG_UNIQUE_VIOLATION) => {
                    return AppError::Conflict("Username already taken".into())
                }
                Some(PG_FOREIGN_KEY_VIOLATION) => {
                    return AppError::Unauthorized("Account no longer exists".into())
                }
                _ => {}
            }
        }
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Converts `sqlx::migrate::MigrateError` into `AppError::DatabaseError`.
impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::DatabaseError(error.to_string())
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Maps JWT decoding failures onto the token taxonomy.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        match error.kind() {
            JwtErrorKind::InvalidSignature => AppError::InvalidSignature,
            JwtErrorKind::ExpiredSignature => AppError::ExpiredToken,
            _ => AppError::MalformedToken,
        }
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

/// A blocking hash job panicked or was cancelled.
impl From<tokio::task::JoinError> for AppError {
    fn from(error: tokio::task::JoinError) -> AppError {
        AppError::InternalServerError(format!("blocking task failed: {}", error))
    }
}
