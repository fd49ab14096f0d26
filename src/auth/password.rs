use crate::error::AppError;
use bcrypt::{hash, verify};

/// bcrypt only reads the first 72 bytes of its input. Longer passwords are refused
/// rather than truncated.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hashes `password` with a fresh random salt at `cost`.
///
/// bcrypt is deliberately slow, so this runs on tokio's blocking pool.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::ValidationError(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash(password, cost))
        .await?
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Checks `password` against a stored bcrypt hash. The comparison is constant-time.
///
/// Input over [`MAX_PASSWORD_BYTES`] never matches: no stored password is that long,
/// and bcrypt would otherwise compare only its prefix.
pub async fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Ok(false);
    }
    let password = password.to_owned();
    let hashed_password = hashed_password.to_owned();
    tokio::task::spawn_blocking(move || verify(password, &hashed_password))
        .await?
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum bcrypt cost, keeps the suite fast.
    const TEST_COST: u32 = 4;

    #[actix_rt::test]
    async fn test_password_hashing_and_verification() {
        let password = "test_password123";
        let hashed = hash_password(password, TEST_COST).await.unwrap();

        assert_ne!(hashed, password);
        assert!(verify_password(password, &hashed).await.unwrap());
        assert!(!verify_password("wrong_password", &hashed).await.unwrap());
    }

    #[actix_rt::test]
    async fn test_hashes_are_salted() {
        let first = hash_password("same", TEST_COST).await.unwrap();
        let second = hash_password("same", TEST_COST).await.unwrap();
        assert_ne!(first, second);
    }

    #[actix_rt::test]
    async fn test_verify_with_invalid_hash() {
        match verify_password("test_password123", "invalidhashformat").await {
            Err(AppError::InternalServerError(msg)) => {
                assert!(msg.contains("Failed to verify password"));
            }
            Ok(false) => {}
            Ok(true) => panic!("Password verification should fail for invalid hash format"),
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }

    #[actix_rt::test]
    async fn test_overlong_passwords_are_refused_not_truncated() {
        let password = "é".repeat(36);
        assert_eq!(password.len(), MAX_PASSWORD_BYTES);
        let hashed = hash_password(&password, TEST_COST).await.unwrap();

        assert!(verify_password(&password, &hashed).await.unwrap());
        let extended = format!("{}z", password);
        assert!(!verify_password(&extended, &hashed).await.unwrap());
        assert!(matches!(
            hash_password(&extended, TEST_COST).await,
            Err(AppError::ValidationError(_))
        ));
    }
}
