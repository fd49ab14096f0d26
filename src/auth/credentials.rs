use std::sync::Arc;

use super::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::models::{Account, AccountId};
use crate::store::Store;

/// Registers, verifies and deletes accounts.
///
/// Plaintext passwords only ever live on the stack of these calls; they are never
/// persisted or logged.
pub struct CredentialStore {
    store: Arc<dyn Store>,
    bcrypt_cost: u32,
    /// Hash compared against when the username is unknown, so that path costs
    /// the same bcrypt work as a wrong password.
    dummy_hash: String,
}

impl CredentialStore {
    pub async fn new(store: Arc<dyn Store>, bcrypt_cost: u32) -> Result<Self, AppError> {
        let dummy_hash = hash_password("tasknest-timing-equalizer", bcrypt_cost).await?;
        Ok(Self {
            store,
            bcrypt_cost,
            dummy_hash,
        })
    }

    /// Creates an account. Fails with `AppError::Conflict` if the username is taken.
    pub async fn register(&self, username: &str, password: &str) -> Result<Account, AppError> {
        if self.store.find_account_by_username(username).await?.is_some() {
            return Err(AppError::Conflict("Username already taken".into()));
        }
        let password_hash = hash_password(password, self.bcrypt_cost).await?;
        // The store enforces uniqueness again in case a concurrent registration won.
        let account = self
            .store
            .insert_account(Account::new(username.to_string(), password_hash))
            .await?;
        log::info!("registered account {} ({})", account.id, account.username);
        Ok(account)
    }

    /// Checks a username/password pair.
    ///
    /// Fails with `AppError::NotFound` for an unknown username and
    /// `AppError::InvalidCredentials` for a wrong password.
    pub async fn verify(&self, username: &str, password: &str) -> Result<Account, AppError> {
        let Some(account) = self.store.find_account_by_username(username).await? else {
            verify_password(password, &self.dummy_hash).await?;
            return Err(AppError::NotFound("Account not found".into()));
        };
        if verify_password(password, &account.password_hash).await? {
            Ok(account)
        } else {
            Err(AppError::InvalidCredentials)
        }
    }

    /// Deletes the account and every task it owns.
    pub async fn delete(&self, account_id: AccountId) -> Result<(), AppError> {
        if self.store.delete_account(account_id).await? {
            log::info!("deleted account {} and its tasks", account_id);
            Ok(())
        } else {
            Err(AppError::NotFound("Account not found".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    async fn credentials() -> CredentialStore {
        CredentialStore::new(Arc::new(MemoryStore::new()), 4).await.unwrap()
    }

    #[actix_rt::test]
    async fn test_register_then_verify_returns_same_account() {
        let credentials = credentials().await;
        let registered = credentials.register("alice", "pw1").await.unwrap();
        let verified = credentials.verify("alice", "pw1").await.unwrap();

        assert_eq!(registered.id, verified.id);
        assert_ne!(registered.password_hash, "pw1");
    }

    #[actix_rt::test]
    async fn test_duplicate_username_conflicts_regardless_of_password() {
        let credentials = credentials().await;
        credentials.register("alice", "pw1").await.unwrap();

        for password in ["pw1", "something-else"] {
            assert!(matches!(
                credentials.register("alice", password).await,
                Err(AppError::Conflict(_))
            ));
        }
    }

    #[actix_rt::test]
    async fn test_verify_failures() {
        let credentials = credentials().await;
        credentials.register("alice", "pw1").await.unwrap();

        assert!(matches!(
            credentials.verify("alice", "wrong").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            credentials.verify("nobody", "pw1").await,
            Err(AppError::NotFound(_))
        ));
        // Usernames are case-sensitive.
        assert!(matches!(
            credentials.verify("Alice", "pw1").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_rt::test]
    async fn test_delete_removes_account() {
        let credentials = credentials().await;
        let account = credentials.register("alice", "pw1").await.unwrap();

        credentials.delete(account.id).await.unwrap();
        assert!(matches!(
            credentials.verify("alice", "pw1").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            credentials.delete(account.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
