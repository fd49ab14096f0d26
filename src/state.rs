use std::sync::Arc;

use chrono::Duration;

use crate::auth::{CredentialStore, SessionKeys};
use crate::config::AuthConfig;
use crate::error::AppError;
use crate::store::Store;
use crate::tasks::TaskGateway;

/// Everything a request handler needs, built once at startup and shared through
/// `web::Data`.
pub struct AppState {
    pub credentials: CredentialStore,
    pub sessions: SessionKeys,
    pub tasks: TaskGateway,
}

impl AppState {
    pub async fn new(store: Arc<dyn Store>, config: &AuthConfig) -> Result<Self, AppError> {
        Ok(Self {
            credentials: CredentialStore::new(store.clone(), config.bcrypt_cost).await?,
            sessions: SessionKeys::new(config),
            tasks: TaskGateway::new(store),
        })
    }

    /// Convenience constructor for tests: one-hour tokens signed with `secret`.
    pub async fn with_secret(
        store: Arc<dyn Store>,
        secret: &[u8],
        bcrypt_cost: u32,
    ) -> Result<Self, AppError> {
        Ok(Self {
            credentials: CredentialStore::new(store.clone(), bcrypt_cost).await?,
            sessions: SessionKeys::from_secret(secret, Duration::hours(1)),
            tasks: TaskGateway::new(store),
        })
    }
}
