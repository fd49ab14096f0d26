//! Persistence seam shared by the credential store and the task gateway.
//!
//! [`PgStore`] is the production backend; [`MemoryStore`] keeps everything in
//! process and backs the test suite and database-less development runs.
//! Store failures are returned immediately; nothing here retries.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Account, AccountId, Task, TaskPatch, TaskQuery};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Persists a new account. Fails with `AppError::Conflict` if the username is taken.
    async fn insert_account(&self, account: Account) -> Result<Account, AppError>;

    /// Exact, case-sensitive username lookup.
    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>, AppError>;

    /// Removes the account together with every task it owns, atomically.
    /// Returns `false` if the account did not exist.
    async fn delete_account(&self, id: AccountId) -> Result<bool, AppError>;

    /// Tasks owned by `owner` that match `query`, newest first.
    async fn list_tasks(&self, owner: AccountId, query: &TaskQuery) -> Result<Vec<Task>, AppError>;

    /// Persists a new task. Fails with `AppError::Unauthorized` if its owner no longer exists.
    async fn insert_task(&self, task: Task) -> Result<Task, AppError>;

    /// Unscoped lookup by id. Callers must run the result through the ownership check.
    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError>;

    /// Applies `patch` to the task if it is owned by `owner`; `None` otherwise.
    async fn update_task(
        &self,
        owner: AccountId,
        id: Uuid,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, AppError>;

    /// Deletes the task if it is owned by `owner`. Returns whether a row was removed.
    async fn delete_task(&self, owner: AccountId, id: Uuid) -> Result<bool, AppError>;
}
