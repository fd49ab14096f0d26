//! The ownership-enforcing task gateway.
//!
//! Every operation takes the caller's [`AccountId`] explicitly. Reads and writes
//! of an individual task go through [`authorize`], the single predicate deciding
//! whether an account may act on a task; a task owned by someone else is reported
//! exactly like a task that does not exist.

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{AccountId, NewTask, Task, TaskPatch, TaskQuery};
use crate::store::Store;

const TASK_NOT_FOUND: &str = "Task not found";

fn not_found() -> AppError {
    AppError::NotFound(TASK_NOT_FOUND.into())
}

/// Capability proving that an account owns a task. Only [`authorize`] creates one.
#[derive(Debug)]
pub struct Owned {
    task: Task,
}

impl Owned {
    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn into_inner(self) -> Task {
        self.task
    }
}

/// Grants an [`Owned`] capability if `task` exists and belongs to `account_id`.
pub fn authorize(account_id: AccountId, task: Option<Task>) -> Result<Owned, AppError> {
    match task {
        Some(task) if task.owner_id == account_id => Ok(Owned { task }),
        _ => Err(not_found()),
    }
}

pub struct TaskGateway {
    store: Arc<dyn Store>,
}

impl TaskGateway {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn owned(&self, account_id: AccountId, task_id: Uuid) -> Result<Owned, AppError> {
        authorize(account_id, self.store.find_task(task_id).await?)
    }

    /// Tasks owned by `account_id`, optionally filtered, newest first.
    pub async fn list(&self, account_id: AccountId, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        self.store.list_tasks(account_id, query).await
    }

    pub async fn create(&self, account_id: AccountId, input: NewTask) -> Result<Task, AppError> {
        input.validate()?;
        let task = self.store.insert_task(Task::new(input, account_id)).await?;
        log::debug!("account {} created task {}", account_id, task.id);
        Ok(task)
    }

    pub async fn get(&self, account_id: AccountId, task_id: Uuid) -> Result<Task, AppError> {
        self.owned(account_id, task_id).await.map(Owned::into_inner)
    }

    /// Merges the fields present in `patch` into the task.
    pub async fn update(
        &self,
        account_id: AccountId,
        task_id: Uuid,
        patch: TaskPatch,
    ) -> Result<Task, AppError> {
        patch.validate()?;
        let owned = self.owned(account_id, task_id).await?;
        if patch.is_empty() {
            return Ok(owned.into_inner());
        }
        let task = owned.task();
        self.store
            .update_task(task.owner_id, task.id, &patch)
            .await?
            // Deleted between the ownership check and the write.
            .ok_or_else(not_found)
    }

    pub async fn delete(&self, account_id: AccountId, task_id: Uuid) -> Result<(), AppError> {
        let owned = self.owned(account_id, task_id).await?;
        let task = owned.task();
        if self.store.delete_task(task.owner_id, task.id).await? {
            log::debug!("account {} deleted task {}", account_id, task.id);
            Ok(())
        } else {
            Err(not_found())
        }
    }
}
