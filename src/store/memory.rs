use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Store;
use crate::error::AppError;
use crate::models::{Account, AccountId, Task, TaskPatch, TaskQuery};

#[derive(Default)]
struct State {
    accounts: HashMap<AccountId, Account>,
    usernames: HashMap<String, AccountId>,
    tasks: HashMap<Uuid, Task>,
}

/// In-process store. Every mutation holds the write lock for its whole duration,
/// which gives per-operation atomicity equivalent to a single SQL statement.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_account(&self, account: Account) -> Result<Account, AppError> {
        let mut state = self.state.write().await;
        if state.usernames.contains_key(&account.username) {
            return Err(AppError::Conflict("Username already taken".into()));
        }
        state.usernames.insert(account.username.clone(), account.id);
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .usernames
            .get(username)
            .and_then(|id| state.accounts.get(id))
            .cloned())
    }

    async fn delete_account(&self, id: AccountId) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let Some(account) = state.accounts.remove(&id) else {
            return Ok(false);
        };
        state.usernames.remove(&account.username);
        state.tasks.retain(|_, task| task.owner_id != id);
        Ok(true)
    }

    async fn list_tasks(&self, owner: AccountId, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        let state = self.state.read().await;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.owner_id == owner && task.matches(query))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn insert_task(&self, task: Task) -> Result<Task, AppError> {
        let mut state = self.state.write().await;
        if !state.accounts.contains_key(&task.owner_id) {
            return Err(AppError::Unauthorized("Account no longer exists".into()));
        }
        state.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        Ok(self.state.read().await.tasks.get(&id).cloned())
    }

    async fn update_task(
        &self,
        owner: AccountId,
        id: Uuid,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, AppError> {
        let mut state = self.state.write().await;
        Ok(state
            .tasks
            .get_mut(&id)
            .filter(|task| task.owner_id == owner)
            .map(|task| {
                task.apply(patch);
                task.clone()
            }))
    }

    async fn delete_task(&self, owner: AccountId, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        match state.tasks.get(&id) {
            Some(task) if task.owner_id == owner => {
                state.tasks.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTask;

    fn account(name: &str) -> Account {
        Account::new(name.to_string(), "$2b$04$hash".to_string())
    }

    fn task_for(owner: AccountId, title: &str) -> Task {
        Task::new(
            NewTask {
                title: title.to_string(),
                ..Default::default()
            },
            owner,
        )
    }

    #[actix_rt::test]
    async fn test_usernames_are_unique_and_case_sensitive() {
        let store = MemoryStore::new();
        store.insert_account(account("alice")).await.unwrap();

        let dup = store.insert_account(account("alice")).await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));

        store.insert_account(account("Alice")).await.unwrap();
        assert!(store.find_account_by_username("ALICE").await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_delete_account_cascades_to_tasks() {
        let store = MemoryStore::new();
        let alice = store.insert_account(account("alice")).await.unwrap();
        let bob = store.insert_account(account("bob")).await.unwrap();
        let alices = store.insert_task(task_for(alice.id, "a")).await.unwrap();
        let bobs = store.insert_task(task_for(bob.id, "b")).await.unwrap();

        assert!(store.delete_account(alice.id).await.unwrap());
        assert!(!store.delete_account(alice.id).await.unwrap());

        assert!(store.find_task(alices.id).await.unwrap().is_none());
        assert!(store.find_task(bobs.id).await.unwrap().is_some());
        assert!(store.find_account_by_username("alice").await.unwrap().is_none());
        // The username is free again.
        store.insert_account(account("alice")).await.unwrap();
    }

    #[actix_rt::test]
    async fn test_insert_task_requires_existing_owner() {
        let store = MemoryStore::new();
        let result = store.insert_task(task_for(AccountId::new(), "orphan")).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[actix_rt::test]
    async fn test_mutations_are_scoped_by_owner() {
        let store = MemoryStore::new();
        let alice = store.insert_account(account("alice")).await.unwrap();
        let bob = store.insert_account(account("bob")).await.unwrap();
        let task = store.insert_task(task_for(alice.id, "mine")).await.unwrap();

        let patch = TaskPatch {
            is_completed: Some(true),
            ..Default::default()
        };
        assert!(store.update_task(bob.id, task.id, &patch).await.unwrap().is_none());
        assert!(!store.delete_task(bob.id, task.id).await.unwrap());

        let updated = store.update_task(alice.id, task.id, &patch).await.unwrap().unwrap();
        assert!(updated.is_completed);
        assert!(store.delete_task(alice.id, task.id).await.unwrap());
    }
}
