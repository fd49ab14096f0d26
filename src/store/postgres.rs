use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use super::Store;
use crate::error::AppError;
use crate::models::{Account, AccountId, Task, TaskPatch, TaskQuery};

const TASK_COLUMNS: &str =
    "id, owner_id, title, description, priority, deadline, is_completed, created_at, updated_at";

/// PostgreSQL-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies pending migrations from `migrations/`.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Escapes `LIKE` metacharacters so a search term only ever matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl Store for PgStore {
    async fn insert_account(&self, account: Account) -> Result<Account, AppError> {
        let inserted = sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (id, username, password_hash, created_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, username, password_hash, created_at",
        )
        .bind(account.id)
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(inserted)
    }

    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, username, password_hash, created_at FROM accounts WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn delete_account(&self, id: AccountId) -> Result<bool, AppError> {
        // The FK cascades as well; deleting tasks explicitly keeps the operation
        // self-contained if the constraint is ever relaxed.
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM tasks WHERE owner_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_tasks(&self, owner: AccountId, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        let mut sql = format!("SELECT {} FROM tasks WHERE owner_id = $1", TASK_COLUMNS);
        let mut param_count = 2;

        if query.priority.is_some() {
            sql.push_str(&format!(" AND priority = ${}", param_count));
            param_count += 1;
        }
        if query.completed.is_some() {
            sql.push_str(&format!(" AND is_completed = ${}", param_count));
            param_count += 1;
        }
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty());
        if search.is_some() {
            sql.push_str(&format!(
                " AND (title ILIKE ${0} OR description ILIKE ${0})",
                param_count
            ));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query_builder = sqlx::query_as::<_, Task>(&sql).bind(owner);
        if let Some(priority) = query.priority {
            query_builder = query_builder.bind(priority);
        }
        if let Some(completed) = query.completed {
            query_builder = query_builder.bind(completed);
        }
        if let Some(term) = search {
            query_builder = query_builder.bind(like_pattern(term));
        }

        Ok(query_builder.fetch_all(&self.pool).await?)
    }

    async fn insert_task(&self, task: Task) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks ({0}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {0}",
            TASK_COLUMNS
        );
        let inserted = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(task.owner_id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.priority)
            .bind(task.deadline)
            .bind(task.is_completed)
            .bind(task.created_at)
            .bind(task.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(inserted)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn update_task(
        &self,
        owner: AccountId,
        id: Uuid,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, AppError> {
        // One statement, so concurrent patches interleave per field.
        let sql = format!(
            "UPDATE tasks SET \
                 title = COALESCE($3, title), \
                 description = CASE WHEN $4 THEN $5 ELSE description END, \
                 priority = COALESCE($6, priority), \
                 deadline = CASE WHEN $7 THEN $8 ELSE deadline END, \
                 is_completed = COALESCE($9, is_completed), \
                 updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner)
            .bind(patch.title.as_deref().map(str::trim))
            .bind(patch.description.is_some())
            .bind(patch.description.as_ref().and_then(|d| d.as_deref()))
            .bind(patch.priority)
            .bind(patch.deadline.is_some())
            .bind(patch.deadline.flatten())
            .bind(patch.is_completed)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn delete_task(&self, owner: AccountId, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
