use crate::{
    auth::AuthenticatedAccount,
    error::AppError,
    models::{NewTask, TaskPatch, TaskQuery},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;

/// Retrieves the authenticated account's tasks.
///
/// ## Query Parameters:
/// - `priority` (optional): `Low`, `Medium` or `High`.
/// - `completed` (optional): `true` or `false`.
/// - `search` (optional): case-insensitive match against title and description.
///
/// ## Responses:
/// - `200 OK`: JSON array of tasks, newest first.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    query_params: web::Query<TaskQuery>,
    account: AuthenticatedAccount,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list(account.0, &query_params).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the authenticated account.
///
/// ## Responses:
/// - `201 Created`: the new task.
/// - `401 Unauthorized`: missing or invalid token, or the account no longer exists.
/// - `422 Unprocessable Entity`: missing or blank title.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    task_data: web::Json<NewTask>,
    account: AuthenticatedAccount,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.create(account.0, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves one task. `404` if it does not exist or belongs to another account.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    account: AuthenticatedAccount,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.get(account.0, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task. Only the keys present in the body are changed.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `404 Not Found`: no such task for this account.
/// - `422 Unprocessable Entity`: a provided field fails validation.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskPatch>,
    account: AuthenticatedAccount,
) -> Result<impl Responder, AppError> {
    let task = state
        .tasks
        .update(account.0, task_id.into_inner(), task_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task. `204` on success, `404` if no such task for this account.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    account: AuthenticatedAccount,
) -> Result<impl Responder, AppError> {
    state.tasks.delete(account.0, task_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
