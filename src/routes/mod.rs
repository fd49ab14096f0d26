pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

use crate::error::AppError;

/// Mounts the API under whatever scope the caller provides (`/api` in `main`).
///
/// Body and query extraction failures are rendered as JSON `400`s like every other
/// client error. A task id that is not a UUID cannot name any task, so it gets the
/// same `404` as an unknown one.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(web::PathConfig::default().error_handler(|err, req| {
        log::debug!("unparseable path {}: {}", req.path(), err);
        AppError::NotFound("Task not found".into()).into()
    }))
    .service(
        web::scope("/auth")
            .service(auth::login)
            .service(auth::register)
            .service(auth::delete_account),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    );
}
