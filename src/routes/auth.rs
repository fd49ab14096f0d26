use crate::{
    auth::{AuthResponse, AuthenticatedAccount, LoginRequest, RegisterRequest},
    error::AppError,
    models::AccountView,
    state::AppState,
};
use actix_web::{delete, post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new account
///
/// ## Responses:
/// - `201 Created`: the public view of the new account.
/// - `409 Conflict`: the username is taken.
/// - `422 Unprocessable Entity`: username or password fails validation.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let account = state
        .credentials
        .register(&register_data.username, &register_data.password)
        .await?;

    Ok(HttpResponse::Created().json(AccountView::from(&account)))
}

/// Login
///
/// Verifies the credentials and returns a bearer token. Unknown usernames and wrong
/// passwords produce the same `400` response.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let account = state
        .credentials
        .verify(&login_data.username, &login_data.password)
        .await
        .map_err(|e| match e {
            AppError::NotFound(_) | AppError::InvalidCredentials => {
                log::debug!("login failed for {:?}: {}", login_data.username, e);
                AppError::InvalidCredentials
            }
            other => other,
        })?;

    let issued = state.sessions.issue(account.id)?;
    Ok(HttpResponse::Ok().json(AuthResponse {
        token: issued.token,
        account_id: account.id,
        expires_at: issued.expires_at,
    }))
}

/// Delete the authenticated account
///
/// Removes the account and all of its tasks. Outstanding tokens stay
/// cryptographically valid until they expire but no longer reach any data.
#[delete("/account")]
pub async fn delete_account(
    state: web::Data<AppState>,
    account: AuthenticatedAccount,
) -> Result<impl Responder, AppError> {
    state.credentials.delete(account.0).await?;
    Ok(HttpResponse::NoContent().finish())
}
