use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::error::AppError;
use crate::state::AppState;

/// Paths under the guarded scope that are reachable without a token.
const PUBLIC_PATHS: [&str; 2] = ["/api/auth/login", "/api/auth/register"];

/// Verifies the bearer token on every request it wraps and stores the resolved
/// account id in request extensions for [`super::AuthenticatedAccount`].
///
/// Rejections are rendered here as a uniform 401 response.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn authenticate(req: &ServiceRequest) -> Result<crate::models::AccountId, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::InternalServerError("AppState not registered".into()))?;
    let token = bearer_token(req).ok_or_else(|| AppError::Unauthorized("Missing token".into()))?;
    state.sessions.verify(token)
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if PUBLIC_PATHS.contains(&req.path()) {
            let fut = self.service.call(req);
            return Box::pin(async move { Ok(fut.await?.map_into_left_body()) });
        }

        match authenticate(&req) {
            Ok(account_id) => {
                req.extensions_mut().insert(account_id);
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            Err(app_err) => {
                log::debug!("{} {} rejected: {}", req.method(), req.path(), app_err);
                let response = app_err.error_response();
                Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedAccount;
    use crate::models::AccountId;
    use crate::store::MemoryStore;
    use actix_web::{get, http::StatusCode, test, App, HttpResponse, Responder};
    use std::sync::Arc;

    #[get("/api/whoami")]
    async fn whoami(account: AuthenticatedAccount) -> impl Responder {
        HttpResponse::Ok().body(account.0.to_string())
    }

    #[get("/api/auth/login")]
    async fn open() -> impl Responder {
        HttpResponse::Ok().finish()
    }

    async fn state() -> web::Data<AppState> {
        web::Data::new(
            AppState::with_secret(Arc::new(MemoryStore::new()), b"middleware-secret", 4)
                .await
                .unwrap(),
        )
    }

    #[actix_rt::test]
    async fn test_valid_token_reaches_handler() {
        let state = state().await;
        let account_id = AccountId::new();
        let token = state.sessions.issue(account_id).unwrap().token;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .wrap(AuthMiddleware)
                .service(whoami),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/whoami")
            .append_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, account_id.to_string().as_bytes());
    }

    #[actix_rt::test]
    async fn test_missing_or_bad_token_is_401() {
        let state = state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .wrap(AuthMiddleware)
                .service(whoami),
        )
        .await;

        for header in [None, Some("Bearer "), Some("Bearer garbage"), Some("Token abc")] {
            let mut req = test::TestRequest::get().uri("/api/whoami");
            if let Some(value) = header {
                req = req.append_header(("Authorization", value));
            }
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "header {:?}", header);
        }
    }

    #[actix_rt::test]
    async fn test_public_paths_skip_verification() {
        let state = state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .wrap(AuthMiddleware)
                .service(open),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/auth/login").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
