use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::AccountId;

/// The identity resolved from the request's bearer token.
///
/// Intended for routes behind `AuthMiddleware`, which verifies the token and inserts
/// the account id into request extensions. If it is absent the extractor fails with
/// `AppError::Unauthorized`.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedAccount(pub AccountId);

impl FromRequest for AuthenticatedAccount {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AccountId>().copied() {
            Some(account_id) => ready(Ok(AuthenticatedAccount(account_id))),
            None => {
                let err = AppError::Unauthorized("No authenticated account on request".to_string());
                ready(Err(err.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::Payload;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_rt::test]
    async fn test_authenticated_account_extractor_success() {
        let account_id = AccountId::new();
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(account_id);

        let mut payload = Payload::None;
        let extracted = AuthenticatedAccount::from_request(&req, &mut payload).await;
        assert_eq!(extracted.unwrap().0, account_id);
    }

    #[actix_rt::test]
    async fn test_authenticated_account_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let extracted = AuthenticatedAccount::from_request(&req, &mut payload).await;

        let err = extracted.unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }
}
