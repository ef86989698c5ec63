//! Caller authentication for HTTP handlers.
//!
//! Handlers that need a signed-in user take [`CurrentUser`] as an argument.
//! The extractor reads the access token from the `accessToken` cookie, falling
//! back to an `Authorization: Bearer` header, and resolves it through the
//! [`Authenticator`](crate::domain::ports::Authenticator) port.

use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, User};
use crate::inbound::http::cookies::ACCESS_COOKIE;
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// Borrow the caller's profile.
    pub fn user(&self) -> &User {
        &self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}

/// Access token carried by the request, cookie first.
pub(crate) fn access_token(req: &HttpRequest) -> Option<String> {
    req.cookie(ACCESS_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .filter(|token| !token.is_empty())
        .or_else(|| bearer_token(req))
}

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = access_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let state =
                state.ok_or_else(|| Error::internal("HTTP state is not registered"))?;
            let token = token.ok_or_else(|| Error::unauthorized("login required"))?;
            state.authenticator.authenticate(&token).await.map(Self)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::domain::test_fixtures::fixture_user;
    use crate::inbound::http::test_utils::{ACCESS_TOKEN, MockPorts};
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test};
    use rstest::rstest;

    async fn whoami(caller: CurrentUser) -> Result<HttpResponse, Error> {
        Ok(HttpResponse::Ok().body(caller.user().id.to_string()))
    }

    #[rstest]
    #[case::cookie(actix_test::TestRequest::get().cookie(Cookie::new(ACCESS_COOKIE, ACCESS_TOKEN)))]
    #[case::bearer(
        actix_test::TestRequest::get()
            .insert_header((header::AUTHORIZATION, format!("Bearer {ACCESS_TOKEN}")))
    )]
    #[actix_web::test]
    async fn resolves_the_caller_from_either_transport(#[case] request: actix_test::TestRequest) {
        let user = fixture_user(Role::User);
        let mut ports = MockPorts::default();
        ports.sign_in_as(user.clone());
        let app = actix_test::init_service(
            App::new()
                .app_data(ports.into_state())
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let res = actix_test::call_service(&app, request.uri("/me").to_request()).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = actix_test::read_body(res).await;
        assert_eq!(body, user.id.to_string());
    }

    #[actix_web::test]
    async fn missing_token_is_unauthorized() {
        let app = actix_test::init_service(
            App::new()
                .app_data(MockPorts::default().into_state())
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/me").to_request()).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn rejected_token_is_unauthorized() {
        let mut ports = MockPorts::default();
        ports
            .authenticator
            .expect_authenticate()
            .returning(|_| Err(Error::unauthorized("token expired")));
        let app = actix_test::init_service(
            App::new()
                .app_data(ports.into_state())
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/me")
            .insert_header((header::AUTHORIZATION, "Bearer stale"))
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = actix_test::read_body_json(res).await;
        assert_eq!(body["code"], serde_json::json!("unauthorized"));
    }

    #[rstest]
    #[case("Basic abc")]
    #[case("Bearer ")]
    fn malformed_authorization_headers_are_ignored(#[case] value: &str) {
        let req = actix_test::TestRequest::get()
            .insert_header((header::AUTHORIZATION, value))
            .to_http_request();
        assert_eq!(access_token(&req), None);
    }
}
