//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::cookie::{Cookie, SameSite};
use actix_web::web;
use mockall::predicate::eq;

use crate::auth_config::AuthSettings;
use crate::domain::User;
use crate::domain::ports::{
    MockAccountService, MockAuthenticator, MockMenuService, MockRestaurantService,
    MockReviewService,
};
use crate::inbound::http::cookies::ACCESS_COOKIE;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Access token accepted by [`MockPorts::sign_in_as`].
pub const ACCESS_TOKEN: &str = "test-access-token";

/// Auth settings for local HTTP tests: insecure `Lax` cookies.
pub fn test_auth_settings() -> AuthSettings {
    AuthSettings::new(b"test-access-secret".to_vec(), b"test-refresh-secret".to_vec())
        .with_cookie_policy(false, SameSite::Lax)
}

/// Cookie presenting [`ACCESS_TOKEN`].
pub fn access_cookie() -> Cookie<'static> {
    Cookie::new(ACCESS_COOKIE, ACCESS_TOKEN)
}

/// One mock per driving port; set expectations, then call [`Self::into_state`].
#[derive(Default)]
pub struct MockPorts {
    pub accounts: MockAccountService,
    pub restaurants: MockRestaurantService,
    pub menu: MockMenuService,
    pub reviews: MockReviewService,
    pub authenticator: MockAuthenticator,
}

impl MockPorts {
    /// Resolve [`ACCESS_TOKEN`] to `user` for any number of requests.
    pub fn sign_in_as(&mut self, user: User) {
        self.authenticator
            .expect_authenticate()
            .with(eq(ACCESS_TOKEN))
            .returning(move |_| Ok(user.clone()));
    }

    /// Wrap the mocks as shared handler state.
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            HttpStatePorts {
                accounts: Arc::new(self.accounts),
                restaurants: Arc::new(self.restaurants),
                menu: Arc::new(self.menu),
                reviews: Arc::new(self.reviews),
                authenticator: Arc::new(self.authenticator),
            },
            test_auth_settings(),
        ))
    }
}
