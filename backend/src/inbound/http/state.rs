//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::auth_config::AuthSettings;
use crate::domain::ports::{
    AccountService, Authenticator, MenuService, RestaurantService, ReviewService,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountService>,
    pub restaurants: Arc<dyn RestaurantService>,
    pub menu: Arc<dyn MenuService>,
    pub reviews: Arc<dyn ReviewService>,
    pub authenticator: Arc<dyn Authenticator>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountService>,
    pub restaurants: Arc<dyn RestaurantService>,
    pub menu: Arc<dyn MenuService>,
    pub reviews: Arc<dyn ReviewService>,
    pub authenticator: Arc<dyn Authenticator>,
    /// Cookie flags and lifetimes for the token cookies.
    pub auth: AuthSettings,
}

impl HttpState {
    /// Construct state from a ports bundle and the auth cookie policy.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use resto_backend::auth_config::AuthSettings;
    /// use resto_backend::domain::{
    ///     AccountPorts, AccountServiceImpl, AuthorizationGuard, MenuPorts, MenuServiceImpl,
    ///     RestaurantPorts, RestaurantServiceImpl, ReviewPorts, ReviewServiceImpl,
    /// };
    /// use resto_backend::inbound::http::state::{HttpState, HttpStatePorts};
    /// # fn build(
    /// #     accounts: AccountServiceImpl,
    /// #     restaurants: RestaurantServiceImpl,
    /// #     menu: MenuServiceImpl,
    /// #     reviews: ReviewServiceImpl,
    /// #     guard: AuthorizationGuard,
    /// # ) -> HttpState {
    /// let settings = AuthSettings::new(b"access".to_vec(), b"refresh".to_vec());
    /// HttpState::new(
    ///     HttpStatePorts {
    ///         accounts: Arc::new(accounts),
    ///         restaurants: Arc::new(restaurants),
    ///         menu: Arc::new(menu),
    ///         reviews: Arc::new(reviews),
    ///         authenticator: Arc::new(guard),
    ///     },
    ///     settings,
    /// )
    /// # }
    /// ```
    pub fn new(ports: HttpStatePorts, auth: AuthSettings) -> Self {
        let HttpStatePorts {
            accounts,
            restaurants,
            menu,
            reviews,
            authenticator,
        } = ports;
        Self {
            accounts,
            restaurants,
            menu,
            reviews,
            authenticator,
            auth,
        }
    }
}
