//! Compose outbound adapters and domain services into [`HttpState`].

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use resto_backend::domain::ports::{
    ImageStore, MenuItemRepository, NotificationSender, RestaurantRepository, ReviewRepository,
    UserRepository,
};
use resto_backend::domain::{
    AccountPorts, AccountServiceImpl, AuthorizationGuard, MenuPorts, MenuServiceImpl,
    RestaurantPorts, RestaurantServiceImpl, ReviewPorts, ReviewServiceImpl,
};
use resto_backend::inbound::http::health::StorageBackend;
use resto_backend::inbound::http::state::{HttpState, HttpStatePorts};
use resto_backend::outbound::images::LocalImageStore;
use resto_backend::outbound::memory::MemoryStore;
use resto_backend::outbound::notifications::{SmtpNotificationSender, TracingNotificationSender};
use resto_backend::outbound::persistence::{
    DieselMenuItemRepository, DieselRestaurantRepository, DieselReviewRepository,
    DieselUserRepository,
};
use resto_backend::outbound::security::{Argon2PasswordHasher, JwtCredentialIssuer};

use super::config::{ServerConfig, Storage};

struct Repositories {
    users: Arc<dyn UserRepository>,
    restaurants: Arc<dyn RestaurantRepository>,
    menu_items: Arc<dyn MenuItemRepository>,
    reviews: Arc<dyn ReviewRepository>,
}

fn build_repositories(storage: &Storage) -> Repositories {
    match storage {
        Storage::Postgres(pool) => Repositories {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            restaurants: Arc::new(DieselRestaurantRepository::new(pool.clone())),
            menu_items: Arc::new(DieselMenuItemRepository::new(pool.clone())),
            reviews: Arc::new(DieselReviewRepository::new(pool.clone())),
        },
        Storage::Memory => {
            warn!("no database configured; data will not survive a restart");
            let store = MemoryStore::new();
            Repositories {
                users: Arc::new(store.clone()),
                restaurants: Arc::new(store.clone()),
                menu_items: Arc::new(store.clone()),
                reviews: Arc::new(store),
            }
        }
    }
}

fn build_notifier(config: &ServerConfig) -> io::Result<Arc<dyn NotificationSender>> {
    match &config.smtp {
        Some(smtp) => {
            let sender = SmtpNotificationSender::new(smtp)
                .map_err(|err| io::Error::other(format!("SMTP sender: {err}")))?;
            info!(host = %smtp.host, port = smtp.port, "password reset mail via SMTP");
            Ok(Arc::new(sender))
        }
        None => {
            warn!("SMTP not configured; password reset links are only logged");
            Ok(Arc::new(TracingNotificationSender))
        }
    }
}

/// Which backend the readiness probe should report.
pub(crate) fn storage_backend(storage: &Storage) -> StorageBackend {
    match storage {
        Storage::Postgres(_) => StorageBackend::Postgres,
        Storage::Memory => StorageBackend::Memory,
    }
}

/// Wire every port for the HTTP handlers.
///
/// # Errors
/// Returns [`io::Error`] when the image directory cannot be opened, the SMTP
/// sender is misconfigured, or the token secrets are rejected.
pub(crate) fn build_http_state(config: &ServerConfig) -> io::Result<web::Data<HttpState>> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let repos = build_repositories(&config.storage);

    let images: Arc<dyn ImageStore> = Arc::new(
        LocalImageStore::open(&config.image_dir, config.image_base_url.clone())
            .map_err(|err| io::Error::other(format!("image store: {err}")))?,
    );
    let credentials = Arc::new(
        JwtCredentialIssuer::new(&config.auth, clock.clone())
            .map_err(|err| io::Error::other(format!("credential issuer: {err}")))?,
    );
    let notifier = build_notifier(config)?;

    let accounts = AccountServiceImpl::new(
        AccountPorts {
            users: repos.users.clone(),
            images: images.clone(),
            hasher: Arc::new(Argon2PasswordHasher),
            credentials: credentials.clone(),
            notifier,
        },
        clock.clone(),
        config.frontend_url.clone(),
    );
    let restaurants = RestaurantServiceImpl::new(
        RestaurantPorts {
            restaurants: repos.restaurants.clone(),
            menu_items: repos.menu_items.clone(),
            reviews: repos.reviews.clone(),
            users: repos.users.clone(),
            images: images.clone(),
        },
        clock.clone(),
    );
    let menu = MenuServiceImpl::new(
        MenuPorts {
            menu_items: repos.menu_items.clone(),
            restaurants: repos.restaurants.clone(),
            images,
        },
        clock.clone(),
    );
    let reviews = ReviewServiceImpl::new(
        ReviewPorts {
            reviews: repos.reviews,
            restaurants: repos.restaurants,
            menu_items: repos.menu_items,
        },
        clock,
    );
    let authenticator = AuthorizationGuard::new(credentials, repos.users);

    Ok(web::Data::new(HttpState::new(
        HttpStatePorts {
            accounts: Arc::new(accounts),
            restaurants: Arc::new(restaurants),
            menu: Arc::new(menu),
            reviews: Arc::new(reviews),
            authenticator: Arc::new(authenticator),
        },
        config.auth.clone(),
    )))
}
