//! Shared harness for end-to-end HTTP tests over the in-memory store.
//!
//! The app is assembled from the real domain services, JWT issuer, Argon2
//! hasher, and a temporary image directory. Only mail delivery is replaced,
//! by a recorder that keeps the reset links for inspection.

use std::sync::{Arc, Mutex};

use actix_http::Request;
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{App, body::BoxBody, dev::{Service, ServiceResponse}, test as actix_test, web};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use mockable::{Clock, DefaultClock};
use serde_json::{Value, json};
use tempfile::TempDir;

use resto_backend::Trace;
use resto_backend::auth_config::AuthSettings;
use resto_backend::domain::ports::{NotificationError, NotificationSender, PasswordResetNotice};
use resto_backend::domain::{
    AccountPorts, AccountServiceImpl, AuthorizationGuard, MenuPorts, MenuServiceImpl,
    RestaurantPorts, RestaurantServiceImpl, ReviewPorts, ReviewServiceImpl,
};
use resto_backend::inbound::http::cookies::ACCESS_COOKIE;
use resto_backend::inbound::http::routes;
use resto_backend::inbound::http::state::{HttpState, HttpStatePorts};
use resto_backend::outbound::images::LocalImageStore;
use resto_backend::outbound::memory::MemoryStore;
use resto_backend::outbound::security::{Argon2PasswordHasher, JwtCredentialIssuer};

pub const PASSWORD: &str = "Secr3t!pass";

/// Keeps every password-reset notice sent.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<PasswordResetNotice>>,
}

impl RecordingNotifier {
    /// Raw token from the most recent reset link.
    pub fn last_reset_token(&self) -> Option<String> {
        let notices = self.notices.lock().expect("notifier lock");
        notices
            .last()
            .and_then(|notice| notice.reset_url.rsplit('/').next())
            .map(str::to_owned)
    }
}

#[async_trait]
impl NotificationSender for RecordingNotifier {
    async fn send_password_reset(
        &self,
        notice: &PasswordResetNotice,
    ) -> Result<(), NotificationError> {
        self.notices
            .lock()
            .map_err(|_| NotificationError::delivery("poisoned"))?
            .push(notice.clone());
        Ok(())
    }
}

pub struct Harness {
    pub state: web::Data<HttpState>,
    pub mail: Arc<RecordingNotifier>,
    _images: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let images_dir = tempfile::tempdir().expect("image dir");
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let store = MemoryStore::new();
        let users = Arc::new(store.clone());
        let restaurants = Arc::new(store.clone());
        let menu_items = Arc::new(store.clone());
        let reviews = Arc::new(store);
        let images = Arc::new(
            LocalImageStore::open(images_dir.path(), "http://img.test").expect("image store"),
        );
        let auth = AuthSettings::new(vec![3; 32], vec![5; 32]);
        let credentials =
            Arc::new(JwtCredentialIssuer::new(&auth, clock.clone()).expect("issuer"));
        let mail = Arc::new(RecordingNotifier::default());

        let accounts = AccountServiceImpl::new(
            AccountPorts {
                users: users.clone(),
                images: images.clone(),
                hasher: Arc::new(Argon2PasswordHasher),
                credentials: credentials.clone(),
                notifier: mail.clone(),
            },
            clock.clone(),
            "http://front.test",
        );
        let restaurant_service = RestaurantServiceImpl::new(
            RestaurantPorts {
                restaurants: restaurants.clone(),
                menu_items: menu_items.clone(),
                reviews: reviews.clone(),
                users: users.clone(),
                images: images.clone(),
            },
            clock.clone(),
        );
        let menu = MenuServiceImpl::new(
            MenuPorts {
                menu_items: menu_items.clone(),
                restaurants: restaurants.clone(),
                images,
            },
            clock.clone(),
        );
        let review_service = ReviewServiceImpl::new(
            ReviewPorts {
                reviews,
                restaurants,
                menu_items,
            },
            clock,
        );

        let state = HttpState::new(
            HttpStatePorts {
                accounts: Arc::new(accounts),
                restaurants: Arc::new(restaurant_service),
                menu: Arc::new(menu),
                reviews: Arc::new(review_service),
                authenticator: Arc::new(AuthorizationGuard::new(credentials, users)),
            },
            auth.with_cookie_policy(false, actix_web::cookie::SameSite::Lax),
        );

        Self {
            state: web::Data::new(state),
            mail,
            _images: images_dir,
        }
    }

    pub async fn app(
        &self,
    ) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
        actix_test::init_service(
            App::new()
                .app_data(self.state.clone())
                .wrap(Trace)
                .service(web::scope("/api/v1").configure(routes::configure)),
        )
        .await
    }
}

/// Status, parsed body, and the access cookie if one was set.
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
    pub access: Option<Cookie<'static>>,
}

pub async fn send<S>(app: &S, request: actix_test::TestRequest) -> Reply
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let res = actix_test::call_service(app, request.to_request()).await;
    let status = res.status();
    let access = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == ACCESS_COOKIE)
        .map(|cookie| cookie.into_owned());
    let bytes = actix_test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    Reply {
        status,
        body,
        access,
    }
}

/// A tiny PNG-typed payload; content is not inspected beyond its type.
pub fn image_json() -> Value {
    json!({
        "fileName": "pic.png",
        "contentType": "image/png",
        "data": STANDARD.encode([0x89, b'P', b'N', b'G', 1, 2, 3]),
    })
}

/// Register and log in, returning the access cookie and user id.
pub async fn sign_up<S>(app: &S, name: &str, phone: &str) -> (Cookie<'static>, String)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let email = format!("{}@example.com", name.to_lowercase());
    let registered = send(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/users/register")
            .set_json(json!({
                "name": name,
                "email": email,
                "password": PASSWORD,
                "phone": phone,
                "address": "1 High Street",
                "avatar": image_json(),
            })),
    )
    .await;
    assert_eq!(registered.status, StatusCode::CREATED, "{}", registered.body);
    let id = registered.body["data"]["id"]
        .as_str()
        .expect("user id")
        .to_owned();

    let login = send(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/users/login")
            .set_json(json!({"email": email, "password": PASSWORD})),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK, "{}", login.body);
    (login.access.expect("access cookie"), id)
}

/// Create a listing owned by the cookie's user and return its id.
pub async fn open_restaurant<S>(
    app: &S,
    owner: &Cookie<'static>,
    name: &str,
    contact: &str,
) -> String
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let reply = send(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/resto/restaurants")
            .cookie(owner.clone())
            .set_json(json!({
                "name": name,
                "email": format!("{}@resto.test", name.to_lowercase().replace(' ', "-")),
                "contact": contact,
                "address": "2 Market Square",
                "city": "Leeds",
                "postalCode": "LS1 1AA",
                "latitude": 53.8,
                "longitude": -1.55,
                "categories": ["Italian"],
                "openingTime": "09:00",
                "closingTime": "22:00",
                "status": "open",
                "logo": image_json(),
            })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    reply.body["data"]["id"]
        .as_str()
        .expect("restaurant id")
        .to_owned()
}
