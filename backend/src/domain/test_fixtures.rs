//! Shared builders for domain unit tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    EmailAddress, ImageRef, ImageUpload, MenuItem, MenuItemFields, MenuItemId, NewMenuItem,
    NewRestaurant, PersonName, PhoneNumber, Rating, Restaurant, RestaurantFields, RestaurantId,
    Review, ReviewId, ReviewTarget, ReviewText, Role, User, UserAccount, UserId,
};

pub(crate) fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 24, 10, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Clock frozen at [`fixture_now`] until advanced.
pub(crate) struct FixtureClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixtureClock {
    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock lock");
        *now += by;
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

pub(crate) fn fixture_clock() -> Arc<FixtureClock> {
    Arc::new(FixtureClock {
        now: Mutex::new(fixture_now()),
    })
}

pub(crate) fn fixture_image(name: &str) -> ImageRef {
    ImageRef {
        id: name.to_owned(),
        url: format!("http://localhost:8080/images/{name}"),
    }
}

pub(crate) fn fixture_upload() -> ImageUpload {
    ImageUpload::new("photo.png", "image/png", vec![0x89, b'P', b'N', b'G'])
        .expect("valid upload")
}

pub(crate) fn fixture_user(role: Role) -> User {
    let id = UserId::random();
    User {
        id,
        name: PersonName::new("Ada Lovelace").expect("valid name"),
        email: EmailAddress::new(format!("ada-{id}@example.com")).expect("valid email"),
        phone: PhoneNumber::new("447700900123").expect("valid phone"),
        address: "1 Analytical Row, London".to_owned(),
        avatar: fixture_image("avatar.png"),
        role,
        created_at: fixture_now(),
        updated_at: fixture_now(),
    }
}

pub(crate) fn fixture_account(user: User) -> UserAccount {
    UserAccount {
        user,
        password_hash: "$argon2id$fixture".to_owned(),
        refresh_token: None,
        password_reset: None,
    }
}

pub(crate) fn restaurant_fields() -> RestaurantFields {
    RestaurantFields {
        name: Some("Le Petit Zinc".to_owned()),
        email: Some("bonjour@petitzinc.fr".to_owned()),
        contact: Some("0142968000".to_owned()),
        address: Some("11 Rue Saint-Benoît".to_owned()),
        city: Some("Paris".to_owned()),
        postal_code: Some("75006".to_owned()),
        latitude: Some(48.8546),
        longitude: Some(2.3332),
        categories: Some(vec!["French".to_owned(), "Bistro".to_owned()]),
        opening_time: Some("09:00".to_owned()),
        closing_time: Some("22:00".to_owned()),
        status: Some("open".to_owned()),
    }
}

pub(crate) fn fixture_restaurant(owner: UserId) -> Restaurant {
    let draft = NewRestaurant::try_from(restaurant_fields()).expect("valid fixture fields");
    Restaurant::create(
        RestaurantId::random(),
        owner,
        draft,
        fixture_image("logo.png"),
        fixture_now(),
    )
}

pub(crate) fn menu_item_fields(name: &str, category: &str) -> MenuItemFields {
    MenuItemFields {
        name: Some(name.to_owned()),
        description: Some("House speciality".to_owned()),
        price: Some(14.5),
        category: Some(category.to_owned()),
        is_available: None,
    }
}

pub(crate) fn fixture_menu_item(restaurant: RestaurantId, name: &str, category: &str) -> MenuItem {
    let draft =
        NewMenuItem::try_from(menu_item_fields(name, category)).expect("valid fixture item");
    MenuItem::create(
        MenuItemId::random(),
        restaurant,
        draft,
        fixture_image("dish.png"),
        fixture_now(),
    )
}

pub(crate) fn fixture_review(author: UserId, target: ReviewTarget, rating: i64) -> Review {
    Review::create(
        ReviewId::random(),
        author,
        target,
        Rating::new(rating).expect("valid rating"),
        ReviewText::new("Lovely").expect("valid text"),
        fixture_now(),
    )
}
