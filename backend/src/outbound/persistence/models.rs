//! Internal Diesel row structs and their conversions to domain aggregates.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions from rows re-run domain
//! validation so a corrupt row surfaces as a query error instead of an
//! invalid aggregate.

use chrono::{DateTime, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Categories, Coordinates, EmailAddress, ImageRef, MenuItem, MenuItemId, OperatingHours,
    PasswordResetToken, PersonName, PhoneNumber, Rating, Restaurant, RestaurantId,
    RestaurantStatus, Review, ReviewId, ReviewTarget, ReviewText, Role, TokenDigest, User,
    UserAccount, UserId,
};

use super::schema::{menu_items, restaurants, reviews, users};

fn count_from_db(raw: i32) -> Result<u32, String> {
    u32::try_from(raw).map_err(|_| format!("negative rating count {raw}"))
}

pub(super) fn count_for_db(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub avatar_id: String,
    pub avatar_url: String,
    pub role: String,
    pub password_hash: String,
    pub refresh_token_digest: Option<String>,
    pub reset_token_digest: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<Role>().map_err(|err| err.to_string())?;
        let password_reset = match (row.reset_token_digest, row.reset_token_expires_at) {
            (Some(digest), Some(expires_at)) => Some(PasswordResetToken {
                digest: TokenDigest::from_stored(digest),
                expires_at,
            }),
            _ => None,
        };
        let user = User {
            id: UserId::from_uuid(row.id),
            name: PersonName::new(&row.name).map_err(|err| err.to_string())?,
            email: EmailAddress::new(&row.email).map_err(|err| err.to_string())?,
            phone: PhoneNumber::new(&row.phone).map_err(|err| err.to_string())?,
            address: row.address,
            avatar: ImageRef {
                id: row.avatar_id,
                url: row.avatar_url,
            },
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };
        Ok(Self {
            user,
            password_hash: row.password_hash,
            refresh_token: row.refresh_token_digest.map(TokenDigest::from_stored),
            password_reset,
        })
    }
}

/// Insertable and changeset view of an account. `None` clears nullable
/// token columns.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserWrite<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub address: &'a str,
    pub avatar_id: &'a str,
    pub avatar_url: &'a str,
    pub role: &'a str,
    pub password_hash: &'a str,
    pub refresh_token_digest: Option<&'a str>,
    pub reset_token_digest: Option<&'a str>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a UserAccount> for UserWrite<'a> {
    fn from(account: &'a UserAccount) -> Self {
        let user = &account.user;
        Self {
            id: *user.id.as_uuid(),
            name: user.name.as_ref(),
            email: user.email.as_ref(),
            phone: user.phone.as_ref(),
            address: &user.address,
            avatar_id: &user.avatar.id,
            avatar_url: &user.avatar.url,
            role: user.role.as_str(),
            password_hash: &account.password_hash,
            refresh_token_digest: account.refresh_token.as_ref().map(AsRef::as_ref),
            reset_token_digest: account
                .password_reset
                .as_ref()
                .map(|reset| reset.digest.as_ref()),
            reset_token_expires_at: account.password_reset.as_ref().map(|reset| reset.expires_at),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Restaurants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = restaurants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RestaurantRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub categories: Vec<String>,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub status: String,
    pub logo_id: String,
    pub logo_url: String,
    pub rating: f64,
    pub rating_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RestaurantRow> for Restaurant {
    type Error = String;

    fn try_from(row: RestaurantRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RestaurantId::from_uuid(row.id),
            owner_id: UserId::from_uuid(row.owner_id),
            name: row.name,
            email: EmailAddress::new(&row.email).map_err(|err| err.to_string())?,
            contact: PhoneNumber::new(&row.contact).map_err(|err| err.to_string())?,
            address: row.address,
            city: row.city,
            postal_code: row.postal_code,
            coordinates: Coordinates::new(row.latitude, row.longitude)
                .map_err(|err| err.to_string())?,
            categories: Categories::new(row.categories).map_err(|err| err.to_string())?,
            hours: OperatingHours::new(row.opening_time, row.closing_time)
                .map_err(|err| err.to_string())?,
            status: row
                .status
                .parse::<RestaurantStatus>()
                .map_err(|err| err.to_string())?,
            logo: ImageRef {
                id: row.logo_id,
                url: row.logo_url,
            },
            rating: row.rating,
            rating_count: count_from_db(row.rating_count)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = restaurants)]
pub(crate) struct NewRestaurantRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[diesel(embed)]
    pub details: RestaurantChangeset<'a>,
    pub rating: f64,
    pub rating_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Every mutable listing column except the rating aggregate.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = restaurants)]
pub(crate) struct RestaurantChangeset<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub contact: &'a str,
    pub address: &'a str,
    pub city: &'a str,
    pub postal_code: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub categories: &'a [String],
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub status: &'a str,
    pub logo_id: &'a str,
    pub logo_url: &'a str,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Restaurant> for RestaurantChangeset<'a> {
    fn from(restaurant: &'a Restaurant) -> Self {
        Self {
            name: &restaurant.name,
            email: restaurant.email.as_ref(),
            contact: restaurant.contact.as_ref(),
            address: &restaurant.address,
            city: &restaurant.city,
            postal_code: &restaurant.postal_code,
            latitude: restaurant.coordinates.latitude(),
            longitude: restaurant.coordinates.longitude(),
            categories: restaurant.categories.as_slice(),
            opening_time: restaurant.hours.opening(),
            closing_time: restaurant.hours.closing(),
            status: restaurant.status.as_str(),
            logo_id: &restaurant.logo.id,
            logo_url: &restaurant.logo.url,
            updated_at: restaurant.updated_at,
        }
    }
}

impl<'a> From<&'a Restaurant> for NewRestaurantRow<'a> {
    fn from(restaurant: &'a Restaurant) -> Self {
        Self {
            id: *restaurant.id.as_uuid(),
            owner_id: *restaurant.owner_id.as_uuid(),
            details: RestaurantChangeset::from(restaurant),
            rating: restaurant.rating,
            rating_count: count_for_db(restaurant.rating_count),
            created_at: restaurant.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Menu items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = menu_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MenuItemRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub is_available: bool,
    pub image_id: String,
    pub image_url: String,
    pub rating: f64,
    pub rating_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<MenuItemRow> for MenuItem {
    type Error = String;

    fn try_from(row: MenuItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MenuItemId::from_uuid(row.id),
            restaurant_id: RestaurantId::from_uuid(row.restaurant_id),
            name: row.name,
            description: row.description,
            price: row.price,
            category: row.category,
            is_available: row.is_available,
            image: ImageRef {
                id: row.image_id,
                url: row.image_url,
            },
            rating: row.rating,
            rating_count: count_from_db(row.rating_count)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = menu_items)]
pub(crate) struct NewMenuItemRow<'a> {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    #[diesel(embed)]
    pub details: MenuItemChangeset<'a>,
    pub rating: f64,
    pub rating_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Every mutable menu item column except the rating aggregate.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = menu_items)]
pub(crate) struct MenuItemChangeset<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub price: f64,
    pub category: &'a str,
    pub is_available: bool,
    pub image_id: &'a str,
    pub image_url: &'a str,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a MenuItem> for MenuItemChangeset<'a> {
    fn from(item: &'a MenuItem) -> Self {
        Self {
            name: &item.name,
            description: &item.description,
            price: item.price,
            category: &item.category,
            is_available: item.is_available,
            image_id: &item.image.id,
            image_url: &item.image.url,
            updated_at: item.updated_at,
        }
    }
}

impl<'a> From<&'a MenuItem> for NewMenuItemRow<'a> {
    fn from(item: &'a MenuItem) -> Self {
        Self {
            id: *item.id.as_uuid(),
            restaurant_id: *item.restaurant_id.as_uuid(),
            details: MenuItemChangeset::from(item),
            rating: item.rating,
            rating_count: count_for_db(item.rating_count),
            created_at: item.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub restaurant_id: Option<Uuid>,
    pub menu_item_id: Option<Uuid>,
    pub rating: i16,
    pub review: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = String;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let target = ReviewTarget::from_parts(
            row.restaurant_id.map(RestaurantId::from_uuid),
            row.menu_item_id.map(MenuItemId::from_uuid),
        )
        .map_err(|err| err.to_string())?;
        Ok(Self {
            id: ReviewId::from_uuid(row.id),
            author_id: UserId::from_uuid(row.author_id),
            target,
            rating: Rating::new(i64::from(row.rating)).map_err(|err| err.to_string())?,
            text: ReviewText::new(&row.review).map_err(|err| err.to_string())?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reviews)]
pub(crate) struct NewReviewRow<'a> {
    pub id: Uuid,
    pub author_id: Uuid,
    pub restaurant_id: Option<Uuid>,
    pub menu_item_id: Option<Uuid>,
    pub rating: i16,
    pub review: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Review> for NewReviewRow<'a> {
    fn from(review: &'a Review) -> Self {
        Self {
            id: *review.id.as_uuid(),
            author_id: *review.author_id.as_uuid(),
            restaurant_id: review.target.restaurant_id().map(|id| *id.as_uuid()),
            menu_item_id: review.target.menu_item_id().map(|id| *id.as_uuid()),
            rating: i16::from(review.rating.value()),
            review: review.text.as_ref(),
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

/// Editable review columns; the target is immutable.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = reviews)]
pub(crate) struct ReviewChangeset<'a> {
    pub rating: i16,
    pub review: &'a str,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Review> for ReviewChangeset<'a> {
    fn from(review: &'a Review) -> Self {
        Self {
            rating: i16::from(review.rating.value()),
            review: review.text.as_ref(),
            updated_at: review.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_fixtures::{
        fixture_account, fixture_restaurant, fixture_review, fixture_user,
    };
    use rstest::rstest;

    fn stored_user_row(account: &UserAccount) -> UserRow {
        let write = UserWrite::from(account);
        UserRow {
            id: write.id,
            name: write.name.to_owned(),
            email: write.email.to_owned(),
            phone: write.phone.to_owned(),
            address: write.address.to_owned(),
            avatar_id: write.avatar_id.to_owned(),
            avatar_url: write.avatar_url.to_owned(),
            role: write.role.to_owned(),
            password_hash: write.password_hash.to_owned(),
            refresh_token_digest: write.refresh_token_digest.map(str::to_owned),
            reset_token_digest: write.reset_token_digest.map(str::to_owned),
            reset_token_expires_at: write.reset_token_expires_at,
            created_at: write.created_at,
            updated_at: write.updated_at,
        }
    }

    #[rstest]
    fn user_rows_restore_credential_material() {
        let mut account = fixture_account(fixture_user(Role::RestaurantOwner));
        account.refresh_token = Some(TokenDigest::of("refresh"));
        account.password_reset = Some(PasswordResetToken {
            digest: TokenDigest::of("reset"),
            expires_at: account.user.created_at,
        });

        let restored = UserAccount::try_from(stored_user_row(&account)).expect("valid row");
        assert_eq!(restored, account);
    }

    #[rstest]
    fn unknown_role_is_a_conversion_error() {
        let account = fixture_account(fixture_user(Role::User));
        let mut row = stored_user_row(&account);
        row.role = "SUPERUSER".to_owned();
        assert!(UserAccount::try_from(row).is_err());
    }

    #[rstest]
    fn review_rows_need_exactly_one_target() {
        let review = fixture_review(
            UserId::random(),
            ReviewTarget::Restaurant(RestaurantId::random()),
            4,
        );
        let write = NewReviewRow::from(&review);
        assert!(write.menu_item_id.is_none());
        let row = ReviewRow {
            id: write.id,
            author_id: write.author_id,
            restaurant_id: write.restaurant_id,
            menu_item_id: Some(Uuid::new_v4()),
            rating: write.rating,
            review: write.review.to_owned(),
            created_at: write.created_at,
            updated_at: write.updated_at,
        };
        assert!(Review::try_from(row).is_err());
    }

    #[rstest]
    fn restaurant_changeset_leaves_rating_to_the_aggregator() {
        let restaurant = fixture_restaurant(UserId::random());
        let row = NewRestaurantRow::from(&restaurant);
        assert_eq!(row.rating_count, 0);
        assert_eq!(row.details.categories, restaurant.categories.as_slice());
        assert_eq!(row.details.status, "open");
    }
}
