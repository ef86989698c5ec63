//! Restaurant listings: validated fields, the lifecycle state machine, and
//! the optional-field merge used by partial updates.
//!
//! A listing moves between `open` and `closed` freely. Soft deletion parks it
//! in `inactive`, which only [`Restaurant::restore`] leaves (back to `open`).
//! Clients may never request `inactive` directly.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    ContactValidationError, EmailAddress, FieldError, ImageRef, PhoneNumber, RestaurantId,
    SearchQuery, UserId,
};

/// Longest restaurant name, in characters.
pub const RESTAURANT_NAME_MAX: usize = 120;
/// Longest free-text location field, in characters.
pub const LOCATION_FIELD_MAX: usize = 200;
/// Longest category label, in characters.
pub const CATEGORY_MAX: usize = 50;
/// Default size of the top-rated listing.
pub const TOP_RATED_DEFAULT: usize = 10;
/// Largest top-rated listing a client may request.
pub const TOP_RATED_MAX: usize = 50;

/// Validation failures for listing fields.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RestaurantValidationError {
    /// A field required at creation was absent.
    #[error("{field} is required")]
    MissingField {
        /// Wire name of the field.
        field: &'static str,
    },
    /// A text field was blank after trimming.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Wire name of the field.
        field: &'static str,
    },
    /// A text field exceeded its limit.
    #[error("{field} must be at most {max} characters")]
    FieldTooLong {
        /// Wire name of the field.
        field: &'static str,
        /// Upper bound in characters.
        max: usize,
    },
    /// Email or contact failed validation.
    #[error("{field}: {source}")]
    Contact {
        /// Wire name of the field.
        field: &'static str,
        /// Underlying contact error.
        #[source]
        source: ContactValidationError,
    },
    /// Latitude outside [-90, 90].
    #[error("latitude must be between -90 and 90, got {value}")]
    LatitudeOutOfRange {
        /// Rejected value.
        value: f64,
    },
    /// Longitude outside [-180, 180].
    #[error("longitude must be between -180 and 180, got {value}")]
    LongitudeOutOfRange {
        /// Rejected value.
        value: f64,
    },
    /// A time was not `HH:MM`.
    #[error("{field} must be a time formatted HH:MM, got {value}")]
    InvalidTime {
        /// Wire name of the field.
        field: &'static str,
        /// Rejected value.
        value: String,
    },
    /// Opening time was not strictly before closing time.
    #[error("openingTime must be earlier than closingTime")]
    HoursOutOfOrder,
    /// The category list was empty.
    #[error("at least one category is required")]
    NoCategories,
    /// The status label was not recognised.
    #[error("status must be one of open or closed, got {value}")]
    InvalidStatus {
        /// Rejected value.
        value: String,
    },
    /// `inactive` was requested, or an inactive listing was edited back to
    /// `open` or `closed` without restoring it.
    #[error("status {status} is managed through soft delete and restore")]
    StatusNotAllowed {
        /// Requested status.
        status: RestaurantStatus,
    },
    /// An update carried no fields.
    #[error("at least one field must be provided")]
    EmptyUpdate,
}

impl FieldError for RestaurantValidationError {
    fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { field }
            | Self::EmptyField { field }
            | Self::FieldTooLong { field, .. }
            | Self::Contact { field, .. }
            | Self::InvalidTime { field, .. } => Some(field),
            Self::LatitudeOutOfRange { .. } => Some("latitude"),
            Self::LongitudeOutOfRange { .. } => Some("longitude"),
            Self::HoursOutOfOrder => Some("openingTime"),
            Self::NoCategories => Some("categories"),
            Self::InvalidStatus { .. } | Self::StatusNotAllowed { .. } => Some("status"),
            Self::EmptyUpdate => None,
        }
    }
}

/// Listing lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestaurantStatus {
    /// Accepting customers.
    Open,
    /// Temporarily closed.
    Closed,
    /// Soft-deleted; hidden from listings until restored.
    Inactive,
}

impl RestaurantStatus {
    /// Stable textual form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Inactive => "inactive",
        }
    }

    /// Parse a status a client may request directly (`open` or `closed`).
    pub fn requestable(raw: &str) -> Result<Self, RestaurantValidationError> {
        let status = raw.parse::<Self>()?;
        if status == Self::Inactive {
            return Err(RestaurantValidationError::StatusNotAllowed { status });
        }
        Ok(status)
    }
}

impl fmt::Display for RestaurantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RestaurantStatus {
    type Err = RestaurantValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "inactive" => Ok(Self::Inactive),
            _ => Err(RestaurantValidationError::InvalidStatus {
                value: s.to_owned(),
            }),
        }
    }
}

/// Geographic position with both ends of each range inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validate a latitude/longitude pair.
    ///
    /// # Examples
    /// ```
    /// use resto_backend::domain::Coordinates;
    ///
    /// assert!(Coordinates::new(90.0, 180.0).is_ok());
    /// assert!(Coordinates::new(91.0, 0.0).is_err());
    /// ```
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, RestaurantValidationError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(RestaurantValidationError::LatitudeOutOfRange { value: latitude });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(RestaurantValidationError::LongitudeOutOfRange { value: longitude });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Degrees north.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Degrees east.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Daily opening window; opening strictly precedes closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingHours {
    opening: NaiveTime,
    closing: NaiveTime,
}

impl OperatingHours {
    /// Validate the ordering of an opening window.
    pub fn new(opening: NaiveTime, closing: NaiveTime) -> Result<Self, RestaurantValidationError> {
        if opening >= closing {
            return Err(RestaurantValidationError::HoursOutOfOrder);
        }
        Ok(Self { opening, closing })
    }

    /// Parse `HH:MM` (seconds optional) for the named field.
    pub fn parse_time(field: &'static str, raw: &str) -> Result<NaiveTime, RestaurantValidationError> {
        let trimmed = raw.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .map_err(|_| RestaurantValidationError::InvalidTime {
                field,
                value: raw.to_owned(),
            })
    }

    /// Time the restaurant opens.
    #[must_use]
    pub const fn opening(&self) -> NaiveTime {
        self.opening
    }

    /// Time the restaurant closes.
    #[must_use]
    pub const fn closing(&self) -> NaiveTime {
        self.closing
    }
}

/// Non-empty, de-duplicated category labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Categories(Vec<String>);

impl Categories {
    /// Trim labels, drop case-insensitive duplicates, and require at least one.
    pub fn new(raw: Vec<String>) -> Result<Self, RestaurantValidationError> {
        let mut labels: Vec<String> = Vec::with_capacity(raw.len());
        for label in raw {
            let trimmed = text_field("categories", &label, CATEGORY_MAX)?;
            if !labels.iter().any(|seen| seen.eq_ignore_ascii_case(&trimmed)) {
                labels.push(trimmed);
            }
        }
        if labels.is_empty() {
            return Err(RestaurantValidationError::NoCategories);
        }
        Ok(Self(labels))
    }

    /// Case-insensitive membership test.
    #[must_use]
    pub fn contains(&self, category: &str) -> bool {
        self.0.iter().any(|label| label.eq_ignore_ascii_case(category.trim()))
    }

    /// Labels in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

fn text_field(
    field: &'static str,
    raw: &str,
    max: usize,
) -> Result<String, RestaurantValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RestaurantValidationError::EmptyField { field });
    }
    if trimmed.chars().count() > max {
        return Err(RestaurantValidationError::FieldTooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, RestaurantValidationError> {
    value.ok_or(RestaurantValidationError::MissingField { field })
}

fn email_field(raw: &str) -> Result<EmailAddress, RestaurantValidationError> {
    EmailAddress::new(raw).map_err(|source| RestaurantValidationError::Contact {
        field: "email",
        source,
    })
}

fn contact_field(raw: &str) -> Result<PhoneNumber, RestaurantValidationError> {
    PhoneNumber::new(raw).map_err(|source| RestaurantValidationError::Contact {
        field: "contact",
        source,
    })
}

/// Raw listing fields as supplied by a client.
///
/// Creation requires every field; updates merge whichever are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestaurantFields {
    /// Display name.
    pub name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Digits-only contact number.
    pub contact: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// Degrees north.
    pub latitude: Option<f64>,
    /// Degrees east.
    pub longitude: Option<f64>,
    /// Category labels.
    pub categories: Option<Vec<String>>,
    /// `HH:MM` opening time.
    pub opening_time: Option<String>,
    /// `HH:MM` closing time.
    pub closing_time: Option<String>,
    /// `open` or `closed`.
    pub status: Option<String>,
}

impl RestaurantFields {
    /// True when no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Validated fields for a listing about to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRestaurant {
    name: String,
    email: EmailAddress,
    contact: PhoneNumber,
    address: String,
    city: String,
    postal_code: String,
    coordinates: Coordinates,
    categories: Categories,
    hours: OperatingHours,
    status: RestaurantStatus,
}

impl NewRestaurant {
    /// Contact number, used for the uniqueness check.
    #[must_use]
    pub fn contact(&self) -> &PhoneNumber {
        &self.contact
    }
}

impl TryFrom<RestaurantFields> for NewRestaurant {
    type Error = RestaurantValidationError;

    fn try_from(fields: RestaurantFields) -> Result<Self, Self::Error> {
        let name = text_field("name", &required("name", fields.name)?, RESTAURANT_NAME_MAX)?;
        let email = email_field(&required("email", fields.email)?)?;
        let contact = contact_field(&required("contact", fields.contact)?)?;
        let address = text_field(
            "address",
            &required("address", fields.address)?,
            LOCATION_FIELD_MAX,
        )?;
        let city = text_field("city", &required("city", fields.city)?, LOCATION_FIELD_MAX)?;
        let postal_code = text_field(
            "postalCode",
            &required("postalCode", fields.postal_code)?,
            LOCATION_FIELD_MAX,
        )?;
        let coordinates = Coordinates::new(
            required("latitude", fields.latitude)?,
            required("longitude", fields.longitude)?,
        )?;
        let categories = Categories::new(required("categories", fields.categories)?)?;
        let opening =
            OperatingHours::parse_time("openingTime", &required("openingTime", fields.opening_time)?)?;
        let closing =
            OperatingHours::parse_time("closingTime", &required("closingTime", fields.closing_time)?)?;
        let hours = OperatingHours::new(opening, closing)?;
        let status = RestaurantStatus::requestable(&required("status", fields.status)?)?;

        Ok(Self {
            name,
            email,
            contact,
            address,
            city,
            postal_code,
            coordinates,
            categories,
            hours,
            status,
        })
    }
}

/// A restaurant listing owned by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Restaurant {
    /// Stable identifier.
    pub id: RestaurantId,
    /// Owning account.
    pub owner_id: UserId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: EmailAddress,
    /// Digits-only contact number; unique across listings.
    pub contact: PhoneNumber,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Postal code.
    pub postal_code: String,
    /// Geographic position.
    pub coordinates: Coordinates,
    /// Category labels.
    pub categories: Categories,
    /// Daily opening window.
    pub hours: OperatingHours,
    /// Lifecycle state.
    pub status: RestaurantStatus,
    /// Logo image.
    pub logo: ImageRef,
    /// Mean review rating; 0 when unreviewed.
    pub rating: f64,
    /// Number of reviews behind `rating`.
    pub rating_count: u32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Restaurant {
    /// Materialise a freshly validated listing with an empty rating.
    #[must_use]
    pub fn create(
        id: RestaurantId,
        owner_id: UserId,
        draft: NewRestaurant,
        logo: ImageRef,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            name: draft.name,
            email: draft.email,
            contact: draft.contact,
            address: draft.address,
            city: draft.city,
            postal_code: draft.postal_code,
            coordinates: draft.coordinates,
            categories: draft.categories,
            hours: draft.hours,
            status: draft.status,
            logo,
            rating: 0.0,
            rating_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge the present fields over this listing and re-validate the result.
    ///
    /// Absent fields are left untouched; nothing can be cleared by omission.
    pub fn apply_update(
        &self,
        fields: RestaurantFields,
        now: DateTime<Utc>,
    ) -> Result<Self, RestaurantValidationError> {
        if fields.is_empty() {
            return Err(RestaurantValidationError::EmptyUpdate);
        }
        let mut next = self.clone();
        if let Some(name) = fields.name {
            next.name = text_field("name", &name, RESTAURANT_NAME_MAX)?;
        }
        if let Some(email) = fields.email {
            next.email = email_field(&email)?;
        }
        if let Some(contact) = fields.contact {
            next.contact = contact_field(&contact)?;
        }
        if let Some(address) = fields.address {
            next.address = text_field("address", &address, LOCATION_FIELD_MAX)?;
        }
        if let Some(city) = fields.city {
            next.city = text_field("city", &city, LOCATION_FIELD_MAX)?;
        }
        if let Some(postal_code) = fields.postal_code {
            next.postal_code = text_field("postalCode", &postal_code, LOCATION_FIELD_MAX)?;
        }
        if fields.latitude.is_some() || fields.longitude.is_some() {
            next.coordinates = Coordinates::new(
                fields.latitude.unwrap_or(self.coordinates.latitude()),
                fields.longitude.unwrap_or(self.coordinates.longitude()),
            )?;
        }
        if let Some(categories) = fields.categories {
            next.categories = Categories::new(categories)?;
        }
        if fields.opening_time.is_some() || fields.closing_time.is_some() {
            let opening = match fields.opening_time {
                Some(raw) => OperatingHours::parse_time("openingTime", &raw)?,
                None => self.hours.opening(),
            };
            let closing = match fields.closing_time {
                Some(raw) => OperatingHours::parse_time("closingTime", &raw)?,
                None => self.hours.closing(),
            };
            next.hours = OperatingHours::new(opening, closing)?;
        }
        if let Some(status) = fields.status {
            let requested = RestaurantStatus::requestable(&status)?;
            if self.status == RestaurantStatus::Inactive {
                return Err(RestaurantValidationError::StatusNotAllowed { status: requested });
            }
            next.status = requested;
        }
        next.updated_at = now;
        Ok(next)
    }

    /// Park the listing in `inactive`.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        self.status = RestaurantStatus::Inactive;
        self.updated_at = now;
    }

    /// Bring the listing back to `open`.
    pub fn restore(&mut self, now: DateTime<Utc>) {
        self.status = RestaurantStatus::Open;
        self.updated_at = now;
    }

    /// Whether the listing appears in public listings.
    #[must_use]
    pub fn is_listed(&self) -> bool {
        self.status != RestaurantStatus::Inactive
    }

    /// Case-insensitive substring match on name or any category.
    #[must_use]
    pub fn matches(&self, query: &SearchQuery) -> bool {
        self.name.to_lowercase().contains(query.as_str())
            || self
                .categories
                .as_slice()
                .iter()
                .any(|label| label.to_lowercase().contains(query.as_str()))
    }
}

/// Public listing queries. Inactive listings never match any of them.
#[derive(Debug, Clone, PartialEq)]
pub enum RestaurantFilter {
    /// Every listed restaurant.
    All,
    /// Restaurants carrying the category (case-insensitive).
    Category(String),
    /// Restaurants in the city (case-insensitive equality).
    City(String),
    /// Restaurants whose status is `open`.
    Open,
    /// Name or category substring match.
    Search(SearchQuery),
    /// Best rated first, at most this many.
    TopRated(usize),
}

impl RestaurantFilter {
    /// Top-rated filter with the limit defaulted and clamped to `1..=50`.
    #[must_use]
    pub fn top_rated(limit: Option<usize>) -> Self {
        Self::TopRated(limit.unwrap_or(TOP_RATED_DEFAULT).clamp(1, TOP_RATED_MAX))
    }

    /// Whether `restaurant` belongs in the result.
    #[must_use]
    pub fn admits(&self, restaurant: &Restaurant) -> bool {
        if !restaurant.is_listed() {
            return false;
        }
        match self {
            Self::All | Self::TopRated(_) => true,
            Self::Category(category) => restaurant.categories.contains(category),
            Self::City(city) => restaurant.city.to_lowercase() == city.trim().to_lowercase(),
            Self::Open => restaurant.status == RestaurantStatus::Open,
            Self::Search(query) => restaurant.matches(query),
        }
    }

    /// Filter and order a candidate set.
    ///
    /// Results are oldest first, except for the top-rated query which orders by
    /// rating, then review count, both descending.
    #[must_use]
    pub fn apply(&self, candidates: Vec<Restaurant>) -> Vec<Restaurant> {
        let mut selected: Vec<Restaurant> =
            candidates.into_iter().filter(|r| self.admits(r)).collect();
        match self {
            Self::TopRated(limit) => {
                selected.sort_by(|a, b| {
                    b.rating
                        .total_cmp(&a.rating)
                        .then(b.rating_count.cmp(&a.rating_count))
                });
                selected.truncate(*limit);
            }
            _ => selected.sort_by_key(|r| r.created_at),
        }
        selected
    }
}
