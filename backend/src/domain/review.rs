//! Reviews of restaurants and menu items.
//!
//! A review targets exactly one subject, expressed as [`ReviewTarget`], and
//! that target is fixed for the life of the review. Edits may change the
//! rating and the text only.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{FieldError, MenuItemId, RestaurantId, ReviewId, UserId};

/// Longest review text, in characters.
pub const REVIEW_TEXT_MAX: usize = 500;
/// Lowest accepted star rating.
pub const RATING_MIN: u8 = 1;
/// Highest accepted star rating.
pub const RATING_MAX: u8 = 5;

/// Validation failures for review input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewValidationError {
    /// Rating outside `1..=5`.
    #[error("rating must be an integer between 1 and 5, got {value}")]
    RatingOutOfRange {
        /// Rejected value.
        value: i64,
    },
    /// Text blank after trimming.
    #[error("review must not be empty")]
    EmptyText,
    /// Text over [`REVIEW_TEXT_MAX`].
    #[error("review must be at most {max} characters")]
    TextTooLong {
        /// Upper bound in characters.
        max: usize,
    },
    /// Neither or both target ids were supplied.
    #[error("exactly one of restaurantId or menuItemId is required")]
    AmbiguousTarget,
    /// An update carried no fields.
    #[error("at least one of rating or review must be provided")]
    EmptyUpdate,
}

impl FieldError for ReviewValidationError {
    fn field(&self) -> Option<&'static str> {
        match self {
            Self::RatingOutOfRange { .. } => Some("rating"),
            Self::EmptyText | Self::TextTooLong { .. } => Some("review"),
            Self::AmbiguousTarget => Some("target"),
            Self::EmptyUpdate => None,
        }
    }
}

/// Subject of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum ReviewTarget {
    /// A restaurant listing.
    Restaurant(RestaurantId),
    /// A dish on a menu.
    MenuItem(MenuItemId),
}

impl ReviewTarget {
    /// Resolve the client's pair of optional ids into one target.
    ///
    /// # Examples
    /// ```
    /// use resto_backend::domain::{RestaurantId, ReviewTarget};
    ///
    /// let id = RestaurantId::random();
    /// assert_eq!(
    ///     ReviewTarget::from_parts(Some(id), None),
    ///     Ok(ReviewTarget::Restaurant(id))
    /// );
    /// assert!(ReviewTarget::from_parts(None, None).is_err());
    /// ```
    pub fn from_parts(
        restaurant: Option<RestaurantId>,
        menu_item: Option<MenuItemId>,
    ) -> Result<Self, ReviewValidationError> {
        match (restaurant, menu_item) {
            (Some(id), None) => Ok(Self::Restaurant(id)),
            (None, Some(id)) => Ok(Self::MenuItem(id)),
            _ => Err(ReviewValidationError::AmbiguousTarget),
        }
    }

    /// Restaurant id, when the target is a restaurant.
    #[must_use]
    pub const fn restaurant_id(&self) -> Option<RestaurantId> {
        match self {
            Self::Restaurant(id) => Some(*id),
            Self::MenuItem(_) => None,
        }
    }

    /// Menu item id, when the target is a menu item.
    #[must_use]
    pub const fn menu_item_id(&self) -> Option<MenuItemId> {
        match self {
            Self::Restaurant(_) => None,
            Self::MenuItem(id) => Some(*id),
        }
    }
}

impl fmt::Display for ReviewTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Restaurant(id) => write!(f, "restaurant {id}"),
            Self::MenuItem(id) => write!(f, "menu item {id}"),
        }
    }
}

/// Star rating in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Validate a raw rating.
    pub fn new(value: i64) -> Result<Self, ReviewValidationError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (RATING_MIN..=RATING_MAX).contains(v))
            .map(Self)
            .ok_or(ReviewValidationError::RatingOutOfRange { value })
    }

    /// Numeric value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = ReviewValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

/// Trimmed, non-blank review body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReviewText(String);

impl ReviewText {
    /// Validate review text.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ReviewValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ReviewValidationError::EmptyText);
        }
        if trimmed.chars().count() > REVIEW_TEXT_MAX {
            return Err(ReviewValidationError::TextTooLong {
                max: REVIEW_TEXT_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ReviewText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ReviewText {
    type Error = ReviewValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ReviewText> for String {
    fn from(value: ReviewText) -> Self {
        value.0
    }
}

/// A user's review of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    /// Stable identifier.
    pub id: ReviewId,
    /// Writer of the review.
    pub author_id: UserId,
    /// Reviewed subject; never changes.
    pub target: ReviewTarget,
    /// Star rating.
    pub rating: Rating,
    /// Review body.
    pub text: ReviewText,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last edit time.
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Build a review timestamped at `now`.
    #[must_use]
    pub fn create(
        id: ReviewId,
        author_id: UserId,
        target: ReviewTarget,
        rating: Rating,
        text: ReviewText,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            author_id,
            target,
            rating,
            text,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Rating and/or text edit; at least one is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewUpdate {
    rating: Option<Rating>,
    text: Option<ReviewText>,
}

impl ReviewUpdate {
    /// Validate raw optional inputs.
    pub fn try_new(
        rating: Option<i64>,
        text: Option<String>,
    ) -> Result<Self, ReviewValidationError> {
        if rating.is_none() && text.is_none() {
            return Err(ReviewValidationError::EmptyUpdate);
        }
        Ok(Self {
            rating: rating.map(Rating::new).transpose()?,
            text: text.map(ReviewText::new).transpose()?,
        })
    }

    /// Merge into `review`. The target is left untouched.
    pub fn apply(self, review: &mut Review, now: DateTime<Utc>) {
        if let Some(rating) = self.rating {
            review.rating = rating;
        }
        if let Some(text) = self.text {
            review.text = text;
        }
        review.updated_at = now;
    }
}
