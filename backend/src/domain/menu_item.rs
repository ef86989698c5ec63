//! Menu items attached to a restaurant, plus the search, filter, and sort
//! rules applied to a restaurant's menu.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{FieldError, ImageRef, MenuItemId, RestaurantId};

/// Longest item name, in characters.
pub const ITEM_NAME_MAX: usize = 120;
/// Longest item description, in characters.
pub const DESCRIPTION_MAX: usize = 500;
/// Longest item category, in characters.
pub const ITEM_CATEGORY_MAX: usize = 50;

/// Validation failures for menu item fields and menu queries.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MenuItemValidationError {
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
    /// A price was negative or not finite.
    #[error("{field} must be a non-negative number, got {value}")]
    InvalidPrice {
        /// Wire name of the field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// `minPrice` exceeded `maxPrice`.
    #[error("minPrice must not exceed maxPrice")]
    InvertedPriceRange,
    /// The sort key was not recognised.
    #[error("sortBy must be one of price_asc, price_desc, rating_desc, newest; got {value}")]
    UnknownSort {
        /// Rejected value.
        value: String,
    },
    /// An update carried no fields.
    #[error("at least one field must be provided")]
    EmptyUpdate,
}

impl FieldError for MenuItemValidationError {
    fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { field }
            | Self::EmptyField { field }
            | Self::FieldTooLong { field, .. }
            | Self::InvalidPrice { field, .. } => Some(field),
            Self::InvertedPriceRange => Some("minPrice"),
            Self::UnknownSort { .. } => Some("sortBy"),
            Self::EmptyUpdate => None,
        }
    }
}

fn text_field(
    field: &'static str,
    raw: &str,
    max: usize,
) -> Result<String, MenuItemValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MenuItemValidationError::EmptyField { field });
    }
    if trimmed.chars().count() > max {
        return Err(MenuItemValidationError::FieldTooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

fn price_field(field: &'static str, value: f64) -> Result<f64, MenuItemValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(MenuItemValidationError::InvalidPrice { field, value })
    }
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, MenuItemValidationError> {
    value.ok_or(MenuItemValidationError::MissingField { field })
}

/// Raw item fields as supplied by a client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuItemFields {
    /// Dish name.
    pub name: Option<String>,
    /// Dish description.
    pub description: Option<String>,
    /// Price; must be non-negative.
    pub price: Option<f64>,
    /// Category label.
    pub category: Option<String>,
    /// Availability; only honoured on update.
    pub is_available: Option<bool>,
}

impl MenuItemFields {
    /// True when no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Validated fields for a new item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMenuItem {
    name: String,
    description: String,
    price: f64,
    category: String,
}

impl TryFrom<MenuItemFields> for NewMenuItem {
    type Error = MenuItemValidationError;

    fn try_from(fields: MenuItemFields) -> Result<Self, Self::Error> {
        Ok(Self {
            name: text_field("name", &required("name", fields.name)?, ITEM_NAME_MAX)?,
            description: text_field(
                "description",
                &required("description", fields.description)?,
                DESCRIPTION_MAX,
            )?,
            price: price_field("price", required("price", fields.price)?)?,
            category: text_field(
                "category",
                &required("category", fields.category)?,
                ITEM_CATEGORY_MAX,
            )?,
        })
    }
}

/// A dish on a restaurant's menu.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    /// Stable identifier.
    pub id: MenuItemId,
    /// Restaurant whose menu holds the item.
    pub restaurant_id: RestaurantId,
    /// Dish name.
    pub name: String,
    /// Dish description.
    pub description: String,
    /// Non-negative price.
    pub price: f64,
    /// Category label.
    pub category: String,
    /// Whether the dish can currently be ordered.
    pub is_available: bool,
    /// Dish photo.
    pub image: ImageRef,
    /// Mean review rating; 0 when unreviewed.
    pub rating: f64,
    /// Number of reviews behind `rating`.
    pub rating_count: u32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    /// Materialise a validated item; new items are available and unrated.
    #[must_use]
    pub fn create(
        id: MenuItemId,
        restaurant_id: RestaurantId,
        draft: NewMenuItem,
        image: ImageRef,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            restaurant_id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            category: draft.category,
            is_available: true,
            image,
            rating: 0.0,
            rating_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge present fields over this item.
    pub fn apply_update(
        &self,
        fields: MenuItemFields,
        now: DateTime<Utc>,
    ) -> Result<Self, MenuItemValidationError> {
        if fields.is_empty() {
            return Err(MenuItemValidationError::EmptyUpdate);
        }
        let mut next = self.clone();
        if let Some(name) = fields.name {
            next.name = text_field("name", &name, ITEM_NAME_MAX)?;
        }
        if let Some(description) = fields.description {
            next.description = text_field("description", &description, DESCRIPTION_MAX)?;
        }
        if let Some(price) = fields.price {
            next.price = price_field("price", price)?;
        }
        if let Some(category) = fields.category {
            next.category = text_field("category", &category, ITEM_CATEGORY_MAX)?;
        }
        if let Some(is_available) = fields.is_available {
            next.is_available = is_available;
        }
        next.updated_at = now;
        Ok(next)
    }

    /// Flip availability.
    pub fn toggle_availability(&mut self, now: DateTime<Utc>) {
        self.is_available = !self.is_available;
        self.updated_at = now;
    }

    /// Case-insensitive substring match on name or category.
    #[must_use]
    pub fn matches(&self, query: &SearchQuery) -> bool {
        self.name.to_lowercase().contains(query.as_str())
            || self.category.to_lowercase().contains(query.as_str())
    }
}

/// Lower-cased, non-blank search needle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Normalise a raw query.
    pub fn new(raw: &str) -> Result<Self, MenuItemValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MenuItemValidationError::EmptyField { field: "q" });
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Needle text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Ordering applied by [`MenuQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuSort {
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Best rated first.
    RatingDesc,
    /// Most recently added first.
    #[default]
    Newest,
}

impl FromStr for MenuSort {
    type Err = MenuItemValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "rating_desc" => Ok(Self::RatingDesc),
            "newest" | "created_at_desc" => Ok(Self::Newest),
            _ => Err(MenuItemValidationError::UnknownSort {
                value: s.to_owned(),
            }),
        }
    }
}

/// Conjunctive filter plus ordering over one restaurant's menu.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuQuery {
    sort: MenuSort,
    category: Option<String>,
    min_price: Option<f64>,
    max_price: Option<f64>,
}

impl MenuQuery {
    /// Validate the price bounds and normalise the category.
    ///
    /// # Examples
    /// ```
    /// use resto_backend::domain::{MenuQuery, MenuSort};
    ///
    /// assert!(MenuQuery::new(MenuSort::PriceDesc, None, Some(10.0), Some(20.0)).is_ok());
    /// assert!(MenuQuery::new(MenuSort::PriceDesc, None, Some(20.0), Some(10.0)).is_err());
    /// ```
    pub fn new(
        sort: MenuSort,
        category: Option<String>,
        min_price: Option<f64>,
        max_price: Option<f64>,
    ) -> Result<Self, MenuItemValidationError> {
        let min_price = min_price.map(|v| price_field("minPrice", v)).transpose()?;
        let max_price = max_price.map(|v| price_field("maxPrice", v)).transpose()?;
        if let (Some(min), Some(max)) = (min_price, max_price) {
            if min > max {
                return Err(MenuItemValidationError::InvertedPriceRange);
            }
        }
        let category = category
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty());
        Ok(Self {
            sort,
            category,
            min_price,
            max_price,
        })
    }

    fn admits(&self, item: &MenuItem) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|category| item.category.eq_ignore_ascii_case(category));
        let min_ok = self.min_price.is_none_or(|min| item.price >= min);
        let max_ok = self.max_price.is_none_or(|max| item.price <= max);
        category_ok && min_ok && max_ok
    }

    fn compare(&self, a: &MenuItem, b: &MenuItem) -> Ordering {
        match self.sort {
            MenuSort::PriceAsc => a.price.total_cmp(&b.price),
            MenuSort::PriceDesc => b.price.total_cmp(&a.price),
            MenuSort::RatingDesc => b.rating.total_cmp(&a.rating),
            MenuSort::Newest => b.created_at.cmp(&a.created_at),
        }
    }

    /// Keep matching items and order them; ties keep their input order.
    #[must_use]
    pub fn apply(&self, items: Vec<MenuItem>) -> Vec<MenuItem> {
        let mut selected: Vec<MenuItem> = items.into_iter().filter(|i| self.admits(i)).collect();
        selected.sort_by(|a, b| self.compare(a, b));
        selected
    }
}

/// Distinct categories across `items`, sorted.
#[must_use]
pub fn distinct_categories(items: &[MenuItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_fixtures::{fixture_menu_item, fixture_now};
    use chrono::Duration;
    use rstest::rstest;

    fn priced(prices: &[f64]) -> Vec<MenuItem> {
        let restaurant = RestaurantId::random();
        prices
            .iter()
            .enumerate()
            .map(|(index, price)| {
                let mut item = fixture_menu_item(restaurant, &format!("Dish {index}"), "Mains");
                item.price = *price;
                item
            })
            .collect()
    }

    #[rstest]
    fn price_window_with_descending_sort() {
        let query = MenuQuery::new(MenuSort::PriceDesc, None, Some(10.0), Some(20.0))
            .expect("valid query");
        let prices: Vec<f64> = query
            .apply(priced(&[5.0, 12.0, 18.0, 25.0]))
            .iter()
            .map(|item| item.price)
            .collect();
        assert_eq!(prices, vec![18.0, 12.0]);
    }

    #[rstest]
    fn category_filter_is_conjunctive_with_price() {
        let restaurant = RestaurantId::random();
        let mut cheap_pizza = fixture_menu_item(restaurant, "Marinara", "Pizza");
        cheap_pizza.price = 8.0;
        let mut pricey_pizza = fixture_menu_item(restaurant, "Tartufo", "Pizza");
        pricey_pizza.price = 24.0;
        let mut pasta = fixture_menu_item(restaurant, "Carbonara", "Pasta");
        pasta.price = 12.0;

        let query = MenuQuery::new(MenuSort::PriceAsc, Some("pizza".to_owned()), None, Some(15.0))
            .expect("valid query");
        let names: Vec<String> = query
            .apply(vec![cheap_pizza, pricey_pizza, pasta])
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, vec!["Marinara".to_owned()]);
    }

    #[rstest]
    fn default_sort_is_newest_first() {
        let restaurant = RestaurantId::random();
        let older = fixture_menu_item(restaurant, "Old", "Mains");
        let mut newer = fixture_menu_item(restaurant, "New", "Mains");
        newer.created_at = fixture_now() + Duration::minutes(1);

        let ordered = MenuQuery::default().apply(vec![older, newer]);
        assert_eq!(ordered.first().map(|i| i.name.as_str()), Some("New"));
    }

    #[rstest]
    fn rating_sort_puts_best_first() {
        let mut items = priced(&[1.0, 2.0]);
        if let Some(item) = items.get_mut(1) {
            item.rating = 4.5;
        }
        let query = MenuQuery::new(MenuSort::RatingDesc, None, None, None).expect("valid query");
        let ordered = query.apply(items);
        assert_eq!(ordered.first().map(|i| i.rating), Some(4.5));
    }

    #[rstest]
    #[case(Some(20.0), Some(10.0), MenuItemValidationError::InvertedPriceRange)]
    #[case(Some(-1.0), None, MenuItemValidationError::InvalidPrice { field: "minPrice", value: -1.0 })]
    fn rejects_bad_price_bounds(
        #[case] min: Option<f64>,
        #[case] max: Option<f64>,
        #[case] expected: MenuItemValidationError,
    ) {
        assert_eq!(MenuQuery::new(MenuSort::Newest, None, min, max), Err(expected));
    }

    #[rstest]
    #[case("price_asc", MenuSort::PriceAsc)]
    #[case("PRICE_DESC", MenuSort::PriceDesc)]
    #[case("rating_desc", MenuSort::RatingDesc)]
    #[case("newest", MenuSort::Newest)]
    fn parses_sort_keys(#[case] raw: &str, #[case] expected: MenuSort) {
        assert_eq!(raw.parse::<MenuSort>(), Ok(expected));
    }

    #[rstest]
    fn search_matches_name_or_category_case_insensitively() {
        let restaurant = RestaurantId::random();
        let by_name = fixture_menu_item(restaurant, "Margherita Pizza", "Mains");
        let by_category = fixture_menu_item(restaurant, "Calzone", "Pizza");
        let unrelated = fixture_menu_item(restaurant, "Tiramisu", "Dessert");
        let query = SearchQuery::new("PIZ").expect("valid query");

        assert!(by_name.matches(&query));
        assert!(by_category.matches(&query));
        assert!(!unrelated.matches(&query));
    }

    #[rstest]
    fn blank_search_is_rejected() {
        assert!(SearchQuery::new("  ").is_err());
    }

    #[rstest]
    fn description_limit_is_enforced() {
        let fields = MenuItemFields {
            name: Some("Soup".to_owned()),
            description: Some("x".repeat(DESCRIPTION_MAX + 1)),
            price: Some(4.0),
            category: Some("Starters".to_owned()),
            is_available: None,
        };
        assert_eq!(
            NewMenuItem::try_from(fields),
            Err(MenuItemValidationError::FieldTooLong {
                field: "description",
                max: DESCRIPTION_MAX,
            })
        );
    }

    #[rstest]
    fn negative_price_is_rejected() {
        let item = fixture_menu_item(RestaurantId::random(), "Soup", "Starters");
        let result = item.apply_update(
            MenuItemFields {
                price: Some(-0.5),
                ..MenuItemFields::default()
            },
            fixture_now(),
        );
        assert!(matches!(
            result,
            Err(MenuItemValidationError::InvalidPrice { .. })
        ));
    }

    #[rstest]
    fn zero_price_is_allowed() {
        let item = fixture_menu_item(RestaurantId::random(), "Water", "Drinks");
        let updated = item
            .apply_update(
                MenuItemFields {
                    price: Some(0.0),
                    ..MenuItemFields::default()
                },
                fixture_now(),
            )
            .expect("free items are valid");
        assert_eq!(updated.price, 0.0);
    }

    #[rstest]
    fn toggling_flips_availability() {
        let mut item = fixture_menu_item(RestaurantId::random(), "Soup", "Starters");
        assert!(item.is_available);
        item.toggle_availability(fixture_now());
        assert!(!item.is_available);
    }

    #[rstest]
    fn categories_are_distinct_and_sorted() {
        let restaurant = RestaurantId::random();
        let items = vec![
            fixture_menu_item(restaurant, "A", "Pizza"),
            fixture_menu_item(restaurant, "B", "Dessert"),
            fixture_menu_item(restaurant, "C", "Pizza"),
        ];
        assert_eq!(
            distinct_categories(&items),
            vec!["Dessert".to_owned(), "Pizza".to_owned()]
        );
    }
}
