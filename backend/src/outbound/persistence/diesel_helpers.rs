//! Query fragments shared by the listing and catalog repositories.
//!
//! Category labels live in a `TEXT[]` column, which Diesel's DSL cannot
//! unnest, so the array predicates are written as bound SQL fragments.

use diesel::dsl::sql;
use diesel::expression::BoxableExpression;
use diesel::pg::Pg;
use diesel::sql_types::{Bool, Text};

use super::schema::restaurants;

diesel::define_sql_function! {
    /// SQL `lower(text)`, matching the `restaurants_city_idx` index.
    fn lower(value: Text) -> Text;
}

pub(super) type RestaurantPredicate =
    Box<dyn BoxableExpression<restaurants::table, Pg, SqlType = Bool>>;

/// Escape `needle` for `ILIKE` and wrap it for substring matching.
pub(super) fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Listings carrying `label`, compared case-insensitively.
pub(super) fn has_category(label: &str) -> RestaurantPredicate {
    Box::new(
        sql::<Bool>(
            "EXISTS (SELECT 1 FROM unnest(restaurants.categories) AS label WHERE lower(label) = ",
        )
        .bind::<Text, _>(label.trim().to_lowercase())
        .sql(")"),
    )
}

/// Listings whose name or any category matches an `ILIKE` pattern.
pub(super) fn name_or_category_like(pattern: &str) -> RestaurantPredicate {
    Box::new(
        sql::<Bool>("(restaurants.name ILIKE ")
            .bind::<Text, _>(pattern.to_owned())
            .sql(
                " OR EXISTS (SELECT 1 FROM unnest(restaurants.categories) AS label \
                 WHERE label ILIKE ",
            )
            .bind::<Text, _>(pattern.to_owned())
            .sql("))"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::debug_query;
    use diesel::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("piz", "%piz%")]
    #[case("100%", "%100\\%%")]
    #[case("a_b", "%a\\_b%")]
    fn like_patterns_escape_wildcards(#[case] needle: &str, #[case] expected: &str) {
        assert_eq!(like_pattern(needle), expected);
    }

    #[rstest]
    fn category_predicate_binds_the_lowercased_label() {
        let query = restaurants::table
            .select(restaurants::id)
            .filter(has_category("  Italian "));
        let rendered = debug_query::<Pg, _>(&query).to_string();

        assert!(rendered.contains("unnest(restaurants.categories)"), "{rendered}");
        assert!(rendered.contains("\"italian\""), "{rendered}");
    }

    #[rstest]
    fn city_comparison_uses_lower() {
        let query = restaurants::table
            .select(restaurants::id)
            .filter(lower(restaurants::city).eq("york"));
        let rendered = debug_query::<Pg, _>(&query).to_string();

        assert!(rendered.contains("lower(\"restaurants\".\"city\")"), "{rendered}");
    }
}
