//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every handler under `/api/v1`, the health probes, the
//! request and response DTOs, and the domain schema wrappers from
//! [`crate::inbound::http::schemas`]. Successful responses documented here
//! describe the `data` member; every body is wrapped as
//! `{statusCode, data, message}`.
//!
//! The document backs Swagger UI (debug builds) and the `openapi-dump` binary.

use crate::inbound::http::health::{ReadinessReport, StorageBackend};
use crate::inbound::http::images::ImagePayload;
use crate::inbound::http::menu_items::{
    AddMenuItemRequest, MenuItemDto, MenuItemFieldsRequest,
};
use crate::inbound::http::restaurants::{
    CreateRestaurantRequest, RestaurantDetailsDto, RestaurantDto, RestaurantFieldsRequest,
};
use crate::inbound::http::reviews::{
    CreateReviewRequest, ReviewChangeDto, ReviewDto, TargetRequest, UpdateReviewRequest,
};
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, ImageRefSchema, RatingSummarySchema, RoleSchema, UserSchema,
};
use crate::inbound::http::users::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, ProfileUpdateRequest,
    RefreshRequest, RegisterRequest, ResetPasswordRequest, SessionResponse,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Cookie and bearer schemes for the access token.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "AccessCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "accessToken",
                "Access token cookie set by POST /api/v1/users/login.",
            ))),
        );
        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token in the Authorization header."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Resto backend API",
        description = "Restaurant listings, menus, reviews, and accounts.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("AccessCookie" = []), ("BearerToken" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::refresh,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::update_avatar,
        crate::inbound::http::users::forgot_password,
        crate::inbound::http::users::reset_password,
        crate::inbound::http::users::change_password,
        crate::inbound::http::users::list_users,
        crate::inbound::http::restaurants::create_restaurant,
        crate::inbound::http::restaurants::list_restaurants,
        crate::inbound::http::restaurants::by_category,
        crate::inbound::http::restaurants::by_city,
        crate::inbound::http::restaurants::get_restaurant,
        crate::inbound::http::restaurants::open_restaurants,
        crate::inbound::http::restaurants::search_restaurants,
        crate::inbound::http::restaurants::top_rated,
        crate::inbound::http::restaurants::update_details,
        crate::inbound::http::restaurants::update_logo,
        crate::inbound::http::restaurants::soft_delete,
        crate::inbound::http::restaurants::restore,
        crate::inbound::http::restaurants::hard_delete,
        crate::inbound::http::menu_items::add_item,
        crate::inbound::http::menu_items::remove_item,
        crate::inbound::http::menu_items::view_item,
        crate::inbound::http::menu_items::update_item,
        crate::inbound::http::menu_items::update_item_image,
        crate::inbound::http::menu_items::toggle_item,
        crate::inbound::http::menu_items::list_items,
        crate::inbound::http::menu_items::list_available,
        crate::inbound::http::menu_items::list_categories,
        crate::inbound::http::menu_items::search_items,
        crate::inbound::http::menu_items::sort_and_filter,
        crate::inbound::http::reviews::create_review,
        crate::inbound::http::reviews::update_review,
        crate::inbound::http::reviews::delete_review,
        crate::inbound::http::reviews::restaurant_reviews,
        crate::inbound::http::reviews::menu_item_reviews,
        crate::inbound::http::reviews::my_reviews,
        crate::inbound::http::reviews::recompute_rating,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserSchema,
        RoleSchema,
        ImageRefSchema,
        RatingSummarySchema,
        ImagePayload,
        RegisterRequest,
        LoginRequest,
        RefreshRequest,
        ProfileUpdateRequest,
        ForgotPasswordRequest,
        ResetPasswordRequest,
        ChangePasswordRequest,
        SessionResponse,
        RestaurantFieldsRequest,
        CreateRestaurantRequest,
        RestaurantDto,
        RestaurantDetailsDto,
        MenuItemFieldsRequest,
        AddMenuItemRequest,
        MenuItemDto,
        TargetRequest,
        CreateReviewRequest,
        UpdateReviewRequest,
        ReviewDto,
        ReviewChangeDto,
        ReadinessReport,
        StorageBackend,
    )),
    tags(
        (name = "users", description = "Registration, sessions, and profiles"),
        (name = "restaurants", description = "Restaurant listings"),
        (name = "menu", description = "Menu items of a restaurant"),
        (name = "reviews", description = "Ratings of restaurants and dishes"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn object_fields(name: &str) -> Vec<String> {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.expect("components").schemas;
        match schemas.get(name).unwrap_or_else(|| panic!("{name} schema")) {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected Object schema for {name}"),
        }
    }

    #[rstest]
    #[case("crate.domain.Error", &["statusCode", "code", "message", "traceId", "details"])]
    #[case("crate.domain.User", &["id", "name", "email", "role", "avatar"])]
    #[case("RestaurantDto", &["id", "ownerId", "rating", "ratingCount", "status"])]
    #[case("ReviewDto", &["authorId", "rating", "review"])]
    fn schemas_expose_wire_field_names(#[case] name: &str, #[case] fields: &[&str]) {
        let present = object_fields(name);
        for field in fields {
            assert!(present.iter().any(|p| p == field), "{name} lacks {field}");
        }
    }

    #[test]
    fn every_route_family_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/users/register",
            "/api/v1/resto/restaurants/{id}",
            "/api/v1/resto-menu/sort-filter/{restoId}",
            "/api/v1/review/fetch/my",
            "/health/ready",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn public_listings_opt_out_of_security() {
        let doc = ApiDoc::openapi();
        let listing = doc
            .paths
            .paths
            .get("/api/v1/resto/restaurants/{id}")
            .and_then(|item| item.get.as_ref())
            .expect("get restaurant operation");
        assert_eq!(listing.security.as_ref().map(Vec::len), Some(1));
    }
}
