//! Restaurant listing API handlers.
//!
//! ```text
//! POST   /api/v1/resto/restaurants                   create (owner or admin)
//! GET    /api/v1/resto/restaurants                   every listed restaurant
//! GET    /api/v1/resto/restaurants/{id}              listing with owner, menu, reviews
//! GET    /api/v1/resto/restaurants/category/{name}
//! GET    /api/v1/resto/restaurants/location/{city}
//! GET    /api/v1/resto/get-open-restos
//! GET    /api/v1/resto/search?q=piz
//! GET    /api/v1/resto/top-rated?limit=5
//! PATCH  /api/v1/resto/update-details/{id}
//! PATCH  /api/v1/resto/update-logo/{id}
//! PATCH  /api/v1/resto/soft-delete/{id}
//! PATCH  /api/v1/resto/restore/{id}
//! DELETE /api/v1/resto/delete/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::RestaurantDetails;
use crate::domain::{
    Error, ImageRef, Restaurant, RestaurantFields, RestaurantFilter, RestaurantId, SearchQuery,
    User,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CurrentUser;
use crate::inbound::http::images::ImagePayload;
use crate::inbound::http::menu_items::MenuItemDto;
use crate::inbound::http::response::{created, ok};
use crate::inbound::http::reviews::ReviewDto;
use crate::inbound::http::schemas::{ErrorSchema, ImageRefSchema, UserSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, require};

const ID: FieldName = FieldName::new("id");
const LOGO: FieldName = FieldName::new("logo");

/// Listing fields as sent by clients; all optional so updates can merge.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantFieldsRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Digits only, 10 to 15 of them.
    pub contact: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub categories: Option<Vec<String>>,
    /// `HH:MM`
    #[schema(example = "09:00")]
    pub opening_time: Option<String>,
    /// `HH:MM`, later than `openingTime`.
    #[schema(example = "22:30")]
    pub closing_time: Option<String>,
    /// `open` or `closed`.
    pub status: Option<String>,
}

impl From<RestaurantFieldsRequest> for RestaurantFields {
    fn from(value: RestaurantFieldsRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            contact: value.contact,
            address: value.address,
            city: value.city,
            postal_code: value.postal_code,
            latitude: value.latitude,
            longitude: value.longitude,
            categories: value.categories,
            opening_time: value.opening_time,
            closing_time: value.closing_time,
            status: value.status,
        }
    }
}

/// Body for `POST /api/v1/resto/restaurants`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestaurantRequest {
    #[serde(flatten)]
    pub fields: RestaurantFieldsRequest,
    pub logo: Option<ImagePayload>,
}

/// Listing as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantDto {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub categories: Vec<String>,
    #[schema(example = "09:00")]
    pub opening_time: String,
    #[schema(example = "22:30")]
    pub closing_time: String,
    #[schema(example = "open")]
    pub status: String,
    #[schema(value_type = ImageRefSchema)]
    pub logo: ImageRef,
    /// Mean review rating, 0 when unreviewed.
    pub rating: f64,
    pub rating_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const TIME_FORMAT: &str = "%H:%M";

impl From<Restaurant> for RestaurantDto {
    fn from(value: Restaurant) -> Self {
        Self {
            id: value.id.to_string(),
            owner_id: value.owner_id.to_string(),
            name: value.name,
            email: value.email.as_ref().to_owned(),
            contact: value.contact.as_ref().to_owned(),
            address: value.address,
            city: value.city,
            postal_code: value.postal_code,
            latitude: value.coordinates.latitude(),
            longitude: value.coordinates.longitude(),
            categories: value.categories.as_slice().to_vec(),
            opening_time: value.hours.opening().format(TIME_FORMAT).to_string(),
            closing_time: value.hours.closing().format(TIME_FORMAT).to_string(),
            status: value.status.as_str().to_owned(),
            logo: value.logo,
            rating: value.rating,
            rating_count: value.rating_count,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// A listing with its owner, menu, and reviews.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantDetailsDto {
    pub restaurant: RestaurantDto,
    /// Absent when the owner account cannot be loaded.
    #[schema(value_type = Option<UserSchema>)]
    pub owner: Option<User>,
    pub menu: Vec<MenuItemDto>,
    pub reviews: Vec<ReviewDto>,
}

impl From<RestaurantDetails> for RestaurantDetailsDto {
    fn from(value: RestaurantDetails) -> Self {
        Self {
            restaurant: value.restaurant.into(),
            owner: value.owner,
            menu: value.menu.into_iter().map(MenuItemDto::from).collect(),
            reviews: value.reviews.into_iter().map(ReviewDto::from).collect(),
        }
    }
}

/// `?q=` for search endpoints.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

impl SearchParams {
    pub(crate) fn into_query(self) -> Result<SearchQuery, Error> {
        let raw = require(self.q, FieldName::new("q"))?;
        SearchQuery::new(&raw).map_err(|err| Error::validation(&err))
    }
}

/// `?limit=` for the top-rated listing.
#[derive(Debug, Deserialize)]
pub struct TopRatedParams {
    pub limit: Option<usize>,
}

fn restaurant_id(path: web::Path<String>) -> Result<RestaurantId, Error> {
    parse_id(&path.into_inner(), ID)
}

async fn list_filtered(state: &HttpState, filter: RestaurantFilter) -> ApiResult<HttpResponse> {
    let restaurants = state.restaurants.list(filter).await?;
    let body: Vec<RestaurantDto> = restaurants.into_iter().map(RestaurantDto::from).collect();
    Ok(ok(body, "Restaurants fetched"))
}

/// Create a listing owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/resto/restaurants",
    request_body = CreateRestaurantRequest,
    responses(
        (status = 201, description = "Listing created", body = RestaurantDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is neither owner nor admin", body = ErrorSchema),
        (status = 409, description = "Contact already used", body = ErrorSchema),
        (status = 502, description = "Logo upload failed", body = ErrorSchema)
    ),
    tags = ["restaurants"],
    operation_id = "createRestaurant"
)]
#[post("/resto/restaurants")]
pub async fn create_restaurant(
    state: web::Data<HttpState>,
    caller: CurrentUser,
    payload: web::Json<CreateRestaurantRequest>,
) -> ApiResult<HttpResponse> {
    let CreateRestaurantRequest { fields, logo } = payload.into_inner();
    let logo = require(logo, LOGO)?.into_upload(LOGO)?;
    let restaurant = state
        .restaurants
        .create(caller.user(), fields.into(), logo)
        .await?;
    Ok(created(RestaurantDto::from(restaurant), "Restaurant created"))
}

/// Every listed restaurant.
#[utoipa::path(
    get,
    path = "/api/v1/resto/restaurants",
    responses((status = 200, description = "Listings", body = [RestaurantDto])),
    tags = ["restaurants"],
    operation_id = "listRestaurants",
    security([])
)]
#[get("/resto/restaurants")]
pub async fn list_restaurants(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    list_filtered(&state, RestaurantFilter::All).await
}

/// Listings carrying a category, case-insensitive.
#[utoipa::path(
    get,
    path = "/api/v1/resto/restaurants/category/{category}",
    params(("category" = String, Path, description = "Category label")),
    responses((status = 200, description = "Listings", body = [RestaurantDto])),
    tags = ["restaurants"],
    operation_id = "restaurantsByCategory",
    security([])
)]
#[get("/resto/restaurants/category/{category}")]
pub async fn by_category(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    list_filtered(&state, RestaurantFilter::Category(path.into_inner())).await
}

/// Listings in a city, case-insensitive.
#[utoipa::path(
    get,
    path = "/api/v1/resto/restaurants/location/{city}",
    params(("city" = String, Path, description = "City name")),
    responses((status = 200, description = "Listings", body = [RestaurantDto])),
    tags = ["restaurants"],
    operation_id = "restaurantsByCity",
    security([])
)]
#[get("/resto/restaurants/location/{city}")]
pub async fn by_city(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    list_filtered(&state, RestaurantFilter::City(path.into_inner())).await
}

/// One listing with its owner, menu, and reviews.
#[utoipa::path(
    get,
    path = "/api/v1/resto/restaurants/{id}",
    params(("id" = String, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Listing", body = RestaurantDetailsDto),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 404, description = "No such listing", body = ErrorSchema)
    ),
    tags = ["restaurants"],
    operation_id = "getRestaurant",
    security([])
)]
#[get("/resto/restaurants/{id}")]
pub async fn get_restaurant(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = restaurant_id(path)?;
    let details = state.restaurants.get(&id).await?;
    Ok(ok(RestaurantDetailsDto::from(details), "Restaurant fetched"))
}

/// Listings whose status is `open`.
#[utoipa::path(
    get,
    path = "/api/v1/resto/get-open-restos",
    responses((status = 200, description = "Listings", body = [RestaurantDto])),
    tags = ["restaurants"],
    operation_id = "openRestaurants",
    security([])
)]
#[get("/resto/get-open-restos")]
pub async fn open_restaurants(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    list_filtered(&state, RestaurantFilter::Open).await
}

/// Name or category substring search.
#[utoipa::path(
    get,
    path = "/api/v1/resto/search",
    params(("q" = String, Query, description = "Case-insensitive needle")),
    responses(
        (status = 200, description = "Listings", body = [RestaurantDto]),
        (status = 400, description = "Missing or blank query", body = ErrorSchema)
    ),
    tags = ["restaurants"],
    operation_id = "searchRestaurants",
    security([])
)]
#[get("/resto/search")]
pub async fn search_restaurants(
    state: web::Data<HttpState>,
    query: web::Query<SearchParams>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner().into_query()?;
    list_filtered(&state, RestaurantFilter::Search(query)).await
}

/// Best rated listings first.
#[utoipa::path(
    get,
    path = "/api/v1/resto/top-rated",
    params(("limit" = Option<usize>, Query, description = "Default 10, clamped to 1..=50")),
    responses((status = 200, description = "Listings", body = [RestaurantDto])),
    tags = ["restaurants"],
    operation_id = "topRatedRestaurants",
    security([])
)]
#[get("/resto/top-rated")]
pub async fn top_rated(
    state: web::Data<HttpState>,
    query: web::Query<TopRatedParams>,
) -> ApiResult<HttpResponse> {
    list_filtered(&state, RestaurantFilter::top_rated(query.limit)).await
}

/// Merge present fields over a listing.
#[utoipa::path(
    patch,
    path = "/api/v1/resto/update-details/{id}",
    params(("id" = String, Path, description = "Restaurant id")),
    request_body = RestaurantFieldsRequest,
    responses(
        (status = 200, description = "Updated listing", body = RestaurantDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "No such listing", body = ErrorSchema)
    ),
    tags = ["restaurants"],
    operation_id = "updateRestaurantDetails"
)]
#[patch("/resto/update-details/{id}")]
pub async fn update_details(
    state: web::Data<HttpState>,
    caller: CurrentUser,
    path: web::Path<String>,
    payload: web::Json<RestaurantFieldsRequest>,
) -> ApiResult<HttpResponse> {
    let id = restaurant_id(path)?;
    let restaurant = state
        .restaurants
        .update_details(caller.user(), &id, payload.into_inner().into())
        .await?;
    Ok(ok(RestaurantDto::from(restaurant), "Restaurant updated"))
}

/// Replace the logo.
#[utoipa::path(
    patch,
    path = "/api/v1/resto/update-logo/{id}",
    params(("id" = String, Path, description = "Restaurant id")),
    request_body = ImagePayload,
    responses(
        (status = 200, description = "Updated listing", body = RestaurantDto),
        (status = 400, description = "Invalid image", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "No such listing", body = ErrorSchema),
        (status = 502, description = "Upload failed", body = ErrorSchema)
    ),
    tags = ["restaurants"],
    operation_id = "updateRestaurantLogo"
)]
#[patch("/resto/update-logo/{id}")]
pub async fn update_logo(
    state: web::Data<HttpState>,
    caller: CurrentUser,
    path: web::Path<String>,
    payload: web::Json<ImagePayload>,
) -> ApiResult<HttpResponse> {
    let id = restaurant_id(path)?;
    let logo = payload.into_inner().into_upload(LOGO)?;
    let restaurant = state
        .restaurants
        .update_logo(caller.user(), &id, logo)
        .await?;
    Ok(ok(RestaurantDto::from(restaurant), "Logo updated"))
}

/// Hide a listing by marking it inactive.
#[utoipa::path(
    patch,
    path = "/api/v1/resto/soft-delete/{id}",
    params(("id" = String, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Listing now inactive", body = RestaurantDto),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "No such listing", body = ErrorSchema)
    ),
    tags = ["restaurants"],
    operation_id = "softDeleteRestaurant"
)]
#[patch("/resto/soft-delete/{id}")]
pub async fn soft_delete(
    state: web::Data<HttpState>,
    caller: CurrentUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = restaurant_id(path)?;
    let restaurant = state.restaurants.soft_delete(caller.user(), &id).await?;
    Ok(ok(RestaurantDto::from(restaurant), "Restaurant deactivated"))
}

/// Bring an inactive listing back as `open`.
#[utoipa::path(
    patch,
    path = "/api/v1/resto/restore/{id}",
    params(("id" = String, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Listing open again", body = RestaurantDto),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "No such listing", body = ErrorSchema)
    ),
    tags = ["restaurants"],
    operation_id = "restoreRestaurant"
)]
#[patch("/resto/restore/{id}")]
pub async fn restore(
    state: web::Data<HttpState>,
    caller: CurrentUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = restaurant_id(path)?;
    let restaurant = state.restaurants.restore(caller.user(), &id).await?;
    Ok(ok(RestaurantDto::from(restaurant), "Restaurant restored"))
}

/// Remove a listing with its menu and reviews.
#[utoipa::path(
    delete,
    path = "/api/v1/resto/delete/{id}",
    params(("id" = String, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Listing removed"),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "No such listing", body = ErrorSchema)
    ),
    tags = ["restaurants"],
    operation_id = "deleteRestaurant"
)]
#[delete("/resto/delete/{id}")]
pub async fn hard_delete(
    state: web::Data<HttpState>,
    caller: CurrentUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = restaurant_id(path)?;
    state.restaurants.hard_delete(caller.user(), &id).await?;
    Ok(ok((), "Restaurant deleted"))
}
