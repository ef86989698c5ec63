//! Menu API handlers.
//!
//! ```text
//! POST   /api/v1/resto-menu/add-item/{restoId}
//! DELETE /api/v1/resto-menu/delete-item/{restoId}/{itemId}
//! GET    /api/v1/resto-menu/view-item/{itemId}
//! PATCH  /api/v1/resto-menu/menu-item/update/{itemId}
//! PATCH  /api/v1/resto-menu/menu-item/update-logo/{itemId}
//! PATCH  /api/v1/resto-menu/menu-item/toggle/{itemId}
//! GET    /api/v1/resto-menu/menu-items/{restoId}
//! GET    /api/v1/resto-menu/items-available/{restoId}
//! GET    /api/v1/resto-menu/categories/{restoId}
//! GET    /api/v1/resto-menu/search?q=piz
//! GET    /api/v1/resto-menu/sort-filter/{restoId}?sortBy=price_desc&minPrice=10&maxPrice=20
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Error, ImageRef, MenuItem, MenuItemFields, MenuItemId, MenuQuery, MenuSort, RestaurantId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CurrentUser;
use crate::inbound::http::images::ImagePayload;
use crate::inbound::http::response::{created, ok};
use crate::inbound::http::restaurants::SearchParams;
use crate::inbound::http::schemas::{ErrorSchema, ImageRefSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, require};

const RESTO_ID: FieldName = FieldName::new("restoId");
const ITEM_ID: FieldName = FieldName::new("itemId");
const IMAGE: FieldName = FieldName::new("image");

/// Item fields as sent by clients; all optional so updates can merge.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemFieldsRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(example = 12.5)]
    pub price: Option<f64>,
    pub category: Option<String>,
    /// Ignored on creation; new items start available.
    pub is_available: Option<bool>,
}

impl From<MenuItemFieldsRequest> for MenuItemFields {
    fn from(value: MenuItemFieldsRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
            price: value.price,
            category: value.category,
            is_available: value.is_available,
        }
    }
}

/// Body for `POST /api/v1/resto-menu/add-item/{restoId}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMenuItemRequest {
    #[serde(flatten)]
    pub fields: MenuItemFieldsRequest,
    pub image: Option<ImagePayload>,
}

/// Menu item as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemDto {
    pub id: String,
    pub restaurant_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub is_available: bool,
    #[schema(value_type = ImageRefSchema)]
    pub image: ImageRef,
    pub rating: f64,
    pub rating_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MenuItem> for MenuItemDto {
    fn from(value: MenuItem) -> Self {
        Self {
            id: value.id.to_string(),
            restaurant_id: value.restaurant_id.to_string(),
            name: value.name,
            description: value.description,
            price: value.price,
            category: value.category,
            is_available: value.is_available,
            image: value.image,
            rating: value.rating,
            rating_count: value.rating_count,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Query string for the sort-and-filter endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortFilterParams {
    pub sort_by: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl SortFilterParams {
    fn into_query(self) -> Result<MenuQuery, Error> {
        let sort = match self.sort_by.as_deref() {
            Some(raw) => raw.parse::<MenuSort>().map_err(|err| Error::validation(&err))?,
            None => MenuSort::default(),
        };
        MenuQuery::new(sort, self.category, self.min_price, self.max_price)
            .map_err(|err| Error::validation(&err))
    }
}

fn items_body(items: Vec<MenuItem>) -> Vec<MenuItemDto> {
    items.into_iter().map(MenuItemDto::from).collect()
}

/// Add an item to a restaurant's menu.
#[utoipa::path(
    post,
    path = "/api/v1/resto-menu/add-item/{restoId}",
    params(("restoId" = String, Path, description = "Restaurant id")),
    request_body = AddMenuItemRequest,
    responses(
        (status = 201, description = "Item added", body = MenuItemDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not the restaurant owner", body = ErrorSchema),
        (status = 404, description = "No such restaurant", body = ErrorSchema),
        (status = 409, description = "Name already on this menu", body = ErrorSchema),
        (status = 502, description = "Image upload failed", body = ErrorSchema)
    ),
    tags = ["menu"],
    operation_id = "addMenuItem"
)]
#[post("/resto-menu/add-item/{restoId}")]
pub async fn add_item(
    state: web::Data<HttpState>,
    caller: CurrentUser,
    path: web::Path<String>,
    payload: web::Json<AddMenuItemRequest>,
) -> ApiResult<HttpResponse> {
    let restaurant: RestaurantId = parse_id(&path.into_inner(), RESTO_ID)?;
    let AddMenuItemRequest { fields, image } = payload.into_inner();
    let image = require(image, IMAGE)?.into_upload(IMAGE)?;
    let item = state
        .menu
        .add_item(caller.user(), &restaurant, fields.into(), image)
        .await?;
    Ok(created(MenuItemDto::from(item), "Menu item added"))
}

/// Remove an item and its reviews.
#[utoipa::path(
    delete,
    path = "/api/v1/resto-menu/delete-item/{restoId}/{itemId}",
    params(
        ("restoId" = String, Path, description = "Restaurant id"),
        ("itemId" = String, Path, description = "Menu item id")
    ),
    responses(
        (status = 200, description = "Item removed"),
        (status = 403, description = "Not the restaurant owner", body = ErrorSchema),
        (status = 404, description = "No such item on this menu", body = ErrorSchema)
    ),
    tags = ["menu"],
    operation_id = "removeMenuItem"
)]
#[delete("/resto-menu/delete-item/{restoId}/{itemId}")]
pub async fn remove_item(
    state: web::Data<HttpState>,
    caller: CurrentUser,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (raw_resto, raw_item) = path.into_inner();
    let restaurant: RestaurantId = parse_id(&raw_resto, RESTO_ID)?;
    let item: MenuItemId = parse_id(&raw_item, ITEM_ID)?;
    state
        .menu
        .remove_item(caller.user(), &restaurant, &item)
        .await?;
    Ok(ok((), "Menu item deleted"))
}

/// One item.
#[utoipa::path(
    get,
    path = "/api/v1/resto-menu/view-item/{itemId}",
    params(("itemId" = String, Path, description = "Menu item id")),
    responses(
        (status = 200, description = "Item", body = MenuItemDto),
        (status = 404, description = "No such item", body = ErrorSchema)
    ),
    tags = ["menu"],
    operation_id = "getMenuItem",
    security([])
)]
#[get("/resto-menu/view-item/{itemId}")]
pub async fn view_item(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let item: MenuItemId = parse_id(&path.into_inner(), ITEM_ID)?;
    let item = state.menu.get_item(&item).await?;
    Ok(ok(MenuItemDto::from(item), "Menu item fetched"))
}

/// Merge present fields over an item.
#[utoipa::path(
    patch,
    path = "/api/v1/resto-menu/menu-item/update/{itemId}",
    params(("itemId" = String, Path, description = "Menu item id")),
    request_body = MenuItemFieldsRequest,
    responses(
        (status = 200, description = "Updated item", body = MenuItemDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not the restaurant owner", body = ErrorSchema),
        (status = 404, description = "No such item", body = ErrorSchema)
    ),
    tags = ["menu"],
    operation_id = "updateMenuItem"
)]
#[patch("/resto-menu/menu-item/update/{itemId}")]
pub async fn update_item(
    state: web::Data<HttpState>,
    caller: CurrentUser,
    path: web::Path<String>,
    payload: web::Json<MenuItemFieldsRequest>,
) -> ApiResult<HttpResponse> {
    let item: MenuItemId = parse_id(&path.into_inner(), ITEM_ID)?;
    let item = state
        .menu
        .update_item(caller.user(), &item, payload.into_inner().into())
        .await?;
    Ok(ok(MenuItemDto::from(item), "Menu item updated"))
}

/// Replace an item's image.
#[utoipa::path(
    patch,
    path = "/api/v1/resto-menu/menu-item/update-logo/{itemId}",
    params(("itemId" = String, Path, description = "Menu item id")),
    request_body = ImagePayload,
    responses(
        (status = 200, description = "Updated item", body = MenuItemDto),
        (status = 400, description = "Invalid image", body = ErrorSchema),
        (status = 403, description = "Not the restaurant owner", body = ErrorSchema),
        (status = 502, description = "Upload failed", body = ErrorSchema)
    ),
    tags = ["menu"],
    operation_id = "updateMenuItemImage"
)]
#[patch("/resto-menu/menu-item/update-logo/{itemId}")]
pub async fn update_item_image(
    state: web::Data<HttpState>,
    caller: CurrentUser,
    path: web::Path<String>,
    payload: web::Json<ImagePayload>,
) -> ApiResult<HttpResponse> {
    let item: MenuItemId = parse_id(&path.into_inner(), ITEM_ID)?;
    let image = payload.into_inner().into_upload(IMAGE)?;
    let item = state
        .menu
        .update_item_image(caller.user(), &item, image)
        .await?;
    Ok(ok(MenuItemDto::from(item), "Menu item image updated"))
}

/// Flip an item's availability.
#[utoipa::path(
    patch,
    path = "/api/v1/resto-menu/menu-item/toggle/{itemId}",
    params(("itemId" = String, Path, description = "Menu item id")),
    responses(
        (status = 200, description = "Updated item", body = MenuItemDto),
        (status = 403, description = "Not the restaurant owner", body = ErrorSchema),
        (status = 404, description = "No such item", body = ErrorSchema)
    ),
    tags = ["menu"],
    operation_id = "toggleMenuItem"
)]
#[patch("/resto-menu/menu-item/toggle/{itemId}")]
pub async fn toggle_item(
    state: web::Data<HttpState>,
    caller: CurrentUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let item: MenuItemId = parse_id(&path.into_inner(), ITEM_ID)?;
    let item = state.menu.toggle_availability(caller.user(), &item).await?;
    Ok(ok(MenuItemDto::from(item), "Menu item availability toggled"))
}

/// A restaurant's full menu.
#[utoipa::path(
    get,
    path = "/api/v1/resto-menu/menu-items/{restoId}",
    params(("restoId" = String, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Items", body = [MenuItemDto]),
        (status = 404, description = "No such restaurant", body = ErrorSchema)
    ),
    tags = ["menu"],
    operation_id = "listMenuItems",
    security([])
)]
#[get("/resto-menu/menu-items/{restoId}")]
pub async fn list_items(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let restaurant: RestaurantId = parse_id(&path.into_inner(), RESTO_ID)?;
    let items = state.menu.list_items(&restaurant).await?;
    Ok(ok(items_body(items), "Menu items fetched"))
}

/// A restaurant's available items.
#[utoipa::path(
    get,
    path = "/api/v1/resto-menu/items-available/{restoId}",
    params(("restoId" = String, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Items", body = [MenuItemDto]),
        (status = 404, description = "No such restaurant", body = ErrorSchema)
    ),
    tags = ["menu"],
    operation_id = "listAvailableMenuItems",
    security([])
)]
#[get("/resto-menu/items-available/{restoId}")]
pub async fn list_available(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let restaurant: RestaurantId = parse_id(&path.into_inner(), RESTO_ID)?;
    let items = state.menu.list_available(&restaurant).await?;
    Ok(ok(items_body(items), "Available menu items fetched"))
}

/// Distinct categories on a restaurant's menu.
#[utoipa::path(
    get,
    path = "/api/v1/resto-menu/categories/{restoId}",
    params(("restoId" = String, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Sorted categories", body = [String]),
        (status = 404, description = "No such restaurant", body = ErrorSchema)
    ),
    tags = ["menu"],
    operation_id = "listMenuCategories",
    security([])
)]
#[get("/resto-menu/categories/{restoId}")]
pub async fn list_categories(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let restaurant: RestaurantId = parse_id(&path.into_inner(), RESTO_ID)?;
    let categories = state.menu.list_categories(&restaurant).await?;
    Ok(ok(categories, "Menu categories fetched"))
}

/// Name or category substring search across every menu.
#[utoipa::path(
    get,
    path = "/api/v1/resto-menu/search",
    params(("q" = String, Query, description = "Case-insensitive needle")),
    responses(
        (status = 200, description = "Items", body = [MenuItemDto]),
        (status = 400, description = "Missing or blank query", body = ErrorSchema)
    ),
    tags = ["menu"],
    operation_id = "searchMenuItems",
    security([])
)]
#[get("/resto-menu/search")]
pub async fn search_items(
    state: web::Data<HttpState>,
    query: web::Query<SearchParams>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner().into_query()?;
    let items = state.menu.search(&query).await?;
    Ok(ok(items_body(items), "Menu items fetched"))
}

/// Filter a restaurant's menu by category and price, then order it.
#[utoipa::path(
    get,
    path = "/api/v1/resto-menu/sort-filter/{restoId}",
    params(
        ("restoId" = String, Path, description = "Restaurant id"),
        ("sortBy" = Option<String>, Query, description = "price_asc, price_desc, rating_desc, or newest (default)"),
        ("category" = Option<String>, Query, description = "Exact category, case-insensitive"),
        ("minPrice" = Option<f64>, Query, description = "Inclusive lower bound"),
        ("maxPrice" = Option<f64>, Query, description = "Inclusive upper bound")
    ),
    responses(
        (status = 200, description = "Items", body = [MenuItemDto]),
        (status = 400, description = "Unknown sort or inverted price range", body = ErrorSchema),
        (status = 404, description = "No such restaurant", body = ErrorSchema)
    ),
    tags = ["menu"],
    operation_id = "sortAndFilterMenu",
    security([])
)]
#[get("/resto-menu/sort-filter/{restoId}")]
pub async fn sort_and_filter(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<SortFilterParams>,
) -> ApiResult<HttpResponse> {
    let restaurant: RestaurantId = parse_id(&path.into_inner(), RESTO_ID)?;
    let query = query.into_inner().into_query()?;
    let items = state.menu.sort_and_filter(&restaurant, query).await?;
    Ok(ok(items_body(items), "Menu items fetched"))
}

#[cfg(test)]
mod tests;
