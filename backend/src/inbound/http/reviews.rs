//! Review API handlers.
//!
//! Every mutation answers with the review and its target's refreshed
//! aggregate so clients can update displayed ratings without refetching.
//!
//! ```text
//! POST   /api/v1/review/create                {"restaurantId":"..","rating":4,"review":"Great"}
//! PATCH  /api/v1/review/update/{id}           {"rating":3}
//! DELETE /api/v1/review/delete/{id}
//! GET    /api/v1/review/fetch/restaurant/{id}
//! GET    /api/v1/review/fetch/item/{id}
//! GET    /api/v1/review/fetch/my
//! POST   /api/v1/review/recompute             {"menuItemId":".."}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{NewReview, ReviewChange};
use crate::domain::{
    Error, MenuItemId, Rating, RatingSummary, RestaurantId, Review, ReviewId, ReviewTarget,
    ReviewText, ReviewUpdate,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CurrentUser;
use crate::inbound::http::response::{created, ok};
use crate::inbound::http::schemas::{ErrorSchema, RatingSummarySchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_optional_id, require};

const ID: FieldName = FieldName::new("id");
const RESTAURANT_ID: FieldName = FieldName::new("restaurantId");
const MENU_ITEM_ID: FieldName = FieldName::new("menuItemId");

/// Names exactly one review target.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TargetRequest {
    pub restaurant_id: Option<String>,
    pub menu_item_id: Option<String>,
}

impl TargetRequest {
    fn into_target(self) -> Result<ReviewTarget, Error> {
        let restaurant: Option<RestaurantId> =
            parse_optional_id(self.restaurant_id.as_deref(), RESTAURANT_ID)?;
        let menu_item: Option<MenuItemId> =
            parse_optional_id(self.menu_item_id.as_deref(), MENU_ITEM_ID)?;
        ReviewTarget::from_parts(restaurant, menu_item).map_err(|err| Error::validation(&err))
    }
}

/// Body for `POST /api/v1/review/create`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    #[serde(flatten)]
    pub target: TargetRequest,
    /// Whole stars, 1 to 5.
    #[schema(minimum = 1, maximum = 5)]
    pub rating: Option<i64>,
    pub review: Option<String>,
}

impl CreateReviewRequest {
    fn into_new_review(self) -> Result<NewReview, Error> {
        let target = self.target.into_target()?;
        let rating = require(self.rating, FieldName::new("rating"))?;
        let text = require(self.review, FieldName::new("review"))?;
        Ok(NewReview {
            target,
            rating: Rating::new(rating).map_err(|err| Error::validation(&err))?,
            text: ReviewText::new(text).map_err(|err| Error::validation(&err))?,
        })
    }
}

/// Body for `PATCH /api/v1/review/update/{id}`; at least one field.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    #[schema(minimum = 1, maximum = 5)]
    pub rating: Option<i64>,
    pub review: Option<String>,
}

/// Review as returned to clients. Exactly one target id is set.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub id: String,
    pub author_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_item_id: Option<String>,
    pub rating: u8,
    pub review: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Review> for ReviewDto {
    fn from(value: Review) -> Self {
        Self {
            id: value.id.to_string(),
            author_id: value.author_id.to_string(),
            restaurant_id: value.target.restaurant_id().map(|id| id.to_string()),
            menu_item_id: value.target.menu_item_id().map(|id| id.to_string()),
            rating: value.rating.value(),
            review: value.text.as_ref().to_owned(),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// A stored review with its target's new aggregate.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewChangeDto {
    pub review: ReviewDto,
    #[schema(value_type = RatingSummarySchema)]
    pub target_rating: RatingSummary,
}

impl From<ReviewChange> for ReviewChangeDto {
    fn from(value: ReviewChange) -> Self {
        Self {
            review: value.review.into(),
            target_rating: value.target_rating,
        }
    }
}

fn reviews_body(reviews: Vec<Review>) -> Vec<ReviewDto> {
    reviews.into_iter().map(ReviewDto::from).collect()
}

/// Review a restaurant or a menu item.
#[utoipa::path(
    post,
    path = "/api/v1/review/create",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review stored", body = ReviewChangeDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Target does not exist", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "createReview"
)]
#[post("/review/create")]
pub async fn create_review(
    state: web::Data<HttpState>,
    caller: CurrentUser,
    payload: web::Json<CreateReviewRequest>,
) -> ApiResult<HttpResponse> {
    let review = payload.into_inner().into_new_review()?;
    let change = state.reviews.create(caller.user(), review).await?;
    Ok(created(ReviewChangeDto::from(change), "Review created"))
}

/// Edit a review's rating and/or text.
#[utoipa::path(
    patch,
    path = "/api/v1/review/update/{id}",
    params(("id" = String, Path, description = "Review id")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ReviewChangeDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not the author", body = ErrorSchema),
        (status = 404, description = "No such review", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "updateReview"
)]
#[patch("/review/update/{id}")]
pub async fn update_review(
    state: web::Data<HttpState>,
    caller: CurrentUser,
    path: web::Path<String>,
    payload: web::Json<UpdateReviewRequest>,
) -> ApiResult<HttpResponse> {
    let id: ReviewId = parse_id(&path.into_inner(), ID)?;
    let UpdateReviewRequest { rating, review } = payload.into_inner();
    let update = ReviewUpdate::try_new(rating, review).map_err(|err| Error::validation(&err))?;
    let change = state.reviews.update(caller.user(), &id, update).await?;
    Ok(ok(ReviewChangeDto::from(change), "Review updated"))
}

/// Delete a review.
#[utoipa::path(
    delete,
    path = "/api/v1/review/delete/{id}",
    params(("id" = String, Path, description = "Review id")),
    responses(
        (status = 200, description = "Target's rating after removal", body = RatingSummarySchema),
        (status = 403, description = "Not the author", body = ErrorSchema),
        (status = 404, description = "No such review", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "deleteReview"
)]
#[delete("/review/delete/{id}")]
pub async fn delete_review(
    state: web::Data<HttpState>,
    caller: CurrentUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: ReviewId = parse_id(&path.into_inner(), ID)?;
    let summary = state.reviews.delete(caller.user(), &id).await?;
    Ok(ok(summary, "Review deleted"))
}

/// Reviews of one restaurant.
#[utoipa::path(
    get,
    path = "/api/v1/review/fetch/restaurant/{id}",
    params(("id" = String, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Reviews, newest first", body = [ReviewDto]),
        (status = 404, description = "No such restaurant", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "restaurantReviews",
    security([])
)]
#[get("/review/fetch/restaurant/{id}")]
pub async fn restaurant_reviews(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: RestaurantId = parse_id(&path.into_inner(), ID)?;
    let reviews = state
        .reviews
        .for_target(&ReviewTarget::Restaurant(id))
        .await?;
    Ok(ok(reviews_body(reviews), "Reviews fetched"))
}

/// Reviews of one menu item.
#[utoipa::path(
    get,
    path = "/api/v1/review/fetch/item/{id}",
    params(("id" = String, Path, description = "Menu item id")),
    responses(
        (status = 200, description = "Reviews, newest first", body = [ReviewDto]),
        (status = 404, description = "No such menu item", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "menuItemReviews",
    security([])
)]
#[get("/review/fetch/item/{id}")]
pub async fn menu_item_reviews(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: MenuItemId = parse_id(&path.into_inner(), ID)?;
    let reviews = state.reviews.for_target(&ReviewTarget::MenuItem(id)).await?;
    Ok(ok(reviews_body(reviews), "Reviews fetched"))
}

/// Reviews the caller wrote.
#[utoipa::path(
    get,
    path = "/api/v1/review/fetch/my",
    responses(
        (status = 200, description = "Reviews, newest first", body = [ReviewDto]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "myReviews"
)]
#[get("/review/fetch/my")]
pub async fn my_reviews(state: web::Data<HttpState>, caller: CurrentUser) -> ApiResult<HttpResponse> {
    let reviews = state.reviews.by_author(caller.user()).await?;
    Ok(ok(reviews_body(reviews), "Reviews fetched"))
}

/// Re-run the rating aggregator for one target.
#[utoipa::path(
    post,
    path = "/api/v1/review/recompute",
    request_body = TargetRequest,
    responses(
        (status = 200, description = "Recomputed rating", body = RatingSummarySchema),
        (status = 400, description = "Invalid target", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Target does not exist", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "recomputeRating"
)]
#[post("/review/recompute")]
pub async fn recompute_rating(
    state: web::Data<HttpState>,
    caller: CurrentUser,
    payload: web::Json<TargetRequest>,
) -> ApiResult<HttpResponse> {
    let target = payload.into_inner().into_target()?;
    let summary = state.reviews.recompute(caller.user(), &target).await?;
    Ok(ok(summary, "Rating recomputed"))
}

#[cfg(test)]
mod tests;
