//! Tests for review handlers.

use super::*;
use crate::domain::test_fixtures::{fixture_review, fixture_user};
use crate::domain::Role;
use crate::inbound::http::test_utils::{MockPorts, access_cookie};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use mockall::predicate::eq;
use rstest::rstest;
use serde_json::{Value, json};

async fn call(
    ports: MockPorts,
    request: actix_test::TestRequest,
) -> actix_web::dev::ServiceResponse {
    let app = actix_test::init_service(
        App::new().app_data(ports.into_state()).service(
            web::scope("/api/v1")
                .service(create_review)
                .service(update_review)
                .service(delete_review)
                .service(restaurant_reviews)
                .service(menu_item_reviews)
                .service(my_reviews)
                .service(recompute_rating),
        ),
    )
    .await;
    actix_test::call_service(&app, request.to_request()).await
}

#[actix_web::test]
async fn create_returns_the_review_and_target_rating() {
    let author = fixture_user(Role::User);
    let restaurant = RestaurantId::random();
    let review = fixture_review(author.id, ReviewTarget::Restaurant(restaurant), 4);
    let mut ports = MockPorts::default();
    ports.sign_in_as(author);
    ports
        .reviews
        .expect_create()
        .withf(move |_, new| {
            new.target == ReviewTarget::Restaurant(restaurant)
                && new.rating.value() == 4
                && new.text.as_ref() == "Great crust"
        })
        .times(1)
        .return_once(move |_, _| {
            Ok(ReviewChange {
                review,
                target_rating: RatingSummary {
                    average: 4.0,
                    count: 1,
                },
            })
        });

    let res = call(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/review/create")
            .cookie(access_cookie())
            .set_json(json!({
                "restaurantId": restaurant.to_string(),
                "rating": 4,
                "review": "  Great crust ",
            })),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"]["targetRating"], json!({"average": 4.0, "count": 1}));
    assert_eq!(body["data"]["review"]["restaurantId"], json!(restaurant.to_string()));
    assert!(body["data"]["review"].get("menuItemId").is_none());
    assert_eq!(body["data"]["review"]["rating"], json!(4));
}

#[rstest]
#[case::no_target(json!({"rating": 4, "review": "ok"}), "target")]
#[case::both_targets(
    json!({
        "restaurantId": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
        "menuItemId": "3fa85f64-5717-4562-b3fc-2c963f66afa7",
        "rating": 4,
        "review": "ok",
    }),
    "target"
)]
#[case::rating_too_high(
    json!({"restaurantId": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "rating": 6, "review": "ok"}),
    "rating"
)]
#[case::rating_zero(
    json!({"restaurantId": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "rating": 0, "review": "ok"}),
    "rating"
)]
#[case::missing_rating(
    json!({"restaurantId": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "review": "ok"}),
    "rating"
)]
#[case::blank_text(
    json!({"restaurantId": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "rating": 3, "review": "  "}),
    "review"
)]
#[case::bad_id(json!({"menuItemId": "dish", "rating": 3, "review": "ok"}), "menuItemId")]
#[actix_web::test]
async fn create_rejects_invalid_input_before_the_service(#[case] body: Value, #[case] field: &str) {
    let mut ports = MockPorts::default();
    ports.sign_in_as(fixture_user(Role::User));

    let res = call(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/review/create")
            .cookie(access_cookie())
            .set_json(body),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], json!(field));
}

#[actix_web::test]
async fn create_passes_through_missing_targets() {
    let mut ports = MockPorts::default();
    ports.sign_in_as(fixture_user(Role::User));
    ports
        .reviews
        .expect_create()
        .returning(|_, _| Err(Error::not_found("menu item not found")));

    let res = call(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/review/create")
            .cookie(access_cookie())
            .set_json(json!({
                "menuItemId": MenuItemId::random().to_string(),
                "rating": 5,
                "review": "ok",
            })),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn update_requires_at_least_one_field() {
    let mut ports = MockPorts::default();
    ports.sign_in_as(fixture_user(Role::User));

    let res = call(
        ports,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/review/update/{}", ReviewId::random()))
            .cookie(access_cookie())
            .set_json(json!({})),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(
        body["message"],
        json!("at least one of rating or review must be provided")
    );
}

#[actix_web::test]
async fn update_forwards_the_edit() {
    let author = fixture_user(Role::User);
    let review = fixture_review(author.id, ReviewTarget::MenuItem(MenuItemId::random()), 2);
    let id = review.id;
    let mut ports = MockPorts::default();
    ports.sign_in_as(author);
    ports
        .reviews
        .expect_update()
        .withf(move |_, rid, update| {
            *rid == id
                && update
                    == &ReviewUpdate::try_new(Some(2), None).expect("valid update")
        })
        .times(1)
        .return_once(move |_, _, _| {
            Ok(ReviewChange {
                review,
                target_rating: RatingSummary {
                    average: 2.0,
                    count: 1,
                },
            })
        });

    let res = call(
        ports,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/review/update/{id}"))
            .cookie(access_cookie())
            .set_json(json!({"rating": 2})),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert!(body["data"]["review"]["menuItemId"].is_string());
    assert_eq!(body["data"]["targetRating"]["average"], json!(2.0));
}

#[actix_web::test]
async fn delete_returns_the_refreshed_rating() {
    let id = ReviewId::random();
    let mut ports = MockPorts::default();
    ports.sign_in_as(fixture_user(Role::User));
    ports
        .reviews
        .expect_delete()
        .withf(move |_, rid| *rid == id)
        .times(1)
        .returning(|_, _| Ok(RatingSummary::default()));

    let res = call(
        ports,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/review/delete/{id}"))
            .cookie(access_cookie()),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"], json!({"average": 0.0, "count": 0}));
}

#[actix_web::test]
async fn delete_passes_through_forbidden() {
    let mut ports = MockPorts::default();
    ports.sign_in_as(fixture_user(Role::User));
    ports
        .reviews
        .expect_delete()
        .returning(|_, _| Err(Error::forbidden("only the author may change this review")));

    let res = call(
        ports,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/review/delete/{}", ReviewId::random()))
            .cookie(access_cookie()),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[case::restaurant("restaurant")]
#[case::item("item")]
#[actix_web::test]
async fn fetch_routes_pick_the_target_kind(#[case] kind: &str) {
    let id = uuid::Uuid::new_v4();
    let expected = match kind {
        "restaurant" => ReviewTarget::Restaurant(id.to_string().parse().expect("id")),
        _ => ReviewTarget::MenuItem(id.to_string().parse().expect("id")),
    };
    let author = fixture_user(Role::User);
    let review = fixture_review(author.id, expected, 5);
    let mut ports = MockPorts::default();
    ports
        .reviews
        .expect_for_target()
        .with(eq(expected))
        .times(1)
        .return_once(move |_| Ok(vec![review]));

    let res = call(
        ports,
        actix_test::TestRequest::get().uri(&format!("/api/v1/review/fetch/{kind}/{id}")),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"][0]["rating"], json!(5));
}

#[actix_web::test]
async fn my_reviews_requires_a_session() {
    let res = call(
        MockPorts::default(),
        actix_test::TestRequest::get().uri("/api/v1/review/fetch/my"),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn my_reviews_lists_the_callers_reviews() {
    let author = fixture_user(Role::User);
    let author_id = author.id;
    let review = fixture_review(author_id, ReviewTarget::Restaurant(RestaurantId::random()), 3);
    let mut ports = MockPorts::default();
    ports.sign_in_as(author);
    ports
        .reviews
        .expect_by_author()
        .withf(move |caller| caller.id == author_id)
        .return_once(move |_| Ok(vec![review]));

    let res = call(
        ports,
        actix_test::TestRequest::get()
            .uri("/api/v1/review/fetch/my")
            .cookie(access_cookie()),
    )
    .await;

    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"][0]["authorId"], json!(author_id.to_string()));
}

#[actix_web::test]
async fn recompute_resolves_the_target() {
    let item = MenuItemId::random();
    let mut ports = MockPorts::default();
    ports.sign_in_as(fixture_user(Role::Admin));
    ports
        .reviews
        .expect_recompute()
        .withf(move |_, target| *target == ReviewTarget::MenuItem(item))
        .times(1)
        .returning(|_, _| {
            Ok(RatingSummary {
                average: 3.5,
                count: 2,
            })
        });

    let res = call(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/review/recompute")
            .cookie(access_cookie())
            .set_json(json!({"menuItemId": item.to_string()})),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"]["average"], json!(3.5));
}
