//! Tests for menu handlers.

use super::*;
use crate::domain::test_fixtures::{fixture_menu_item, fixture_user};
use crate::domain::{Role, SearchQuery};
use crate::inbound::http::test_utils::{MockPorts, access_cookie};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
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
                .service(add_item)
                .service(remove_item)
                .service(view_item)
                .service(update_item)
                .service(update_item_image)
                .service(toggle_item)
                .service(list_items)
                .service(list_available)
                .service(list_categories)
                .service(search_items)
                .service(sort_and_filter),
        ),
    )
    .await;
    actix_test::call_service(&app, request.to_request()).await
}

fn image_json() -> Value {
    json!({
        "fileName": "dish.webp",
        "contentType": "image/webp",
        "data": STANDARD.encode(b"RIFF"),
    })
}

#[actix_web::test]
async fn add_item_forwards_fields_and_image() {
    let restaurant = RestaurantId::random();
    let item = fixture_menu_item(restaurant, "Margherita", "Pizza");
    let mut ports = MockPorts::default();
    ports.sign_in_as(fixture_user(Role::RestaurantOwner));
    ports
        .menu
        .expect_add_item()
        .withf(move |_, rid, fields, image| {
            *rid == restaurant
                && fields.name.as_deref() == Some("Margherita")
                && fields.price == Some(9.5)
                && image.extension() == "webp"
        })
        .times(1)
        .return_once(move |_, _, _, _| Ok(item));

    let res = call(
        ports,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/resto-menu/add-item/{restaurant}"))
            .cookie(access_cookie())
            .set_json(json!({
                "name": "Margherita",
                "description": "Tomato, mozzarella, basil",
                "price": 9.5,
                "category": "Pizza",
                "image": image_json(),
            })),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"]["restaurantId"], json!(restaurant.to_string()));
    assert_eq!(body["data"]["isAvailable"], json!(true));
}

#[actix_web::test]
async fn add_item_requires_an_image() {
    let mut ports = MockPorts::default();
    ports.sign_in_as(fixture_user(Role::RestaurantOwner));

    let res = call(
        ports,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/resto-menu/add-item/{}", RestaurantId::random()))
            .cookie(access_cookie())
            .set_json(json!({"name": "Margherita"})),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], json!("image"));
}

#[rstest]
#[case::bad_restaurant("nope", "3fa85f64-5717-4562-b3fc-2c963f66afa6", "restoId")]
#[case::bad_item("3fa85f64-5717-4562-b3fc-2c963f66afa6", "nope", "itemId")]
#[actix_web::test]
async fn remove_item_names_the_malformed_id(
    #[case] resto: &str,
    #[case] item: &str,
    #[case] field: &str,
) {
    let mut ports = MockPorts::default();
    ports.sign_in_as(fixture_user(Role::RestaurantOwner));

    let res = call(
        ports,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/resto-menu/delete-item/{resto}/{item}"))
            .cookie(access_cookie()),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], json!(field));
}

#[actix_web::test]
async fn remove_item_passes_both_ids() {
    let restaurant = RestaurantId::random();
    let item = MenuItemId::random();
    let mut ports = MockPorts::default();
    ports.sign_in_as(fixture_user(Role::RestaurantOwner));
    ports
        .menu
        .expect_remove_item()
        .withf(move |_, rid, iid| *rid == restaurant && *iid == item)
        .times(1)
        .returning(|_, _, _| Ok(()));

    let res = call(
        ports,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/resto-menu/delete-item/{restaurant}/{item}"))
            .cookie(access_cookie()),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn view_item_is_public() {
    let item = fixture_menu_item(RestaurantId::random(), "Carbonara", "Pasta");
    let id = item.id;
    let mut ports = MockPorts::default();
    ports
        .menu
        .expect_get_item()
        .with(eq(id))
        .return_once(move |_| Ok(item));

    let res = call(
        ports,
        actix_test::TestRequest::get().uri(&format!("/api/v1/resto-menu/view-item/{id}")),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"]["name"], json!("Carbonara"));
    assert_eq!(body["data"]["ratingCount"], json!(0));
}

#[actix_web::test]
async fn toggle_reports_the_new_availability() {
    let mut item = fixture_menu_item(RestaurantId::random(), "Carbonara", "Pasta");
    item.is_available = false;
    let id = item.id;
    let mut ports = MockPorts::default();
    ports.sign_in_as(fixture_user(Role::RestaurantOwner));
    ports
        .menu
        .expect_toggle_availability()
        .withf(move |_, iid| *iid == id)
        .return_once(move |_, _| Ok(item));

    let res = call(
        ports,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/resto-menu/menu-item/toggle/{id}"))
            .cookie(access_cookie()),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"]["isAvailable"], json!(false));
}

#[actix_web::test]
async fn update_item_forwards_present_fields() {
    let item = fixture_menu_item(RestaurantId::random(), "Carbonara", "Pasta");
    let id = item.id;
    let mut ports = MockPorts::default();
    ports.sign_in_as(fixture_user(Role::RestaurantOwner));
    ports
        .menu
        .expect_update_item()
        .withf(|_, _, fields| {
            fields
                == &MenuItemFields {
                    price: Some(11.0),
                    ..MenuItemFields::default()
                }
        })
        .times(1)
        .return_once(move |_, _, _| Ok(item));

    let res = call(
        ports,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/resto-menu/menu-item/update/{id}"))
            .cookie(access_cookie())
            .set_json(json!({"price": 11.0})),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn categories_are_returned_as_strings() {
    let restaurant = RestaurantId::random();
    let mut ports = MockPorts::default();
    ports
        .menu
        .expect_list_categories()
        .with(eq(restaurant))
        .returning(|_| Ok(vec!["Pasta".to_owned(), "Pizza".to_owned()]));

    let res = call(
        ports,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/resto-menu/categories/{restaurant}")),
    )
    .await;

    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"], json!(["Pasta", "Pizza"]));
}

#[actix_web::test]
async fn available_items_come_from_the_available_listing() {
    let restaurant = RestaurantId::random();
    let item = fixture_menu_item(restaurant, "Tiramisu", "Dessert");
    let mut ports = MockPorts::default();
    ports
        .menu
        .expect_list_available()
        .with(eq(restaurant))
        .times(1)
        .return_once(move |_| Ok(vec![item]));

    let res = call(
        ports,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/resto-menu/items-available/{restaurant}")),
    )
    .await;

    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["data"][0]["name"], json!("Tiramisu"));
}

#[actix_web::test]
async fn search_lowercases_the_query() {
    let mut ports = MockPorts::default();
    ports
        .menu
        .expect_search()
        .with(eq(SearchQuery::new("piz").expect("valid query")))
        .times(1)
        .returning(|_| Ok(Vec::new()));

    let res = call(
        ports,
        actix_test::TestRequest::get().uri("/api/v1/resto-menu/search?q=PIZ"),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn sort_filter_builds_the_query() {
    let restaurant = RestaurantId::random();
    let expected = MenuQuery::new(MenuSort::PriceDesc, None, Some(10.0), Some(20.0))
        .expect("valid query");
    let mut ports = MockPorts::default();
    ports
        .menu
        .expect_sort_and_filter()
        .with(eq(restaurant), eq(expected))
        .times(1)
        .returning(|_, _| Ok(Vec::new()));

    let res = call(
        ports,
        actix_test::TestRequest::get().uri(&format!(
            "/api/v1/resto-menu/sort-filter/{restaurant}?sortBy=price_desc&minPrice=10&maxPrice=20"
        )),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn sort_filter_defaults_to_newest() {
    let restaurant = RestaurantId::random();
    let mut ports = MockPorts::default();
    ports
        .menu
        .expect_sort_and_filter()
        .with(eq(restaurant), eq(MenuQuery::default()))
        .times(1)
        .returning(|_, _| Ok(Vec::new()));

    let res = call(
        ports,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/resto-menu/sort-filter/{restaurant}")),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
}

#[rstest]
#[case::unknown_sort("sortBy=cheapest", "sortBy")]
#[case::inverted("minPrice=20&maxPrice=10", "minPrice")]
#[case::negative("minPrice=-1", "minPrice")]
#[actix_web::test]
async fn sort_filter_rejects_bad_parameters(#[case] query: &str, #[case] field: &str) {
    let res = call(
        MockPorts::default(),
        actix_test::TestRequest::get().uri(&format!(
            "/api/v1/resto-menu/sort-filter/{}?{query}",
            RestaurantId::random()
        )),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], json!(field));
}
