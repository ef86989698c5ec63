//! Route table for the versioned REST API.
//!
//! Mount with `web::scope("/api/v1").configure(configure)`. Extractor
//! failures are rendered through the shared error envelope so malformed JSON,
//! query strings, and paths all answer `400 invalid_request`.

use actix_web::{HttpRequest, error, web};

use crate::domain::Error;
use crate::inbound::http::images::JSON_BODY_LIMIT;
use crate::inbound::http::{menu_items, restaurants, reviews, users};

fn reject(message: String) -> actix_web::Error {
    Error::invalid_request(message).into()
}

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    match err {
        error::JsonPayloadError::OverflowKnownLength { .. } | error::JsonPayloadError::Overflow { .. } => {
            reject(format!("request body exceeds {JSON_BODY_LIMIT} bytes"))
        }
        other => reject(format!("invalid JSON body: {other}")),
    }
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    reject(format!("invalid query string: {err}"))
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    reject(format!("invalid path: {err}"))
}

/// Register extractor settings and every API handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_BODY_LIMIT)
            .error_handler(json_error),
    )
    .app_data(web::QueryConfig::default().error_handler(query_error))
    .app_data(web::PathConfig::default().error_handler(path_error));

    cfg.service(users::register)
        .service(users::login)
        .service(users::refresh)
        .service(users::logout)
        .service(users::current_user)
        .service(users::update_profile)
        .service(users::update_avatar)
        .service(users::forgot_password)
        .service(users::reset_password)
        .service(users::change_password)
        .service(users::list_users);

    cfg.service(restaurants::create_restaurant)
        .service(restaurants::list_restaurants)
        .service(restaurants::by_category)
        .service(restaurants::by_city)
        .service(restaurants::get_restaurant)
        .service(restaurants::open_restaurants)
        .service(restaurants::search_restaurants)
        .service(restaurants::top_rated)
        .service(restaurants::update_details)
        .service(restaurants::update_logo)
        .service(restaurants::soft_delete)
        .service(restaurants::restore)
        .service(restaurants::hard_delete);

    cfg.service(menu_items::add_item)
        .service(menu_items::remove_item)
        .service(menu_items::view_item)
        .service(menu_items::update_item)
        .service(menu_items::update_item_image)
        .service(menu_items::toggle_item)
        .service(menu_items::list_items)
        .service(menu_items::list_available)
        .service(menu_items::list_categories)
        .service(menu_items::search_items)
        .service(menu_items::sort_and_filter);

    cfg.service(reviews::create_review)
        .service(reviews::update_review)
        .service(reviews::delete_review)
        .service(reviews::restaurant_reviews)
        .service(reviews::menu_item_reviews)
        .service(reviews::my_reviews)
        .service(reviews::recompute_rating);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::MockPorts;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn send(request: actix_test::TestRequest) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(MockPorts::default().into_state())
                .service(web::scope("/api/v1").configure(configure)),
        )
        .await;
        let res = actix_test::call_service(&app, request.to_request()).await;
        let status = res.status();
        let body = actix_test::read_body(res).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[rstest]
    #[case::malformed_json(
        actix_test::TestRequest::post()
            .uri("/api/v1/users/login")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
    )]
    #[case::wrong_types(
        actix_test::TestRequest::post()
            .uri("/api/v1/users/login")
            .set_json(json!({"email": 7, "password": true}))
    )]
    #[case::bad_query(actix_test::TestRequest::get().uri("/api/v1/resto/top-rated?limit=lots"))]
    #[actix_web::test]
    async fn extractor_failures_use_the_error_envelope(#[case] request: actix_test::TestRequest) {
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("invalid_request"));
        assert_eq!(body["statusCode"], json!(400));
    }

    #[actix_web::test]
    async fn unknown_routes_are_not_found() {
        let (status, _) = send(actix_test::TestRequest::get().uri("/api/v1/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
