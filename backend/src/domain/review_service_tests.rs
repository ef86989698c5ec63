//! Behaviour of the review service against mocked ports.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockMenuItemRepository, MockRestaurantRepository, MockReviewRepository,
    ReviewPersistenceError,
};
use crate::domain::test_fixtures::{
    fixture_clock, fixture_menu_item, fixture_restaurant, fixture_review, fixture_user,
};
use crate::domain::{ErrorCode, MenuItemId, Rating, RestaurantId, ReviewText};

struct Mocks {
    reviews: MockReviewRepository,
    restaurants: MockRestaurantRepository,
    menu_items: MockMenuItemRepository,
}

#[fixture]
fn mocks() -> Mocks {
    Mocks {
        reviews: MockReviewRepository::new(),
        restaurants: MockRestaurantRepository::new(),
        menu_items: MockMenuItemRepository::new(),
    }
}

fn service(mocks: Mocks) -> ReviewServiceImpl {
    ReviewServiceImpl::new(
        ReviewPorts {
            reviews: Arc::new(mocks.reviews),
            restaurants: Arc::new(mocks.restaurants),
            menu_items: Arc::new(mocks.menu_items),
        },
        fixture_clock(),
    )
}

fn submission(target: ReviewTarget, rating: i64) -> NewReview {
    NewReview {
        target,
        rating: Rating::new(rating).expect("valid rating"),
        text: ReviewText::new("Crisp and generous").expect("valid text"),
    }
}

fn summary(average: f64, count: u32) -> RatingSummary {
    RatingSummary { average, count }
}

#[rstest]
#[tokio::test]
async fn create_reports_the_refreshed_restaurant_rating(mut mocks: Mocks) {
    let restaurant = fixture_restaurant(fixture_user(Role::RestaurantOwner).id);
    let target = ReviewTarget::Restaurant(restaurant.id);
    mocks
        .restaurants
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(restaurant)));
    let caller = fixture_user(Role::User);
    let author = caller.id;
    mocks
        .reviews
        .expect_insert()
        .withf(move |review| review.author_id == author && review.target == target)
        .times(1)
        .return_once(|_| Ok(summary(4.5, 2)));

    let change = service(mocks)
        .create(&caller, submission(target, 5))
        .await
        .expect("created");
    assert_eq!(change.target_rating, summary(4.5, 2));
    assert_eq!(change.review.rating.value(), 5);
}

#[rstest]
#[tokio::test]
async fn create_resolves_menu_item_targets_through_the_catalog(mut mocks: Mocks) {
    let item = fixture_menu_item(RestaurantId::random(), "Soupe", "Starters");
    let target = ReviewTarget::MenuItem(item.id);
    mocks.restaurants.expect_find_by_id().never();
    mocks
        .menu_items
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(item)));
    mocks
        .reviews
        .expect_insert()
        .return_once(|_| Ok(summary(3.0, 1)));

    let change = service(mocks)
        .create(&fixture_user(Role::User), submission(target, 3))
        .await
        .expect("created");
    assert_eq!(change.target_rating.count, 1);
}

#[rstest]
#[tokio::test]
async fn create_against_a_missing_target_is_not_found(mut mocks: Mocks) {
    mocks
        .menu_items
        .expect_find_by_id()
        .return_once(|_| Ok(None));
    mocks.reviews.expect_insert().never();

    let err = service(mocks)
        .create(
            &fixture_user(Role::User),
            submission(ReviewTarget::MenuItem(MenuItemId::random()), 4),
        )
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn target_removed_mid_write_is_not_found(mut mocks: Mocks) {
    let restaurant = fixture_restaurant(fixture_user(Role::RestaurantOwner).id);
    let target = ReviewTarget::Restaurant(restaurant.id);
    mocks
        .restaurants
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(restaurant)));
    mocks.reviews.expect_insert().return_once(move |_| {
        Err(ReviewPersistenceError::target_missing(target.to_string()))
    });

    let err = service(mocks)
        .create(&fixture_user(Role::User), submission(target, 4))
        .await
        .expect_err("raced delete");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(Role::User, false, false)]
#[case(Role::User, true, true)]
#[case(Role::Admin, false, true)]
#[tokio::test]
async fn only_the_author_or_an_admin_may_edit(
    mut mocks: Mocks,
    #[case] role: Role,
    #[case] authored: bool,
    #[case] allowed: bool,
) {
    let caller = fixture_user(role);
    let author = if authored {
        caller.id
    } else {
        fixture_user(Role::User).id
    };
    let review = fixture_review(author, ReviewTarget::Restaurant(RestaurantId::random()), 2);
    let id = review.id;
    mocks
        .reviews
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(review)));
    mocks
        .reviews
        .expect_update()
        .withf(|review| review.rating.value() == 4 && review.text.as_ref() == "Lovely")
        .times(usize::from(allowed))
        .returning(|_| Ok(summary(4.0, 1)));

    let update = ReviewUpdate::try_new(Some(4), None).expect("valid update");
    let result = service(mocks).update(&caller, &id, update).await;
    match result {
        Ok(change) => {
            assert!(allowed);
            assert_eq!(change.target_rating, summary(4.0, 1));
        }
        Err(err) => {
            assert!(!allowed);
            assert_eq!(err.code(), ErrorCode::Forbidden);
        }
    }
}

#[rstest]
#[tokio::test]
async fn delete_returns_the_target_rating_after_removal(mut mocks: Mocks) {
    let caller = fixture_user(Role::User);
    let review = fixture_review(
        caller.id,
        ReviewTarget::Restaurant(RestaurantId::random()),
        1,
    );
    let id = review.id;
    mocks
        .reviews
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(review)));
    mocks
        .reviews
        .expect_delete()
        .return_once(|_| Ok(RatingSummary::default()));

    let remaining = service(mocks).delete(&caller, &id).await.expect("deleted");
    assert_eq!(remaining, RatingSummary::default());
}

#[rstest]
#[tokio::test]
async fn delete_of_an_unknown_review_is_not_found(mut mocks: Mocks) {
    mocks.reviews.expect_find_by_id().return_once(|_| Ok(None));

    let err = service(mocks)
        .delete(&fixture_user(Role::Admin), &ReviewId::random())
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn by_author_lists_the_callers_reviews(mut mocks: Mocks) {
    let caller = fixture_user(Role::User);
    let author = caller.id;
    let mine = fixture_review(author, ReviewTarget::Restaurant(RestaurantId::random()), 5);
    mocks
        .reviews
        .expect_list_by_author()
        .withf(move |id| *id == author)
        .return_once(move |_| Ok(vec![mine]));

    let reviews = service(mocks).by_author(&caller).await.expect("listed");
    assert_eq!(reviews.len(), 1);
}

#[rstest]
#[tokio::test]
async fn recompute_is_admin_only(mocks: Mocks) {
    let err = service(mocks)
        .recompute(
            &fixture_user(Role::RestaurantOwner),
            &ReviewTarget::Restaurant(RestaurantId::random()),
        )
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn admin_recompute_delegates_to_the_aggregator(mut mocks: Mocks) {
    let restaurant = fixture_restaurant(fixture_user(Role::RestaurantOwner).id);
    let target = ReviewTarget::Restaurant(restaurant.id);
    mocks
        .restaurants
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(restaurant)));
    mocks
        .reviews
        .expect_recompute()
        .withf(move |candidate| *candidate == target)
        .times(1)
        .return_once(|_| Ok(summary(3.5, 4)));

    let refreshed = service(mocks)
        .recompute(&fixture_user(Role::Admin), &target)
        .await
        .expect("recomputed");
    assert_eq!(refreshed, summary(3.5, 4));
}
