//! Public home listing filters and profile management.

use axum::http::StatusCode;
use rentarr::db::NewProperty;
use rentarr::entities::properties::PropertyType;
use rust_decimal::Decimal;

mod common;
use common::{body_string, get, location, post_form, register, spawn_app};

async fn seed_listings(state: &rentarr::state::AppState, app: &axum::Router) {
    register(app, "Owner", "owner@example.com", "secret123", "owner").await;
    let owner = state
        .store()
        .get_user_by_email("owner@example.com")
        .await
        .unwrap()
        .unwrap();

    let listings = [
        ("Cheap Room", "Berlin", 400, PropertyType::Apartment),
        ("Mid Flat", "Berlin", 500, PropertyType::Apartment),
        ("Nice Flat", "Hamburg", 1500, PropertyType::Apartment),
        ("Big House", "Hamburg", 2200, PropertyType::House),
    ];
    for (title, city, rent, kind) in listings {
        state
            .store()
            .add_property(NewProperty {
                owner_id: owner.id,
                title: title.to_string(),
                description: "d".to_string(),
                location: city.to_string(),
                rent_amount: Decimal::new(rent, 0),
                property_type: kind,
                main_image_path: None,
            })
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn rent_range_filter_is_inclusive() {
    let (state, app) = spawn_app().await;
    seed_listings(&state, &app).await;

    let page = body_string(get(&app, "/?min_rent=500&max_rent=1500", None).await).await;
    assert!(page.contains("Mid Flat"));
    assert!(page.contains("Nice Flat"));
    assert!(!page.contains("Cheap Room"));
    assert!(!page.contains("Big House"));
}

#[tokio::test]
async fn listings_are_newest_first() {
    let (state, app) = spawn_app().await;
    seed_listings(&state, &app).await;

    let page = body_string(get(&app, "/", None).await).await;
    let first = page.find("Big House").unwrap();
    let last = page.find("Cheap Room").unwrap();
    assert!(first < last);
}

#[tokio::test]
async fn location_and_type_filters_narrow_results() {
    let (state, app) = spawn_app().await;
    seed_listings(&state, &app).await;

    let page = body_string(get(&app, "/?location=berlin", None).await).await;
    assert!(page.contains("Cheap Room"));
    assert!(!page.contains("Big House"));

    let page = body_string(get(&app, "/?property_type=house", None).await).await;
    assert!(page.contains("Big House"));
    assert!(!page.contains("Mid Flat"));
}

#[tokio::test]
async fn malformed_filter_values_are_ignored() {
    let (state, app) = spawn_app().await;
    seed_listings(&state, &app).await;

    // Unparseable bounds and unknown types drop the filter rather than erroring.
    let response = get(&app, "/?min_rent=lots&property_type=castle", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_string(response).await;
    assert!(page.contains("Cheap Room"));
    assert!(page.contains("Big House"));
}

#[tokio::test]
async fn profile_update_changes_name_and_phone_only() {
    let (state, app) = spawn_app().await;

    let cookie = register(&app, "Before", "me@example.com", "secret123", "tenant").await;

    let response = post_form(
        &app,
        "/profile",
        "full_name=After&phone=555-0199",
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/profile");

    let user = state
        .store()
        .get_user_by_email("me@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.full_name, "After");
    assert_eq!(user.phone, "555-0199");
    assert_eq!(user.email, "me@example.com");
}

#[tokio::test]
async fn profile_requires_a_session() {
    let (_, app) = spawn_app().await;

    let response = get(&app, "/profile", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}
