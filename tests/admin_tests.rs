//! Admin moderation flows: filtered dashboard, user and property removal.

use axum::http::StatusCode;
use rentarr::db::NewProperty;
use rentarr::entities::properties::PropertyType;
use rentarr::entities::rent_payments::PaymentStatus;
use rust_decimal::Decimal;

mod common;
use common::{
    ADMIN_EMAIL, ADMIN_PASSWORD, body_string, get, location, login, post_form, register,
    spawn_app,
};

const PASSWORD: &str = "secret123";

async fn admin_cookie(app: &axum::Router) -> String {
    let (target, cookie) = login(app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(target, "/");
    cookie.expect("admin login should establish a session")
}

#[tokio::test]
async fn dashboard_filters_users_by_substring_and_role() {
    let (_, app) = spawn_app().await;
    let admin = admin_cookie(&app).await;

    register(&app, "Alice Green", "alice@example.com", PASSWORD, "tenant").await;
    register(&app, "Bob Stone", "bob@example.com", PASSWORD, "owner").await;

    // Case-insensitive name-or-email substring.
    let page = body_string(get(&app, "/admin/dashboard?user_q=ALICE", Some(&admin)).await).await;
    assert!(page.contains("alice@example.com"));
    assert!(!page.contains("bob@example.com"));

    // Exact role filter.
    let page =
        body_string(get(&app, "/admin/dashboard?user_role=owner", Some(&admin)).await).await;
    assert!(page.contains("bob@example.com"));
    assert!(!page.contains("alice@example.com"));

    // Unrecognized role values are ignored, not rejected.
    let response = get(&app, "/admin/dashboard?user_role=wizard", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_string(response).await;
    assert!(page.contains("alice@example.com"));
    assert!(page.contains("bob@example.com"));
}

#[tokio::test]
async fn dashboard_filters_properties_by_location() {
    let (state, app) = spawn_app().await;
    let admin = admin_cookie(&app).await;

    register(&app, "Bob Stone", "bob@example.com", PASSWORD, "owner").await;
    let owner = state
        .store()
        .get_user_by_email("bob@example.com")
        .await
        .unwrap()
        .unwrap();

    for (title, city) in [("Berlin Loft", "Berlin Mitte"), ("Paris Flat", "Paris 11e")] {
        state
            .store()
            .add_property(NewProperty {
                owner_id: owner.id,
                title: title.to_string(),
                description: "d".to_string(),
                location: city.to_string(),
                rent_amount: Decimal::new(900, 0),
                property_type: PropertyType::Apartment,
                main_image_path: None,
            })
            .await
            .unwrap();
    }

    let page = body_string(
        get(&app, "/admin/dashboard?property_location=berlin", Some(&admin)).await,
    )
    .await;
    assert!(page.contains("Berlin Loft"));
    assert!(!page.contains("Paris Flat"));
}

#[tokio::test]
async fn removing_a_user_cascades_to_their_listings_and_payments() {
    let (state, app) = spawn_app().await;
    let admin = admin_cookie(&app).await;

    register(&app, "Bob Stone", "bob@example.com", PASSWORD, "owner").await;
    let owner = state
        .store()
        .get_user_by_email("bob@example.com")
        .await
        .unwrap()
        .unwrap();

    let property = state
        .store()
        .add_property(NewProperty {
            owner_id: owner.id,
            title: "Doomed".to_string(),
            description: "d".to_string(),
            location: "Nowhere".to_string(),
            rent_amount: Decimal::new(500, 0),
            property_type: PropertyType::House,
            main_image_path: None,
        })
        .await
        .unwrap();

    state
        .store()
        .upsert_payment(
            property.id,
            owner.id,
            "2024-04-01".parse().unwrap(),
            Decimal::new(500, 0),
            PaymentStatus::Pending,
        )
        .await
        .unwrap();

    let response = post_form(
        &app,
        &format!("/admin/users/{}/remove", owner.id),
        "",
        Some(&admin),
    )
    .await;
    assert_eq!(location(&response), "/admin/dashboard");

    assert!(state.store().get_user(owner.id).await.unwrap().is_none());
    assert!(state.store().get_property(property.id).await.unwrap().is_none());
    assert!(state
        .store()
        .list_property_payments(property.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn admin_accounts_cannot_be_removed() {
    let (state, app) = spawn_app().await;
    let admin = admin_cookie(&app).await;

    let seeded = state
        .store()
        .get_user_by_email(ADMIN_EMAIL)
        .await
        .unwrap()
        .unwrap();

    let response = post_form(
        &app,
        &format!("/admin/users/{}/remove", seeded.id),
        "",
        Some(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert!(state.store().get_user(seeded.id).await.unwrap().is_some());
}

#[tokio::test]
async fn admin_can_remove_any_property() {
    let (state, app) = spawn_app().await;
    let admin = admin_cookie(&app).await;

    register(&app, "Bob Stone", "bob@example.com", PASSWORD, "owner").await;
    let owner = state
        .store()
        .get_user_by_email("bob@example.com")
        .await
        .unwrap()
        .unwrap();

    let property = state
        .store()
        .add_property(NewProperty {
            owner_id: owner.id,
            title: "Moderated".to_string(),
            description: "d".to_string(),
            location: "Anywhere".to_string(),
            rent_amount: Decimal::new(800, 0),
            property_type: PropertyType::Apartment,
            main_image_path: None,
        })
        .await
        .unwrap();

    state
        .store()
        .upsert_payment(
            property.id,
            owner.id,
            "2024-06-01".parse().unwrap(),
            Decimal::new(800, 0),
            PaymentStatus::Paid,
        )
        .await
        .unwrap();

    let response = post_form(
        &app,
        &format!("/admin/properties/{}/remove", property.id),
        "",
        Some(&admin),
    )
    .await;
    assert_eq!(location(&response), "/admin/dashboard");

    assert!(state.store().get_property(property.id).await.unwrap().is_none());
    assert!(state
        .store()
        .list_property_payments(property.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn moderation_endpoints_reject_non_admins() {
    let (state, app) = spawn_app().await;

    let owner_cookie = register(&app, "Bob", "bob@example.com", PASSWORD, "owner").await;
    register(&app, "Alice", "alice@example.com", PASSWORD, "tenant").await;
    let alice = state
        .store()
        .get_user_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();

    let response = post_form(
        &app,
        &format!("/admin/users/{}/remove", alice.id),
        "",
        Some(&owner_cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    assert!(state.store().get_user(alice.id).await.unwrap().is_some());
}
