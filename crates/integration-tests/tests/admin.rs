//! Login, the admin guard and catalog management over HTTP.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};

use lustre_core::{ItemFields, Price, Role};
use lustre_integration_tests::{TEST_PASSWORD, TestApp, cart_badge, location};

fn item_form(name: &str, price: &str) -> Form {
    Form::new()
        .text("name", name.to_owned())
        .text("description", "Hand finished")
        .text("price", price.to_owned())
        .text("carat", "1.25")
        .text("category", "Rings")
        .text("image_url", "")
}

fn stored_images(app: &TestApp) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(app.static_dir.join("images"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_wrong_password_is_refused() {
    let app = TestApp::spawn().await;
    app.create_user("admin", Role::Admin).await;
    let client = app.visitor();

    let response = app.log_in(&client, "admin", "not-the-password").await;
    assert_eq!(location(&response).as_deref(), Some("/login"));

    let body = app.page(&client, "/login").await;
    assert!(body.contains("Invalid username or password"));

    let response = app.get(&client, "/admin").await;
    assert_eq!(location(&response).as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_incomplete_login_form_is_refused() {
    let app = TestApp::spawn().await;
    app.create_user("admin", Role::Admin).await;
    let client = app.visitor();

    let response = client
        .post(app.url("/login"))
        .form(&[("username", "admin")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/login"));

    let body = app.page(&client, "/login").await;
    assert!(body.contains("Invalid username or password"));

    let response = app.get(&client, "/admin").await;
    assert_eq!(location(&response).as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_anonymous_visitor_is_sent_to_login() {
    let app = TestApp::spawn().await;
    let client = app.visitor();

    let response = app.get(&client, "/admin/add").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/login"));

    let body = app.page(&client, "/login").await;
    assert!(body.contains("Admin access required"));
}

#[tokio::test]
async fn test_viewer_cannot_add_items() {
    let app = TestApp::spawn().await;
    app.create_user("viewer", Role::Viewer).await;
    let client = app.visitor();
    app.log_in(&client, "viewer", TEST_PASSWORD).await;

    let response = client
        .post(app.url("/admin/add"))
        .multipart(item_form("Sneaky Ring", "10"))
        .send()
        .await
        .unwrap();

    assert_eq!(location(&response).as_deref(), Some("/login"));
    assert_eq!(app.item_count().await, 0);
}

#[tokio::test]
async fn test_admin_adds_item() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;

    let response = admin
        .post(app.url("/admin/add"))
        .multipart(item_form("Solitaire", "1250.00").text("is_featured", "on"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response).as_deref(), Some("/admin"));

    let body = app.page(&admin, "/admin").await;
    assert!(body.contains("Jewelry item added successfully"));
    assert!(body.contains("Solitaire"));
    assert!(body.contains("$1250.00"));
    assert!(body.contains("1.25 ct"));

    let catalog = app.page(&app.visitor(), "/?category=Rings").await;
    assert!(catalog.contains("Solitaire"));
}

#[tokio::test]
async fn test_invalid_form_is_shown_again() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;

    let response = admin
        .post(app.url("/admin/add"))
        .multipart(item_form("Solitaire", "a lot"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.text().await.unwrap();
    assert!(body.contains("Price must be a number"));
    assert!(body.contains(r#"value="Solitaire""#));
    assert_eq!(app.item_count().await, 0);
}

#[tokio::test]
async fn test_image_upload() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;

    let png = Part::bytes(b"\x89PNG\r\n\x1a\nfake".to_vec()).file_name("my ring.png");
    let response = admin
        .post(app.url("/admin/add"))
        .multipart(item_form("Pictured Ring", "99").part("image", png))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response).as_deref(), Some("/admin"));

    let stored: Vec<_> = std::fs::read_dir(app.static_dir.join("images"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].ends_with("-my_ring.png"));

    let image = app
        .get(&app.visitor(), &format!("/static/images/{}", stored[0]))
        .await;
    assert_eq!(image.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_disallowed_upload_type_is_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;

    let script = Part::bytes(b"#!/bin/sh".to_vec()).file_name("ring.sh");
    let response = admin
        .post(app.url("/admin/add"))
        .multipart(item_form("Ring", "99").part("image", script))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.item_count().await, 0);
    assert_eq!(
        std::fs::read_dir(app.static_dir.join("images")).unwrap().count(),
        0
    );
}

#[tokio::test]
async fn test_oversized_upload_is_shown_again() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;

    let big = Part::bytes(vec![0_u8; 17 * 1024 * 1024]).file_name("big.png");
    let response = admin
        .post(app.url("/admin/add"))
        .multipart(item_form("Heavy Ring", "99").part("image", big))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.text().await.unwrap();
    assert!(body.contains("Upload must be at most 16 MB"));
    assert!(body.contains(r#"value="Heavy Ring""#));
    assert_eq!(app.item_count().await, 0);
    assert!(stored_images(&app).is_empty());
}

#[tokio::test]
async fn test_replaced_and_deleted_images_are_removed() {
    let app = TestApp::spawn().await;
    let ring = app
        .seed_item(ItemFields::new("Pictured Ring", Price::from_cents(9_900)))
        .await;
    let admin = app.admin().await;
    let edit_url = app.url(&format!("/admin/edit/{}", ring.id));

    let first = Part::bytes(b"GIF89a-first".to_vec()).file_name("first.gif");
    admin
        .post(edit_url.clone())
        .multipart(item_form("Pictured Ring", "99").part("image", first))
        .send()
        .await
        .unwrap();
    let [first_name] = <[String; 1]>::try_from(stored_images(&app)).unwrap();
    assert!(first_name.ends_with("-first.gif"));

    let second = Part::bytes(b"GIF89a-second".to_vec()).file_name("second.gif");
    let response = admin
        .post(edit_url)
        .multipart(item_form("Pictured Ring", "99").part("image", second))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response).as_deref(), Some("/admin"));

    let [second_name] = <[String; 1]>::try_from(stored_images(&app)).unwrap();
    assert!(second_name.ends_with("-second.gif"));

    let response = app.get(&admin, &format!("/admin/delete/{}", ring.id)).await;
    assert_eq!(location(&response).as_deref(), Some("/admin"));
    assert!(stored_images(&app).is_empty());
}

#[tokio::test]
async fn test_admin_edits_item() {
    let app = TestApp::spawn().await;
    let ring = app
        .seed_item(ItemFields::new("Old Name", Price::from_cents(1_000)).featured())
        .await;
    let admin = app.admin().await;

    let form = app.page(&admin, &format!("/admin/edit/{}", ring.id)).await;
    assert!(form.contains(r#"value="Old Name""#));
    assert!(form.contains(" checked"));

    let response = admin
        .post(app.url(&format!("/admin/edit/{}", ring.id)))
        .multipart(item_form("New Name", "20"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response).as_deref(), Some("/admin"));

    let body = app.page(&admin, "/admin").await;
    assert!(body.contains("Jewelry item updated successfully"));
    assert!(body.contains("New Name"));
    assert!(!body.contains("Old Name"));
}

#[tokio::test]
async fn test_unknown_item_is_reported() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;

    let response = app.get(&admin, "/admin/edit/404").await;
    assert_eq!(location(&response).as_deref(), Some("/admin"));
    let response = app.get(&admin, "/admin/delete/404").await;
    assert_eq!(location(&response).as_deref(), Some("/admin"));

    let body = app.page(&admin, "/admin").await;
    assert!(body.contains("Item not found"));
}

#[tokio::test]
async fn test_delete_removes_item_from_every_session() {
    let app = TestApp::spawn().await;
    let ring = app
        .seed_item(ItemFields::new("Doomed Ring", Price::from_cents(10_000)))
        .await;
    let shopper = app.visitor();
    app.get(&shopper, &format!("/add_to_cart/{}", ring.id)).await;
    app.get(&shopper, &format!("/toggle_favorite/{}", ring.id)).await;

    let admin = app.admin().await;
    app.get(&admin, &format!("/add_to_cart/{}", ring.id)).await;

    let response = app.get(&admin, &format!("/admin/delete/{}", ring.id)).await;
    assert_eq!(location(&response).as_deref(), Some("/admin"));

    let body = app.page(&admin, "/admin").await;
    assert!(body.contains("Jewelry item deleted successfully"));
    assert!(body.contains(&cart_badge(0)));

    let cart = app.page(&shopper, "/cart").await;
    assert!(cart.contains(&cart_badge(0)));
    assert!(cart.contains("Total: <strong>$0.00</strong>"));
    let favorites = app.page(&shopper, "/favorites").await;
    assert!(favorites.contains("You have no favorites yet."));
}

#[tokio::test]
async fn test_logout_keeps_cart() {
    let app = TestApp::spawn().await;
    let ring = app
        .seed_item(ItemFields::new("Ring", Price::from_cents(10_000)))
        .await;
    let admin = app.admin().await;
    app.get(&admin, &format!("/add_to_cart/{}", ring.id)).await;

    let response = app.get(&admin, "/logout").await;
    assert_eq!(location(&response).as_deref(), Some("/"));

    let body = app.page(&admin, "/").await;
    assert!(body.contains("Logged out successfully"));
    assert!(body.contains(&cart_badge(1)));
    assert!(body.contains(r#"href="/login""#));

    let response = app.get(&admin, "/admin").await;
    assert_eq!(location(&response).as_deref(), Some("/login"));
}
