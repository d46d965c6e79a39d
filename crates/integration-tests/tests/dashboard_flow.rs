//! Restaurant dashboard: listing, creation with cover photos, and deletion.

use axum::http::StatusCode;
use foodiefinds_core::{Role, User};
use foodiefinds_integration_tests::{BackendCall, Operation, Part, TestApp};
use foodiefinds_web::manifest::{FakeBackend, RestaurantQuery};

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

async fn chef_app() -> (TestApp, User) {
    let mut app = TestApp::new(FakeBackend::new());
    let chef = app.login_as("Chef Mario", "mario@example.com", Role::Chef).await;
    (app, chef)
}

fn create_parts<'a>(name: &'a str, cover: Option<&'a [u8]>) -> Vec<Part<'a>> {
    let mut parts = vec![
        Part::Text("name", name),
        Part::Text("description", "Handmade pasta"),
        Part::Text("cuisine", "Italian"),
    ];
    match cover {
        Some(bytes) => parts.push(Part::File {
            name: "coverPhoto",
            file_name: "front.png",
            content_type: "image/png",
            bytes,
        }),
        // a file input left empty still sends an empty part
        None => parts.push(Part::File {
            name: "coverPhoto",
            file_name: "",
            content_type: "application/octet-stream",
            bytes: &[],
        }),
    }
    parts
}

fn position(body: &str, needle: &str) -> usize {
    body.find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found in response"))
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_grid_lists_newest_first_with_owner() {
    let (mut app, chef) = chef_app().await;
    let other = app
        .backend
        .add_user("Chef Rosa", "rosa@example.com", "pw", Role::Chef)
        .await;
    app.backend.add_restaurant("Older Place", &other).await;
    app.backend.add_restaurant("Newer Place", &chef).await;

    let grid = app.htmx_get("/restaurants").await;

    assert_eq!(grid.status, StatusCode::OK);
    assert!(position(&grid.body, "Newer Place") < position(&grid.body, "Older Place"));
    assert!(grid.body.contains("By Chef Rosa"));
    assert!(grid.body.contains("By Chef Mario"));
    assert!(
        app.backend
            .calls()
            .await
            .contains(&BackendCall::FindRestaurants(RestaurantQuery::newest_with_owner(100)))
    );
}

#[tokio::test]
async fn test_only_owned_cards_have_controls() {
    let (mut app, chef) = chef_app().await;
    let other = app
        .backend
        .add_user("Chef Rosa", "rosa@example.com", "pw", Role::Chef)
        .await;
    let theirs = app.backend.add_restaurant("Rosa Cantina", &other).await;
    let mine = app.backend.add_restaurant("Mario Pasta", &chef).await;

    let grid = app.htmx_get("/restaurants").await;

    assert!(grid.body.contains(&format!("/restaurants/{}/delete", mine.id)));
    assert!(!grid.body.contains(&format!("/restaurants/{}/delete", theirs.id)));
}

#[tokio::test]
async fn test_edit_control_is_inert() {
    let (mut app, chef) = chef_app().await;
    let mine = app.backend.add_restaurant("Mario Pasta", &chef).await;

    let grid = app.htmx_get("/restaurants").await;
    let start = position(&grid.body, "title=\"Edit\"");
    let tag_start = grid.body[..start].rfind('<').expect("edit control tag");
    let tag_end = start + grid.body[start..].find('>').expect("edit control tag end");
    let tag = &grid.body[tag_start..tag_end];
    assert!(tag.starts_with("<button"));
    assert!(!tag.contains("hx-"));
    assert!(!tag.contains("href"));

    let calls_before = app.backend.calls().await.len();
    let edit = app.get(&format!("/restaurants/{}/edit", mine.id)).await;
    assert_eq!(edit.status, StatusCode::NOT_FOUND);
    assert_eq!(app.backend.calls().await.len(), calls_before);
}

#[tokio::test]
async fn test_empty_grid_invites_chefs_only() {
    let (mut chef_browser, _) = chef_app().await;
    let chef_grid = chef_browser.htmx_get("/restaurants").await;
    assert!(chef_grid.body.contains("No restaurants found."));
    assert!(chef_grid.body.contains("Add your first one!"));

    let mut customer = chef_browser.new_browser();
    customer
        .login_as("Carla", "carla@example.com", Role::Customer)
        .await;
    let customer_grid = customer.htmx_get("/restaurants").await;
    assert!(customer_grid.body.contains("No restaurants found."));
    assert!(!customer_grid.body.contains("Add your first one!"));
}

#[tokio::test]
async fn test_failed_listing_shows_empty_grid() {
    let (mut app, chef) = chef_app().await;
    app.backend.add_restaurant("Mario Pasta", &chef).await;
    app.backend.fail(Operation::FindRestaurants).await;

    let grid = app.htmx_get("/restaurants").await;

    assert_eq!(grid.status, StatusCode::OK);
    assert!(grid.body.contains("No restaurants found."));
}

// ============================================================================
// Creation
// ============================================================================

#[tokio::test]
async fn test_create_without_photo_prepends_card_and_resets_form() {
    let (mut app, chef) = chef_app().await;
    app.backend.add_restaurant("Existing Diner", &chef).await;
    app.htmx_get("/restaurants").await;

    let response = app
        .post_multipart("/restaurants", &create_parts("Trattoria Luigi", None), true)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("hx-swap-oob=\"true\""));
    assert!(position(&response.body, "Trattoria Luigi") < position(&response.body, "Existing Diner"));
    // the record returned by create has no owner relation
    assert!(response.body.contains("By Unknown"));
    assert!(response.body.contains("name=\"name\" value=\"\""));

    let calls = app.backend.calls().await;
    assert!(!calls.iter().any(|c| matches!(c, BackendCall::UploadImage { .. })));
    let payload = calls
        .iter()
        .find_map(|c| match c {
            BackendCall::CreateRestaurant(payload) => Some(payload.clone()),
            _ => None,
        })
        .expect("create was called");
    assert_eq!(payload["name"], "Trattoria Luigi");
    assert_eq!(payload["cuisine"], "Italian");
    assert!(payload.get("coverPhoto").is_none());
}

#[tokio::test]
async fn test_create_with_photo_uploads_first() {
    let (mut app, _) = chef_app().await;

    let response = app
        .post_multipart("/restaurants", &create_parts("Trattoria Luigi", Some(PNG)), true)
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let calls = app.backend.calls().await;
    let upload = calls
        .iter()
        .position(|c| {
            *c == BackendCall::UploadImage {
                entity: "restaurants".to_string(),
                property: "coverPhoto".to_string(),
                file_name: "front.png".to_string(),
            }
        })
        .expect("upload was called");
    let create = calls
        .iter()
        .position(|c| matches!(c, BackendCall::CreateRestaurant(_)))
        .expect("create was called");
    assert!(upload < create);

    let stored = app.backend.stored_restaurants().await;
    let created = stored.first().expect("restaurant stored");
    assert!(created.cover_photo.is_some());
    assert!(response.body.contains(created.card_image_url()));
}

#[tokio::test]
async fn test_non_image_file_is_not_uploaded() {
    let (mut app, _) = chef_app().await;
    let parts = vec![
        Part::Text("name", "Trattoria Luigi"),
        Part::Text("cuisine", "Italian"),
        Part::File {
            name: "coverPhoto",
            file_name: "menu.txt",
            content_type: "text/plain",
            bytes: b"pasta",
        },
    ];

    let response = app.post_multipart("/restaurants", &parts, true).await;

    assert_eq!(response.status, StatusCode::OK);
    let calls = app.backend.calls().await;
    assert!(!calls.iter().any(|c| matches!(c, BackendCall::UploadImage { .. })));
    assert!(calls.iter().any(|c| matches!(c, BackendCall::CreateRestaurant(_))));
}

#[tokio::test]
async fn test_failed_create_keeps_form_and_grid() {
    let (mut app, chef) = chef_app().await;
    app.backend.add_restaurant("Existing Diner", &chef).await;
    app.htmx_get("/restaurants").await;
    app.backend.fail(Operation::CreateRestaurant).await;

    let response = app
        .post_multipart("/restaurants", &create_parts("Trattoria Luigi", None), true)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Error saving restaurant."));
    assert!(response.body.contains("value=\"Trattoria Luigi\""));
    assert!(response.body.contains("Handmade pasta"));
    assert!(!response.body.contains("hx-swap-oob"));

    let grid = app.htmx_get("/restaurants").await;
    assert!(grid.body.contains("Existing Diner"));
    assert!(!grid.body.contains("Trattoria Luigi"));
}

#[tokio::test]
async fn test_failed_upload_skips_create() {
    let (mut app, _) = chef_app().await;
    app.backend.fail(Operation::UploadImage).await;

    let response = app
        .post_multipart("/restaurants", &create_parts("Trattoria Luigi", Some(PNG)), true)
        .await;

    assert!(response.body.contains("Error saving restaurant."));
    assert!(
        !app.backend
            .calls()
            .await
            .iter()
            .any(|c| matches!(c, BackendCall::CreateRestaurant(_)))
    );
}

#[tokio::test]
async fn test_create_without_htmx_redirects() {
    let (mut app, _) = chef_app().await;

    let ok = app
        .post_multipart("/restaurants", &create_parts("Trattoria Luigi", None), false)
        .await;
    assert_eq!(ok.location(), Some("/"));

    app.backend.fail(Operation::CreateRestaurant).await;
    let failed = app
        .post_multipart("/restaurants", &create_parts("Second Place", None), false)
        .await;
    assert_eq!(failed.location(), Some("/?error=save_failed"));
}

// ============================================================================
// Preview
// ============================================================================

#[tokio::test]
async fn test_preview_renders_data_url() {
    let (mut app, _) = chef_app().await;
    let parts = [Part::File {
        name: "coverPhoto",
        file_name: "front.png",
        content_type: "image/png",
        bytes: PNG,
    }];

    let response = app.post_multipart("/restaurants/preview", &parts, true).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("src=\"data:image/png;base64,"));
    assert!(response.header("hx-trigger").is_none());
}

#[tokio::test]
async fn test_preview_rejects_non_image() {
    let (mut app, _) = chef_app().await;
    let parts = [Part::File {
        name: "coverPhoto",
        file_name: "menu.txt",
        content_type: "text/plain",
        bytes: b"pasta",
    }];

    let response = app.post_multipart("/restaurants/preview", &parts, true).await;

    assert_eq!(response.header("hx-trigger"), Some("upload-rejected"));
    assert!(!response.body.contains("data:"));
    assert!(app.backend.calls().await.iter().all(|c| !matches!(c, BackendCall::UploadImage { .. })));
}

#[tokio::test]
async fn test_clear_preview_shows_drop_zone() {
    let (mut app, _) = chef_app().await;

    let response = app.htmx_get("/restaurants/preview/clear").await;

    assert!(response.body.contains("click to upload"));
    assert!(!response.body.contains("<img"));
}

// ============================================================================
// Deletion
// ============================================================================

#[tokio::test]
async fn test_confirmed_delete_removes_card() {
    let (mut app, chef) = chef_app().await;
    let doomed = app.backend.add_restaurant("Doomed Diner", &chef).await;
    app.backend.add_restaurant("Keeper Cafe", &chef).await;
    app.htmx_get("/restaurants").await;

    let uri = format!("/restaurants/{}/delete", doomed.id);
    let grid = app.htmx_post_form(&uri, &[("confirmed", "true")]).await;

    assert_eq!(grid.status, StatusCode::OK);
    assert!(!grid.body.contains("Doomed Diner"));
    assert!(grid.body.contains("Keeper Cafe"));
    assert_eq!(
        app.backend
            .count_calls(|c| matches!(c, BackendCall::DeleteRestaurant(_)))
            .await,
        1
    );
}

#[tokio::test]
async fn test_declined_delete_makes_no_call() {
    let (mut app, chef) = chef_app().await;
    let kept = app.backend.add_restaurant("Keeper Cafe", &chef).await;

    let uri = format!("/restaurants/{}/delete", kept.id);
    let response = app.post_form(&uri, &[("confirmed", "false")]).await;

    assert_eq!(response.location(), Some("/"));
    assert_eq!(
        app.backend
            .count_calls(|c| matches!(c, BackendCall::DeleteRestaurant(_)))
            .await,
        0
    );
    assert_eq!(app.backend.stored_restaurants().await.len(), 1);
}

#[tokio::test]
async fn test_failed_delete_keeps_card_and_alerts() {
    let (mut app, chef) = chef_app().await;
    let kept = app.backend.add_restaurant("Keeper Cafe", &chef).await;
    app.backend.fail(Operation::DeleteRestaurant).await;

    let uri = format!("/restaurants/{}/delete", kept.id);
    let grid = app.htmx_post_form(&uri, &[("confirmed", "true")]).await;
    assert!(grid.body.contains("Keeper Cafe"));
    assert!(grid.body.contains("Could not delete restaurant."));

    let page = app.post_form(&uri, &[("confirmed", "true")]).await;
    assert_eq!(page.location(), Some("/?error=delete_failed"));
}

#[tokio::test]
async fn test_confirm_page_for_known_restaurant() {
    let (mut app, chef) = chef_app().await;
    let place = app.backend.add_restaurant("Keeper Cafe", &chef).await;
    app.htmx_get("/restaurants").await;

    let page = app.get(&format!("/restaurants/{}/delete", place.id)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Delete Keeper Cafe?"));
    assert!(page.body.contains("Are you sure you want to delete this restaurant and all its menu items?"));

    let missing = app.get("/restaurants/9999/delete").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
