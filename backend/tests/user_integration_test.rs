//! Integration tests for profile and admin user endpoints

mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_profile_and_password() {
    let app = common::TestApp::new().await;
    let (email, token) = app.register_user().await;

    let (status, body) = app
        .put(
            "/users/me",
            Some(&token),
            json!({ "name": "Renamed", "password": "changed1" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Renamed");
    assert_eq!(body["user"]["email"], email);

    let (status, _) = app
        .post("/auth/login", None, json!({ "email": email, "password": "secret1" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post("/auth/login", None, json!({ "email": email, "password": "changed1" }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_email_to_taken_one() {
    let app = common::TestApp::new().await;
    let (taken, _) = app.register_user().await;
    let (_, token) = app.register_user().await;

    let (status, body) = app
        .put("/users/me", Some(&token), json!({ "email": taken }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_avatar_upload_and_admin_delete() {
    let app = common::TestApp::new().await;
    let (_, admin_token) = app.register_user().await;
    let (email, token) = app.register_user().await;

    let (status, body) = app.upload("/users/me/image", &token, "image/gif", b"GIF89a").await;
    assert_eq!(status, StatusCode::OK);
    let avatar = body["user"]["imagePath"].as_str().unwrap().to_string();
    assert!(avatar.starts_with("/uploads/users/"));
    assert!(app.file_on_disk(&avatar).exists());

    let (status, listed) = app.get("/admin/users", Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    let id = listed["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == email.as_str())
        .map(|u| u["id"].as_str().unwrap().to_string())
        .unwrap();

    let (status, body) = app.delete(&format!("/admin/users/{}", id), Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");
    assert!(!app.file_on_disk(&avatar).exists());

    let (status, _) = app.get(&format!("/admin/users/{}", id), Some(&admin_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_concurrent_avatar_uploads_keep_one_file() {
    let app = common::TestApp::new().await;
    let (_, token) = app.register_user().await;

    let (first, second) = tokio::join!(
        app.upload("/users/me/image", &token, "image/png", b"png"),
        app.upload("/users/me/image", &token, "image/png", b"png"),
    );
    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(second.0, StatusCode::OK);

    let (_, body) = app.get("/users/me", Some(&token)).await;
    let current = body["user"]["imagePath"].as_str().unwrap();
    assert!(app.file_on_disk(current).exists());
    let stored = std::fs::read_dir(app.upload_dir.path().join("users"))
        .unwrap()
        .count();
    assert_eq!(stored, 1);
}
