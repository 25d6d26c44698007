mod support;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use campsite_api::{config::Env, create_router, models::User, token};
use serde_json::{Value, json};
use std::sync::Arc;
use support::{InMemoryRepository, TEST_JWT_SECRET, app_state, app_state_with_failing_storage};
use tower::ServiceExt;

// --- Helpers ---

/// A fresh router plus a handle to its in-memory repository for post-state
/// assertions.
fn test_app(env: Env) -> (Router, Arc<InMemoryRepository>) {
    let repo = Arc::new(InMemoryRepository::default());
    let router = create_router(app_state(repo.clone(), env));
    (router, repo)
}

fn bearer_for(user: &User) -> String {
    let token = token::issue(TEST_JWT_SECRET, user.id, 3600).unwrap();
    format!("Bearer {token}")
}

fn json_request(method: &str, uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

const MULTIPART_BOUNDARY: &str = "test-upload-boundary";

/// Builds a single-part multipart/form-data request carrying one file field.
fn multipart_request(uri: &str, auth: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"imageFile\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, auth)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// --- Public surface ---

#[tokio::test]
async fn test_anonymous_can_list_campsites() {
    let (app, repo) = test_app(Env::Production);
    repo.seed_campsite("React Lake Campground");

    let response = app
        .oneshot(empty_request("GET", "/campsites", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "React Lake Campground");
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = test_app(Env::Production);

    let response = app
        .oneshot(empty_request("GET", "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// --- Campsite moderation ---

#[tokio::test]
async fn test_anonymous_cannot_create_campsite() {
    let (app, repo) = test_app(Env::Production);

    let response = app
        .oneshot(json_request(
            "POST",
            "/campsites",
            None,
            json!({
                "name": "Chrome River Campground",
                "description": "Canyon views",
                "image": "public/images/chrome-river.jpg",
                "elevation": 877,
                "cost": 65.0
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(repo.campsites.read().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_admin_cannot_create_campsite() {
    let (app, repo) = test_app(Env::Production);
    let user = repo.seed_user("camper", "hunter2", false);

    let response = app
        .oneshot(json_request(
            "POST",
            "/campsites",
            Some(&bearer_for(&user)),
            json!({
                "name": "Chrome River Campground",
                "description": "Canyon views",
                "image": "public/images/chrome-river.jpg",
                "elevation": 877,
                "cost": 65.0
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(repo.campsites.read().unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_creates_campsite() {
    let (app, repo) = test_app(Env::Production);
    let admin = repo.seed_user("moderator", "hunter2", true);

    let response = app
        .oneshot(json_request(
            "POST",
            "/campsites",
            Some(&bearer_for(&admin)),
            json!({
                "name": "Chrome River Campground",
                "description": "Canyon views",
                "image": "public/images/chrome-river.jpg",
                "elevation": 877,
                "cost": 65.0,
                "featured": true
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Chrome River Campground");
    assert_eq!(repo.campsites.read().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_campsite_name_conflicts() {
    let (app, repo) = test_app(Env::Production);
    let admin = repo.seed_user("moderator", "hunter2", true);
    repo.seed_campsite("React Lake Campground");

    let response = app
        .oneshot(json_request(
            "POST",
            "/campsites",
            Some(&bearer_for(&admin)),
            json!({
                "name": "React Lake Campground",
                "description": "Same name again",
                "image": "public/images/react-lake.jpg",
                "elevation": 877,
                "cost": 65.0
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(repo.campsites.read().unwrap().len(), 1);
}

// --- Comments: ownership and moderation ---

#[tokio::test]
async fn test_author_can_post_and_edit_own_comment() {
    let (app, repo) = test_app(Env::Production);
    let author = repo.seed_user("camper", "hunter2", false);
    let campsite = repo.seed_campsite("React Lake Campground");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/campsites/{}/comments", campsite.id),
            Some(&bearer_for(&author)),
            json!({ "rating": 5, "text": "Great swimming hole." }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["author_id"], json!(author.id));

    let comment_id = created["id"].as_str().unwrap();
    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/campsites/{}/comments/{}", campsite.id, comment_id),
            Some(&bearer_for(&author)),
            json!({ "text": "Great swimming hole, bring bug spray." }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["text"], "Great swimming hole, bring bug spray.");
}

#[tokio::test]
async fn test_comment_rating_must_be_in_range() {
    let (app, repo) = test_app(Env::Production);
    let author = repo.seed_user("camper", "hunter2", false);
    let campsite = repo.seed_campsite("React Lake Campground");

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/campsites/{}/comments", campsite.id),
            Some(&bearer_for(&author)),
            json!({ "rating": 6, "text": "off the scale" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(repo.comments.read().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_owner_cannot_delete_comment() {
    let (app, repo) = test_app(Env::Production);
    let author = repo.seed_user("author", "hunter2", false);
    let other = repo.seed_user("other", "hunter2", false);
    let campsite = repo.seed_campsite("React Lake Campground");
    let comment = repo.seed_comment(campsite.id, &author, "Lovely spot.");

    let response = app
        .oneshot(empty_request(
            "DELETE",
            &format!("/campsites/{}/comments/{}", campsite.id, comment.id),
            Some(&bearer_for(&other)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(repo.comments.read().unwrap().contains_key(&comment.id));
}

#[tokio::test]
async fn test_admin_can_delete_any_comment() {
    let (app, repo) = test_app(Env::Production);
    let author = repo.seed_user("author", "hunter2", false);
    let admin = repo.seed_user("moderator", "hunter2", true);
    let campsite = repo.seed_campsite("React Lake Campground");
    let comment = repo.seed_comment(campsite.id, &author, "Lovely spot.");

    let response = app
        .oneshot(empty_request(
            "DELETE",
            &format!("/campsites/{}/comments/{}", campsite.id, comment.id),
            Some(&bearer_for(&admin)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(repo.comments.read().unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_clears_all_comments_on_campsite() {
    let (app, repo) = test_app(Env::Production);
    let author = repo.seed_user("author", "hunter2", false);
    let admin = repo.seed_user("moderator", "hunter2", true);
    let campsite = repo.seed_campsite("React Lake Campground");
    let untouched = repo.seed_campsite("Chrome River Campground");
    repo.seed_comment(campsite.id, &author, "first");
    repo.seed_comment(campsite.id, &author, "second");
    let kept = repo.seed_comment(untouched.id, &author, "elsewhere");

    let response = app
        .clone()
        .oneshot(empty_request(
            "DELETE",
            &format!("/campsites/{}/comments", campsite.id),
            Some(&bearer_for(&admin)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["deleted"], 2);

    // The swept campsite reads back empty; the other campsite is untouched.
    let response = app
        .oneshot(empty_request(
            "GET",
            &format!("/campsites/{}/comments", campsite.id),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body.as_array().unwrap().is_empty());
    assert!(repo.comments.read().unwrap().contains_key(&kept.id));
}

#[tokio::test]
async fn test_non_admin_cannot_clear_comments() {
    let (app, repo) = test_app(Env::Production);
    let author = repo.seed_user("author", "hunter2", false);
    let other = repo.seed_user("other", "hunter2", false);
    let campsite = repo.seed_campsite("React Lake Campground");
    repo.seed_comment(campsite.id, &author, "first");
    repo.seed_comment(campsite.id, &author, "second");

    let response = app
        .oneshot(empty_request(
            "DELETE",
            &format!("/campsites/{}/comments", campsite.id),
            Some(&bearer_for(&other)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(repo.comments.read().unwrap().len(), 2);
}

// --- Image upload ---

#[tokio::test]
async fn test_admin_uploads_image() {
    let (app, repo) = test_app(Env::Production);
    let admin = repo.seed_user("moderator", "hunter2", true);

    let response = app
        .oneshot(multipart_request(
            "/imageUpload",
            &bearer_for(&admin),
            "site.jpg",
            b"jpegbytes",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["filename"], "site.jpg");
    assert_eq!(body["path"], "public/images/site.jpg");
}

#[tokio::test]
async fn test_upload_rejects_non_image() {
    let (app, repo) = test_app(Env::Production);
    let admin = repo.seed_user("moderator", "hunter2", true);

    let response = app
        .oneshot(multipart_request(
            "/imageUpload",
            &bearer_for(&admin),
            "notes.txt",
            b"plain text",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_storage_failure_is_internal_error() {
    let repo = Arc::new(InMemoryRepository::default());
    let admin = repo.seed_user("moderator", "hunter2", true);
    let app = create_router(app_state_with_failing_storage(repo, Env::Production));

    let response = app
        .oneshot(multipart_request(
            "/imageUpload",
            &bearer_for(&admin),
            "site.jpg",
            b"jpegbytes",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// --- Identity lifecycle ---

#[tokio::test]
async fn test_signup_then_duplicate_username_conflicts() {
    let (app, repo) = test_app(Env::Production);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users/signup",
            None,
            json!({ "username": "camper", "password": "hunter2" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["username"], "camper");
    assert_eq!(body["admin"], false);
    assert!(body.get("password_hash").is_none());

    let response = app
        .oneshot(json_request(
            "POST",
            "/users/signup",
            None,
            json!({ "username": "camper", "password": "different" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(repo.users.read().unwrap().len(), 1);
}

#[tokio::test]
async fn test_login_issues_token_and_session_cookie() {
    let (app, repo) = test_app(Env::Production);
    let user = repo.seed_user("camper", "hunter2", false);

    let basic = format!("Basic {}", BASE64.encode("camper:hunter2"));
    let response = app
        .clone()
        .oneshot(empty_request("POST", "/users/login", Some(&basic)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session-id="));

    let body = body_json(response).await;
    let access_token = body["access_token"].as_str().unwrap();
    assert_eq!(token::validate(TEST_JWT_SECRET, access_token), Ok(user.id));

    // The cookie alone authenticates a follow-up request.
    let session_pair = cookie.split(';').next().unwrap().to_string();
    let request = Request::builder()
        .method("GET")
        .uri("/me")
        .header(header::COOKIE, session_pair)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], "camper");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let (app, repo) = test_app(Env::Production);
    repo.seed_user("camper", "hunter2", false);

    let basic = format!("Basic {}", BASE64.encode("camper:nope"));
    let response = app
        .oneshot(empty_request("POST", "/users/login", Some(&basic)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_listing_is_admin_only() {
    let (app, repo) = test_app(Env::Production);
    let user = repo.seed_user("camper", "hunter2", false);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/users", Some(&bearer_for(&user))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = repo.seed_user("moderator", "hunter2", true);
    let response = app
        .oneshot(empty_request("GET", "/users", Some(&bearer_for(&admin))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}
