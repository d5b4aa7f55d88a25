//! End-to-end checks of the HTTP surface over an in-memory database.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use dwell_api::auth::AppStateInner;
use dwell_api::dispatcher::StaleBroadcaster;
use dwell_api::uploads::ImageStore;
use dwell_db::Database;

const SECRET: &str = "route-test-secret";

struct Harness {
    app: Router,
    _uploads: TempDir,
}

async fn harness() -> Harness {
    let uploads = TempDir::new().expect("temp dir");
    let images = ImageStore::new(uploads.path().to_path_buf())
        .await
        .expect("image store");
    let db = Database::open_in_memory().expect("in-memory database");
    let state = Arc::new(AppStateInner::new(
        db,
        StaleBroadcaster::new(),
        SECRET.to_string(),
        images,
    ));
    Harness {
        app: dwell_api::router(state),
        _uploads: uploads,
    }
}

fn encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.expect("router response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    (status, bytes.to_vec())
}

async fn post_form(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    pairs: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut builder = Request::post(uri).header(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = builder.body(Body::from(form_body(pairs))).unwrap();
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn get_json(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let (status, bytes) = send(app, builder.body(Body::empty()).unwrap()).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

/// Sign up and log in, returning the bearer token.
async fn account(app: &Router, name: &str) -> String {
    let email = format!("{}@example.com", name.to_lowercase());
    let (status, body) = post_form(
        app,
        "/auth/signup",
        None,
        &[
            ("name", name),
            ("email", &email),
            ("password", "abcd!1234"),
            ("phoneNumber", "010-1234-5678"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["redirect"], "/login");

    let (status, body) = post_form(
        app,
        "/auth/login",
        None,
        &[("email", &email), ("password", "abcd!1234")],
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().expect("token").to_string()
}

fn listing(price: &str) -> Vec<(&'static str, String)> {
    vec![
        ("title", "Garden flat".to_string()),
        ("description", "Ground floor flat with a private garden".to_string()),
        ("price", price.to_string()),
        ("address", "5 Seongsu-ro".to_string()),
        ("region", "서울 성동구".to_string()),
    ]
}

async fn create_listing(app: &Router, token: &str) -> String {
    let fields = listing("65000");
    let pairs: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
    let (status, body) = post_form(app, "/properties", Some(token), &pairs).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["redirect"], "/");

    let (_, list) = get_json(app, "/properties", None).await;
    list[0]["id"].as_str().expect("listing id").to_string()
}

#[tokio::test]
async fn duplicate_sign_up_is_conflict_with_echo() {
    let h = harness().await;
    account(&h.app, "Minji").await;

    let (status, body) = post_form(
        &h.app,
        "/auth/signup",
        None,
        &[
            ("name", "Minji Again"),
            ("email", "minji@example.com"),
            ("password", "abcd!1234"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["name"], "Minji Again");
    assert_eq!(body["email"], "minji@example.com");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let h = harness().await;
    account(&h.app, "Jisoo").await;

    let (status, body) = post_form(
        &h.app,
        "/auth/login",
        None,
        &[("email", "jisoo@example.com"), ("password", "wrong!pass")],
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password.");
}

#[tokio::test]
async fn create_listing_requires_login_and_valid_form() {
    let h = harness().await;
    let fields = listing("-5");
    let pairs: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();

    let (status, _) = post_form(&h.app, "/properties", None, &pairs).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = account(&h.app, "Seller").await;
    let (status, body) = post_form(&h.app, "/properties", Some(&token), &pairs).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["title"], "Garden flat");
    assert_eq!(body["price"], "-5");

    let (_, list) = get_json(&h.app, "/properties", None).await;
    assert_eq!(list.as_array().map(Vec::len), Some(0));

    let id = create_listing(&h.app, &token).await;
    let (status, detail) = get_json(&h.app, &format!("/properties/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["property"]["status"], "AVAILABLE");
    assert_eq!(detail["ownerName"], "Seller");
    assert_eq!(detail["ownerEmail"], "seller@example.com");
    assert_eq!(detail["ownerPhoneNumber"], "010-1234-5678");
    assert_eq!(detail["isOwner"], false);
}

#[tokio::test]
async fn region_filter_narrows_listing() {
    let h = harness().await;
    let token = account(&h.app, "Seller").await;
    create_listing(&h.app, &token).await;

    let (_, seoul) = get_json(&h.app, &format!("/properties?region={}", encode("서울")), None).await;
    assert_eq!(seoul.as_array().map(Vec::len), Some(1));

    let (_, busan) = get_json(&h.app, &format!("/properties?region={}", encode("부산")), None).await;
    assert_eq!(busan.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn only_owner_can_edit_listing() {
    let h = harness().await;
    let owner = account(&h.app, "Owner").await;
    let stranger = account(&h.app, "Stranger").await;
    let id = create_listing(&h.app, &owner).await;
    let uri = format!("/properties/{}", id);

    let (status, _) = get_json(&h.app, &format!("{}/edit", uri), Some(&stranger)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = post_form(&h.app, &uri, Some(&stranger), &[("status", "SOLD")]).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");

    let mut fields = listing("70000");
    fields.push(("status", "SOLD".to_string()));
    let pairs: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
    let (status, body) = post_form(&h.app, &uri, Some(&owner), &pairs).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["redirect"], uri.as_str());

    let (_, detail) = get_json(&h.app, &uri, Some(&owner)).await;
    assert_eq!(detail["isOwner"], true);
    assert_eq!(detail["property"]["status"], "SOLD");
    assert_eq!(detail["property"]["price"], 70000.0);
}

#[tokio::test]
async fn inquiry_answered_by_owner_only() {
    let h = harness().await;
    let owner = account(&h.app, "Owner").await;
    let buyer = account(&h.app, "Buyer").await;
    let id = create_listing(&h.app, &owner).await;

    let (status, _) = post_form(
        &h.app,
        &format!("/properties/{}/inquiries", id),
        None,
        &[("content", "Is parking included?")],
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = post_form(
        &h.app,
        &format!("/properties/{}/inquiries", id),
        Some(&buyer),
        &[("content", "Is parking included?")],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert!(body.get("redirect").is_none());

    let (_, detail) = get_json(&h.app, &format!("/properties/{}", id), None).await;
    let inquiry_id = detail["inquiries"][0]["id"].as_str().expect("inquiry id").to_string();
    assert_eq!(detail["inquiries"][0]["askerName"], "Buyer");
    let answer_uri = format!("/inquiries/{}/answer", inquiry_id);

    let (status, _) = post_form(&h.app, &answer_uri, Some(&buyer), &[("answer", "Yes")]).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) =
        post_form(&h.app, &answer_uri, Some(&owner), &[("answer", "One space, yes.")]).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (_, detail) = get_json(&h.app, &format!("/properties/{}", id), None).await;
    assert_eq!(detail["inquiries"][0]["answer"], "One space, yes.");
}

#[tokio::test]
async fn inquiry_on_missing_listing_is_not_found() {
    let h = harness().await;
    let buyer = account(&h.app, "Buyer").await;

    let (status, _) = post_form(
        &h.app,
        &format!("/properties/{}/inquiries", uuid::Uuid::new_v4()),
        Some(&buyer),
        &[("content", "Still available?")],
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn small_upload_is_stored_and_served() {
    let h = harness().await;
    let token = account(&h.app, "Seller").await;
    let payload = b"tiny image bytes".to_vec();

    let anonymous = Request::post("/images?filename=photo.png")
        .body(Body::from(payload.clone()))
        .unwrap();
    let (status, _) = send(&h.app, anonymous).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let empty = Request::post("/images?filename=photo.png")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&h.app, empty).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let upload = Request::post("/images?filename=Photo.PNG")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(payload.clone()))
        .unwrap();
    let (status, bytes) = send(&h.app, upload).await;
    assert_eq!(status, StatusCode::CREATED);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let url = body["url"].as_str().expect("url").to_string();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with(".png"));
    assert_eq!(body["size"], payload.len() as u64);

    let (status, served) = send(&h.app, Request::get(&url).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, payload);
}
