//! Integration tests for the content pages and health checks.

use axum::http::StatusCode;

use shopcart_integration_tests::{TestClient, test_app};
use shopcart_storefront::cart::MemoryCatalog;

fn client() -> TestClient {
    TestClient::new(test_app(MemoryCatalog::default()))
}

#[tokio::test]
async fn test_home_page() {
    let resp = client().get("/").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("<h1>Home</h1>"));
    assert!(resp.body.contains("<title>Home | Shopcart</title>"));
}

#[tokio::test]
async fn test_about_page() {
    let resp = client().get("/about/").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("<h1>About page</h1>"));
    assert!(resp.body.contains("<p>About page</p>"));
}

#[tokio::test]
async fn test_about_without_slash_redirects() {
    let resp = client().get("/about").await;

    assert_eq!(resp.status, StatusCode::PERMANENT_REDIRECT);
    assert_eq!(resp.location(), Some("/about/"));
}

#[tokio::test]
async fn test_pages_do_not_create_a_session() {
    let resp = client().get("/").await;
    assert!(resp.headers.get("set-cookie").is_none());
}

#[tokio::test]
async fn test_health_checks() {
    let mut client = client();

    let live = client.get("/health").await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.body, "ok");

    let ready = client.get("/health/ready").await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let resp = client().get("/").await;
    assert!(resp.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let resp = client().get("/does-not-exist").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}
