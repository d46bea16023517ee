//! Integration tests for Shopcart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopcart-integration-tests
//! ```
//!
//! The storefront router runs in-process with `tower_sessions::MemoryStore`
//! and an in-memory catalog, so no database or server is needed. This module
//! holds the shared test client.

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::collections::HashMap;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::cookie::time::{Duration, OffsetDateTime};
use tower_sessions::session::{Id, Record};
use tower_sessions::{MemoryStore, SessionStore};

use shopcart_core::{Product, ProductId};
use shopcart_storefront::build_router;
use shopcart_storefront::cart::{CatalogBackend, MemoryCatalog};
use shopcart_storefront::config::StorefrontConfig;
use shopcart_storefront::middleware::SESSION_COOKIE_NAME;
use shopcart_storefront::state::AppState;

/// A response flattened for assertions.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `Location` header, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// In-process client that carries the session cookie between requests.
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    /// Client with its own cookie jar over `app`.
    #[must_use]
    pub const fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    /// Client that already holds the session cookie for `session_id`.
    #[must_use]
    pub fn with_session(app: Router, session_id: Id) -> Self {
        Self {
            app,
            cookie: Some(format!("{SESSION_COOKIE_NAME}={session_id}")),
        }
    }

    /// Send a GET request.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self
            .request("GET", uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Send a form-encoded POST request.
    pub async fn post_form(&mut self, uri: &str, form: &str) -> TestResponse {
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_owned()))
            .unwrap();
        self.send(request).await
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            && let Some(pair) = set_cookie.split(';').next()
        {
            self.cookie = Some(pair.to_owned());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}

/// Minimal configuration for in-process tests.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig::from_source(|key| match key {
        "STOREFRONT_DATABASE_URL" => Some("postgres://localhost/unused".to_owned()),
        "STOREFRONT_BASE_URL" => Some("http://localhost:3000".to_owned()),
        _ => None,
    })
    .unwrap()
}

/// Router over an in-memory catalog and session store.
#[must_use]
pub fn test_app(catalog: MemoryCatalog) -> Router {
    test_app_with_store(catalog, MemoryStore::default())
}

/// Router over an in-memory catalog and the given session store.
#[must_use]
pub fn test_app_with_store(catalog: MemoryCatalog, store: MemoryStore) -> Router {
    let state = AppState::new(test_config(), CatalogBackend::Memory(catalog));
    build_router(state, store)
}

/// Save a session record holding `data` and return its id.
pub async fn seed_session(store: &MemoryStore, data: HashMap<String, Value>) -> Id {
    let record = Record {
        id: Id::default(),
        data,
        expiry_date: OffsetDateTime::now_utc() + Duration::days(1),
    };
    store.save(&record).await.unwrap();
    record.id
}

/// A catalog product priced in cents.
#[must_use]
pub fn product(id: i32, name: &str, cents: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_owned(),
        slug: name.to_lowercase().replace(' ', "-"),
        description: String::new(),
        price: Decimal::new(cents, 2),
    }
}
