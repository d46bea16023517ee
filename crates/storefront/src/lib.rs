//! Shopcart Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused. The binary in `main.rs` wires it to
//! `PostgreSQL` for both the catalog and the session store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::{Router, extract::Request, middleware::from_fn};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router with sessions backed by `session_store`.
///
/// Sentry layers are added by the binary, outside this router.
pub fn build_router<S>(state: AppState, session_store: S) -> Router
where
    S: tower_sessions::SessionStore + Clone,
{
    let session_layer = middleware::create_session_layer(session_store, state.config());

    routes::routes()
        .layer(session_layer)
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}
