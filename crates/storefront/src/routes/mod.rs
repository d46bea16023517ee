//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page
//! GET  /about/                    - About page (/about redirects here)
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (catalog reachable)
//!
//! # Cart
//! GET  /cart                      - Cart page
//! POST /cart/add/{product_id}     - Add or update quantity (form: quantity, update)
//! POST /cart/remove/{product_id}  - Remove a product
//! POST /cart/clear                - Empty the cart
//! GET  /cart/count                - Cart count badge (fragment)
//! ```

pub mod cart;
pub mod health;
pub mod pages;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add/{product_id}", post(cart::add))
        .route("/remove/{product_id}", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::index))
        .route("/about/", get(pages::about))
        .route("/about", get(pages::about_redirect))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/cart", cart_routes())
}
