//! Static content page route handlers.
//!
//! The home and about pages render fixed title/content pairs.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Redirect};
use tracing::instrument;

use crate::filters;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/index.html")]
pub struct IndexTemplate {
    pub title: &'static str,
    pub content: &'static str,
}

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub title: &'static str,
    pub content: &'static str,
}

/// Display the home page.
#[instrument]
pub async fn index() -> impl IntoResponse {
    IndexTemplate {
        title: "Home",
        content: "Home",
    }
}

/// Display the about page.
#[instrument]
pub async fn about() -> impl IntoResponse {
    AboutTemplate {
        title: "About page",
        content: "About page",
    }
}

/// Redirect `/about` to the canonical `/about/`.
pub async fn about_redirect() -> Redirect {
    Redirect::permanent("/about/")
}
