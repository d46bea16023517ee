//! Cart route handlers.
//!
//! Every handler builds a [`SessionCart`] from the request's session, so the
//! cart lives entirely in the session record. Mutations redirect back to the
//! cart page (303 See Other).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopcart_core::{CurrencyCode, Price, ProductId};

use crate::cart::{CartError, ProductCatalog, SessionCart, SessionStore};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::state::AppState;

/// Path of the cart page.
pub const CART_PATH: &str = "/cart";

/// Cart item display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u64,
}

impl CartView {
    /// Resolve `cart` against `catalog` into display data.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the catalog lookup fails or the cart holds
    /// unreadable prices.
    pub async fn build<S: SessionStore, C: ProductCatalog>(
        cart: &SessionCart<S>,
        catalog: &C,
        currency: CurrencyCode,
    ) -> std::result::Result<Self, CartError> {
        let money = |amount| Price::new(amount, currency).display();

        let items = cart
            .lines(catalog)
            .await?
            .map(|line| {
                line.map(|line| CartItemView {
                    product_id: line.product.id,
                    name: line.product.name,
                    slug: line.product.slug,
                    quantity: line.quantity,
                    price: money(line.price),
                    line_price: money(line.total_price),
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            items,
            total: money(cart.total()?),
            item_count: cart.size(),
        })
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Replace the current quantity instead of adding to it.
    #[serde(default)]
    pub update: bool,
}

const fn default_quantity() -> u32 {
    1
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub title: &'static str,
    pub cart: CartView,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

async fn load_cart(state: &AppState, session: Session) -> Result<SessionCart<Session>> {
    Ok(SessionCart::initialize(session, state.config().cart_session_key.as_str()).await?)
}

/// Display cart page.
///
/// # Errors
///
/// Returns 500 if the session or catalog fails, or the cart is corrupted.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<CartShowTemplate> {
    let cart = load_cart(&state, session).await?;
    let cart = CartView::build(&cart, state.catalog(), state.config().currency).await?;

    Ok(CartShowTemplate { title: "Cart", cart })
}

/// Add a product to the cart, or set its quantity when `update` is set.
///
/// # Errors
///
/// Returns 400 for a zero quantity, 404 if the product does not exist.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<ProductId>,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    if form.quantity == 0 && !form.update {
        return Err(AppError::BadRequest(
            "quantity must be at least 1".to_string(),
        ));
    }

    let product = state
        .catalog()
        .find_by_id(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    let mut cart = load_cart(&state, session).await?;
    cart.add(&product, form.quantity, form.update).await?;

    let id = product_id.to_string();
    add_breadcrumb("cart", "Added product", Some(&[("product_id", id.as_str())]));

    Ok(Redirect::to(CART_PATH))
}

/// Remove a product from the cart. Unknown products are ignored.
///
/// # Errors
///
/// Returns 500 if the session cannot be read or written.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<ProductId>,
) -> Result<Redirect> {
    let mut cart = load_cart(&state, session).await?;

    if cart.remove(product_id).await? {
        let id = product_id.to_string();
        add_breadcrumb("cart", "Removed product", Some(&[("product_id", id.as_str())]));
    }

    Ok(Redirect::to(CART_PATH))
}

/// Empty the cart.
///
/// The stored cart is deleted without being read, so a corrupted cart can
/// still be cleared.
///
/// # Errors
///
/// Returns 500 if the session cannot be written.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    SessionCart::clear_session(&session, state.config().cart_session_key.as_str()).await?;
    add_breadcrumb("cart", "Cleared cart", None);

    Ok(Redirect::to(CART_PATH))
}

/// Get cart count badge.
///
/// # Errors
///
/// Returns 500 if the session cannot be read.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<CartCountTemplate> {
    let cart = load_cart(&state, session).await?;

    Ok(CartCountTemplate { count: cart.size() })
}
