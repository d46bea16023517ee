//! Shopcart Core - Shared domain types.
//!
//! This crate provides the types shared by the storefront server and the CLI:
//! - `storefront` - Public site with the session-backed cart
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product ids, products, cart line items, and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
