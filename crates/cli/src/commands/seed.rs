//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: Espresso Beans
//!     slug: espresso-beans
//!     description: Dark roast, 1 kg bag.
//!     price: "9.99"
//! ```
//!
//! Products are upserted by slug, so re-running the command updates names,
//! descriptions, and prices in place.

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use shopcart_storefront::db::{self, NewProduct, ProductRepository};

use super::{CommandError, database_url};

/// Top-level seed file layout.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub products: Vec<NewProduct>,
}

/// Parse and validate seed file contents.
///
/// # Errors
///
/// Returns `CommandError::Yaml` for malformed YAML and `CommandError::Invalid`
/// for empty names or slugs, duplicate slugs, or negative prices.
pub fn parse(content: &str) -> Result<SeedFile, CommandError> {
    let file: SeedFile = serde_yaml::from_str(content)?;

    let mut slugs = HashSet::new();
    for product in &file.products {
        if product.name.trim().is_empty() || product.slug.trim().is_empty() {
            return Err(CommandError::Invalid(
                "every product needs a name and a slug".to_string(),
            ));
        }
        if product.price < Decimal::ZERO {
            return Err(CommandError::Invalid(format!(
                "{}: price must not be negative",
                product.slug
            )));
        }
        if !slugs.insert(product.slug.as_str()) {
            return Err(CommandError::Invalid(format!(
                "duplicate slug {}",
                product.slug
            )));
        }
    }

    Ok(file)
}

/// Upsert every product in `file_path`.
///
/// # Errors
///
/// Returns `CommandError` if the file cannot be read or validated, or a
/// database operation fails.
pub async fn products(file_path: &str) -> Result<(), CommandError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading products from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: file_path.to_string(),
            source,
        })?;
    let seed = parse(&content)?;
    info!(products = seed.products.len(), "Parsed seed file");

    let pool = db::create_pool(&database_url()?).await?;
    let repo = ProductRepository::new(&pool);

    for new_product in &seed.products {
        let product = repo.upsert(new_product).await?;
        info!(id = %product.id, slug = %product.slug, price = %product.price, "Upserted product");
    }

    info!("Seeding complete!");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bundled_seed_file() {
        let seed = parse(include_str!("../../seed/products.yaml")).unwrap();
        assert_eq!(seed.products.len(), 3);
        assert_eq!(seed.products[0].price, Decimal::new(999, 2));
    }

    #[test]
    fn test_parse_rejects_duplicate_slug() {
        let yaml = r#"
products:
  - { name: A, slug: same, price: "1.00" }
  - { name: B, slug: same, price: "2.00" }
"#;
        assert!(matches!(parse(yaml), Err(CommandError::Invalid(_))));
    }

    #[test]
    fn test_parse_rejects_negative_price() {
        let yaml = r#"
products:
  - { name: A, slug: a, price: "-1.00" }
"#;
        assert!(matches!(parse(yaml), Err(CommandError::Invalid(_))));
    }

    #[test]
    fn test_parse_rejects_missing_slug() {
        let yaml = r#"
products:
  - { name: A, price: "1.00" }
"#;
        assert!(matches!(parse(yaml), Err(CommandError::Yaml(_))));
    }
}
