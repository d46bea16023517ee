//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Storefront migrations: `crates/storefront/migrations/`

use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;

use shopcart_storefront::db;

use super::{CommandError, database_url};

/// Run storefront migrations and create the session table.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration fails.
pub async fn storefront() -> Result<(), CommandError> {
    let url = database_url()?;

    info!("Connecting to storefront database...");
    let pool = db::create_pool(&url).await?;

    info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    info!("Creating session table...");
    PostgresStore::new(pool).migrate().await?;

    info!("Storefront migrations complete!");
    Ok(())
}
