//! Cart endpoints of the EZElectronics store.
//!
//! Customers fill and pay a cart through `/ezelectronics/carts`; admins and managers can
//! list or wipe every cart. Sessions are signed tokens carried in the `session` cookie.

pub mod api;
pub mod config;
pub mod controllers;
pub mod dao;
pub mod entities;
pub mod middleware;
pub mod models;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::sync::Arc;

pub use api::create_api_router;
pub use config::Config;

/// Connects and makes sure every table exists. Seeds users when `seed_password` is set.
pub async fn connect(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    if config.database_url.contains(":memory:") {
        //every pooled connection would get its own empty database
        options.max_connections(1).min_connections(1);
    }
    options.sqlx_logging(false);

    let db = Database::connect(options).await?;
    entities::setup_schema(&db).await?;

    if let Some(password) = &config.seed_password {
        entities::primary_setup(&db, password).await?;
    }

    Ok(db)
}

/// Builds the full application with the database-backed cart controller.
pub fn app(db: Arc<DatabaseConnection>, config: Arc<Config>) -> axum::Router {
    let carts = Arc::new(controllers::cart::SeaOrmCartController::new(db.clone()));
    create_api_router(db, config, carts)
}
