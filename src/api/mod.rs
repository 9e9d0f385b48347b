pub mod carts;
pub mod products;
pub mod sessions;
pub mod users;

use axum::{middleware::from_fn, Extension, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::controllers::cart::CartController;
use crate::middleware::logging::logging_middleware;

use carts::cart_router;
use products::products_router;
use sessions::sessions_router;
use users::users_router;

pub const BASE_PATH: &str = "/ezelectronics";

pub fn create_api_router(
    shared_db: Arc<DatabaseConnection>,
    config: Arc<Config>,
    carts: Arc<dyn CartController>,
) -> Router {
    let secret: Arc<str> = Arc::from(config.secret.as_str());

    let api = Router::new()
        .merge(sessions_router(shared_db.clone(), secret.clone()))
        .merge(users_router())
        .merge(products_router(shared_db.clone(), secret.clone()))
        .merge(cart_router(shared_db.clone(), secret));

    Router::new()
        .nest(BASE_PATH, api)
        .layer(Extension(carts))
        .layer(Extension(config))
        .layer(Extension(shared_db))
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
