use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Response,
    routing::{delete, get},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::controllers::cart::{CartController, CartError};
use crate::middleware::{
    auth::{auth_middleware, Access, AuthState, Claims},
    logging::{to_response, ApiError},
    validation::{validate_params, ValidatedJson, NON_BLANK_REGEX},
};

//ROUTERS
pub fn cart_router(db: Arc<DatabaseConnection>, secret: Arc<str>) -> Router {
    let customer = from_fn_with_state(
        AuthState::new(db.clone(), secret.clone(), Access::Customer),
        auth_middleware,
    );
    let staff = from_fn_with_state(
        AuthState::new(db, secret, Access::AdminOrManager),
        auth_middleware,
    );

    Router::new()
        .route(
            "/carts",
            get(get_cart)
                .post(add_product)
                .patch(checkout)
                .layer(customer.clone())
                .merge(delete(delete_all_carts).layer(staff.clone())),
        )
        .route("/carts/history", get(get_history).layer(customer.clone()))
        .route(
            "/carts/products/:model",
            delete(remove_product).layer(customer.clone()),
        )
        .route("/carts/current", delete(clear_cart).layer(customer))
        .route("/carts/all", get(get_all_carts).layer(staff))
}

//Routes
async fn get_cart(
    Extension(carts): Extension<Arc<dyn CartController>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match carts.get_cart(&claims.username).await {
        Ok(cart) => to_response((StatusCode::OK, Json(cart)), Ok(())),
        Err(err) => cart_error_response(err),
    }
}

async fn add_product(
    Extension(carts): Extension<Arc<dyn CartController>>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(payload): ValidatedJson<AddProduct>,
) -> Response {
    match carts
        .add_to_cart(&claims.username, &payload.model, payload.quantity)
        .await
    {
        Ok(()) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Added successfully"
                })),
            ),
            Ok(()),
        ),
        Err(err) => cart_error_response(err),
    }
}

async fn checkout(
    Extension(carts): Extension<Arc<dyn CartController>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match carts.checkout_cart(&claims.username).await {
        Ok(()) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Cart checked out successfully"
                })),
            ),
            Ok(()),
        ),
        Err(err) => cart_error_response(err),
    }
}

async fn get_history(
    Extension(carts): Extension<Arc<dyn CartController>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match carts.get_customer_carts(&claims.username).await {
        Ok(history) => to_response((StatusCode::OK, Json(history)), Ok(())),
        Err(err) => cart_error_response(err),
    }
}

async fn remove_product(
    Extension(carts): Extension<Arc<dyn CartController>>,
    Extension(claims): Extension<Claims>,
    Path(params): Path<ModelParam>,
) -> Response {
    if let Err(response) = validate_params(&params) {
        return response;
    }

    match carts
        .remove_product_from_cart(&claims.username, &params.model)
        .await
    {
        Ok(()) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Resource deleted successfully"
                })),
            ),
            Ok(()),
        ),
        Err(err) => cart_error_response(err),
    }
}

async fn clear_cart(
    Extension(carts): Extension<Arc<dyn CartController>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match carts.clear_cart(&claims.username).await {
        Ok(()) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Cart cleared successfully"
                })),
            ),
            Ok(()),
        ),
        Err(err) => cart_error_response(err),
    }
}

async fn delete_all_carts(Extension(carts): Extension<Arc<dyn CartController>>) -> Response {
    match carts.delete_all_carts().await {
        Ok(()) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "message": "All carts deleted successfully"
                })),
            ),
            Ok(()),
        ),
        Err(err) => cart_error_response(err),
    }
}

async fn get_all_carts(Extension(carts): Extension<Arc<dyn CartController>>) -> Response {
    match carts.get_all_carts().await {
        Ok(all) => to_response((StatusCode::OK, Json(all)), Ok(())),
        Err(err) => cart_error_response(err),
    }
}

//utils
fn cart_error_response(err: CartError) -> Response {
    let status = match &err {
        CartError::CartNotFound | CartError::ProductNotFound | CartError::ProductNotInCart => {
            StatusCode::NOT_FOUND
        }
        CartError::EmptyProductStock | CartError::LowProductStock => StatusCode::CONFLICT,
        CartError::EmptyCart | CartError::InsufficientStock(_) => StatusCode::BAD_REQUEST,
        CartError::Db(db_err) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::DbError(db_err.to_string())),
            );
        }
    };

    let message = err.to_string();
    to_response(
        (
            status,
            Json(json!({
                "error": message
            })),
        ),
        Err(ApiError::General(message)),
    )
}

//Structs
#[derive(Deserialize, Validate, Debug)]
struct AddProduct {
    #[serde(default)]
    #[validate(regex(path = *NON_BLANK_REGEX))]
    model: String,
    #[serde(default = "one")]
    #[validate(range(min = 1))]
    quantity: u32,
}

fn one() -> u32 {
    1
}

#[derive(Deserialize, Validate, Debug)]
struct ModelParam {
    #[validate(regex(path = *NON_BLANK_REGEX))]
    model: String,
}
