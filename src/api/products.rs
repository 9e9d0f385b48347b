use axum::{
    extract::Extension,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::entities::product::{self, Category, Entity as ProductEntity};
use crate::middleware::{
    auth::{auth_middleware, Access, AuthState},
    logging::{to_response, ApiError},
    validation::{unprocessable, Location, ParamError, ValidatedJson, NON_BLANK_REGEX},
};

//ROUTERS
pub fn products_router(db: Arc<DatabaseConnection>, secret: Arc<str>) -> Router {
    Router::new().route(
        "/products",
        get(get_products)
            .layer(from_fn_with_state(
                AuthState::new(db.clone(), secret.clone(), Access::Any),
                auth_middleware,
            ))
            .merge(post(create_product).layer(from_fn_with_state(
                AuthState::new(db, secret, Access::AdminOrManager),
                auth_middleware,
            ))),
    )
}

//ROUTES
async fn get_products(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    match ProductEntity::find()
        .order_by_asc(product::Column::Model)
        .all(&*db)
        .await
    {
        Ok(products) => to_response((StatusCode::OK, Json(products)), Ok(())),
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            ),
            Err(ApiError::DbError(err.to_string())),
        ),
    }
}

async fn create_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ValidatedJson(payload): ValidatedJson<CreateProduct>,
) -> Response {
    let today = Utc::now().date_naive();
    let arrival_date = match payload.arrival_date.as_deref() {
        None => today,
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) if date <= today => date,
            _ => {
                return unprocessable(vec![ParamError {
                    param: "arrivalDate".into(),
                    reason: "Invalid value".into(),
                    location: Location::Body,
                }]);
            }
        },
    };

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::TransactionCreationFailed),
            );
        }
    };

    match ProductEntity::find_by_id(payload.model.clone()).one(&txn).await {
        Ok(None) => {}
        Ok(Some(_)) => {
            let tmp = "The product already exists".to_owned();
            return to_response(
                (
                    StatusCode::CONFLICT,
                    Json(json!({
                        "error": tmp
                    })),
                ),
                Err(ApiError::General(tmp)),
            );
        }
        Err(err) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::DbError(err.to_string())),
            );
        }
    }

    let new_product = product::ActiveModel {
        model: Set(payload.model),
        category: Set(payload.category),
        selling_price: Set(payload.selling_price),
        quantity: Set(payload.quantity),
        details: Set(payload.details),
        arrival_date: Set(Some(arrival_date.format("%Y-%m-%d").to_string())),
    };

    let inserted = match new_product.insert(&txn).await {
        Ok(_) => txn.commit().await,
        Err(err) => Err(err),
    };

    match inserted {
        Ok(()) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Product created successfully"
                })),
            ),
            Ok(()),
        ),
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            ),
            Err(ApiError::DbError(err.to_string())),
        ),
    }
}

//structs
#[derive(Deserialize, Validate, Debug)]
#[serde(rename_all = "camelCase")]
struct CreateProduct {
    #[serde(default)]
    #[validate(regex(path = *NON_BLANK_REGEX))]
    model: String,
    category: Category,
    #[validate(range(min = 1))]
    quantity: i32,
    #[validate(range(min = 0.01))]
    selling_price: f64,
    details: Option<String>,
    arrival_date: Option<String>,
}
