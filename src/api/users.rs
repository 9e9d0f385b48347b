use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use axum::{extract::Extension, http::StatusCode, response::Response, routing::post, Json, Router};
use rand::rngs::OsRng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::entities::user::{self, Entity as UserEntity, Role};
use crate::middleware::{
    logging::{to_response, ApiError},
    validation::{ValidatedJson, NON_BLANK_REGEX},
};

//ROUTERS
pub fn users_router() -> Router {
    Router::new().route("/users", post(register_user))
}

// ROUTES
async fn register_user(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ValidatedJson(payload): ValidatedJson<CreateUser>,
) -> Response {
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

    match UserEntity::find()
        .filter(user::Column::Username.eq(payload.username.as_str()))
        .one(&txn)
        .await
    {
        Ok(None) => {}
        Ok(Some(_)) => {
            let tmp = "The username already exists".to_owned();
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

    let password = match hash_password(&payload.password) {
        Ok(password) => password,
        Err(err) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::PasswordHashFailed(err.to_string())),
            );
        }
    };

    let new_user = user::ActiveModel {
        username: Set(payload.username),
        name: Set(payload.name),
        surname: Set(payload.surname),
        password: Set(password),
        role: Set(payload.role),
        ..Default::default()
    };

    let inserted = match new_user.insert(&txn).await {
        Ok(_) => txn.commit().await,
        Err(err) => Err(err),
    };

    match inserted {
        Ok(()) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "message": "User registered successfully"
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

//utilities
fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();

    Ok(password_hash)
}

//structs
#[derive(Deserialize, Validate, Debug)]
struct CreateUser {
    #[serde(default)]
    #[validate(regex(path = *NON_BLANK_REGEX))]
    username: String,
    #[serde(default)]
    #[validate(regex(path = *NON_BLANK_REGEX))]
    name: String,
    #[serde(default)]
    #[validate(regex(path = *NON_BLANK_REGEX))]
    surname: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    password: String,
    role: Role,
}
