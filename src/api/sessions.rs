use axum::{
    extract::Extension,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::config::Config;
use crate::entities::user::{self, Entity as UserEntity, Role};
use crate::middleware::{
    auth::{
        auth_middleware, expired_session_cookie, generate_token, session_cookie, Access,
        AuthState, Claims,
    },
    logging::{to_response, ApiError},
    validation::{ValidatedJson, NON_BLANK_REGEX},
};

//ROUTERS
pub fn sessions_router(db: Arc<DatabaseConnection>, secret: Arc<str>) -> Router {
    Router::new().route("/sessions", post(login)).route(
        "/sessions/current",
        get(current_session)
            .delete(logout)
            .layer(from_fn_with_state(
                AuthState::new(db, secret, Access::Any),
                auth_middleware,
            )),
    )
}

//Routes
async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<UserLogin>,
) -> Response {
    let result = UserEntity::find()
        .filter(user::Column::Username.eq(payload.username.as_str()))
        .one(&*db)
        .await;

    let model = match result {
        Ok(Some(model)) if model.check_hash(&payload.password).is_ok() => model,
        Ok(_) => {
            return to_response(
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "Incorrect username and/or password"
                    })),
                ),
                Err(ApiError::Unauthorized(format!(
                    "Failed login for {}",
                    payload.username
                ))),
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
    };

    match generate_token(
        &model.username,
        model.role,
        &config.secret,
        config.session_ttl_hours,
    ) {
        Ok(token) => to_response(
            (jar.add(session_cookie(token)), Json(UserResponse::from(model))),
            Ok(()),
        ),
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            ),
            Err(ApiError::TokenGenerationFailed(err.to_string())),
        ),
    }
}

async fn current_session(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match UserEntity::find()
        .filter(user::Column::Username.eq(claims.username.as_str()))
        .one(&*db)
        .await
    {
        Ok(Some(model)) => to_response(Json(UserResponse::from(model)), Ok(())),
        Ok(None) => to_response(
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Unauthenticated user"
                })),
            ),
            Err(ApiError::Unauthorized(claims.username)),
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

async fn logout(jar: CookieJar) -> Response {
    to_response(
        (
            jar.remove(expired_session_cookie()),
            Json(json!({
                "message": "Logged out"
            })),
        ),
        Ok(()),
    )
}

//structs
#[derive(Debug, Deserialize, Validate)]
struct UserLogin {
    #[serde(default)]
    #[validate(regex(path = *NON_BLANK_REGEX))]
    username: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub name: String,
    pub surname: String,
    pub role: Role,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            username: model.username,
            name: model.name,
            surname: model.surname,
            role: model.role,
        }
    }
}
