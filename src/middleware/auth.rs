use crate::entities::user::{self, Entity as UserEntity, Role};
use crate::middleware::logging::{to_response, ApiError};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub const SESSION_COOKIE: &str = "session";

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(req.headers());
    let token = match jar.get(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_owned(),
        None => return unauthorized("Unauthenticated user", "No session cookie".into()),
    };

    let claims = match validate_token(&state.db, &state.secret, &token).await {
        Ok(claims) => claims,
        Err(AuthError::InternalServerError(err)) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::DbError(err)),
            );
        }
        Err(err) => return unauthorized("Unauthenticated user", err.to_string()),
    };

    if !state.access.allows(claims.role) {
        debug!(username = %claims.username, role = %claims.role, "Role rejected");
        return unauthorized(
            state.access.denied_message(),
            format!("{} as {}", claims.username, claims.role),
        );
    }

    req.extensions_mut().insert(claims);
    next.run(req).await
}

fn unauthorized(message: &'static str, detail: String) -> Response {
    to_response(
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": message
            })),
        ),
        Err(ApiError::Unauthorized(detail)),
    )
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub role: Role,
    pub exp: usize,
}

/// Which roles may pass a guarded route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Customer,
    AdminOrManager,
    Any,
}

impl Access {
    pub fn allows(self, role: Role) -> bool {
        match self {
            Access::Customer => role == Role::Customer,
            Access::AdminOrManager => matches!(role, Role::Admin | Role::Manager),
            Access::Any => true,
        }
    }

    fn denied_message(self) -> &'static str {
        match self {
            Access::Customer => "User is not a customer",
            Access::AdminOrManager => "User is not an admin or manager",
            Access::Any => "Unauthenticated user",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthState {
    pub db: Arc<DatabaseConnection>,
    pub secret: Arc<str>,
    pub access: Access,
}

impl AuthState {
    pub fn new(db: Arc<DatabaseConnection>, secret: Arc<str>, access: Access) -> Self {
        Self { db, secret, access }
    }
}

pub fn generate_token(
    username: &str,
    role: Role,
    secret: &str,
    ttl_hours: i64,
) -> Result<String, AuthError> {
    let exp = Utc::now()
        .checked_add_signed(Duration::hours(ttl_hours))
        .ok_or(AuthError::GenerationFail)?
        .timestamp() as usize;

    let claims = Claims {
        username: username.to_owned(),
        role,
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::GenerationFail)
}

/// Decodes the token and checks that its user still exists with the same role.
pub async fn validate_token(
    db: &DatabaseConnection,
    secret: &str,
    token: &str,
) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AuthError::ValidationFail)?
    .claims;

    match UserEntity::find()
        .filter(user::Column::Username.eq(claims.username.as_str()))
        .filter(user::Column::Role.eq(claims.role))
        .one(db)
        .await
    {
        Ok(Some(_)) => Ok(claims),
        Ok(None) => Err(AuthError::InvalidUserOrRole),
        Err(err) => Err(AuthError::InternalServerError(err.to_string())),
    }
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .build()
}

pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid user or role")]
    InvalidUserOrRole,
    #[error("Failed to validate token")]
    ValidationFail,
    #[error("Failed to generate token")]
    GenerationFail,
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_matches_roles() {
        assert!(Access::Customer.allows(Role::Customer));
        assert!(!Access::Customer.allows(Role::Admin));
        assert!(!Access::Customer.allows(Role::Manager));

        assert!(Access::AdminOrManager.allows(Role::Admin));
        assert!(Access::AdminOrManager.allows(Role::Manager));
        assert!(!Access::AdminOrManager.allows(Role::Customer));

        assert!(Access::Any.allows(Role::Customer));
    }

    #[test]
    fn generated_token_carries_role() {
        let token = generate_token("customer", Role::Customer, "secret", 1).unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();

        assert_eq!(decoded.claims.username, "customer");
        assert_eq!(decoded.claims.role, Role::Customer);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = generate_token("customer", Role::Customer, "secret", 1).unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"another"),
            &Validation::new(Algorithm::HS256),
        );

        assert!(decoded.is_err());
    }
}
