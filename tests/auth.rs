mod common;

use reqwest::{header, StatusCode};
use serde_json::{json, Value};

use common::{spawn, spawn_app, test_config};
use ezelectronics_carts::{api::sessions::UserResponse, entities::user::Role};

fn session_cookie_of(response: &reqwest::Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("No session cookie set")
        .to_str()
        .expect("Invalid cookie header");

    set_cookie
        .split(';')
        .next()
        .expect("Empty cookie header")
        .to_owned()
}

#[tokio::test]
async fn test_login_and_use_session() {
    let app = spawn(test_config(Some("test")), None).await;

    let response = app
        .client
        .post(app.url("/sessions"))
        .json(&json!({ "username": "customer", "password": "test" }))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie_of(&response);
    assert!(cookie.starts_with("session="));
    let user = response
        .json::<UserResponse>()
        .await
        .expect("Failed to parse user");
    assert_eq!(user.username, "customer");
    assert_eq!(user.role, Role::Customer);

    let response = app
        .client
        .get(app.url("/sessions/current"))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let current = response
        .json::<UserResponse>()
        .await
        .expect("Failed to parse user");
    assert_eq!(current.username, "customer");

    let response = app
        .client
        .get(app.url("/carts"))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = spawn(test_config(Some("test")), None).await;

    let response = app
        .client
        .post(app.url("/sessions"))
        .json(&json!({ "username": "customer", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_login_without_credentials_is_422() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/sessions"))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response
        .json::<Value>()
        .await
        .expect("Failed to parse response JSON");
    let error = body["error"].as_str().expect("No error in body");
    assert!(error.contains("Parameter: **password**"));
    assert!(error.contains("Parameter: **username**"));
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = spawn_app().await;

    let response = app
        .as_customer(app.client.delete(app.url("/sessions/current")))
        .send()
        .await
        .expect("Failed to send logout request");

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie_of(&response);
    assert_eq!(cookie, "session=");
}

#[tokio::test]
async fn test_current_session_requires_login() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/sessions/current"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_then_login() {
    let app = spawn_app().await;

    let payload = json!({
        "username": "JohnDoe",
        "name": "John",
        "surname": "Doe",
        "password": "Muzion15",
        "role": "Customer"
    });

    let response = app
        .client
        .post(app.url("/users"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .client
        .post(app.url("/users"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .client
        .post(app.url("/sessions"))
        .json(&json!({ "username": "JohnDoe", "password": "Muzion15" }))
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_with_blank_name_is_422() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/users"))
        .json(&json!({
            "username": "JaneDoe",
            "name": " ",
            "surname": "Doe",
            "password": "secret",
            "role": "Manager"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
