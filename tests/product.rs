mod common;

use reqwest::StatusCode;
use sea_orm::ConnectionTrait;
use serde_json::{json, Value};

use common::spawn_app;

fn new_product(model: &str) -> Value {
    json!({
        "model": model,
        "category": "Laptop",
        "quantity": 4,
        "sellingPrice": 1299.99,
        "details": "16GB RAM",
        "arrivalDate": "2024-01-15"
    })
}

#[tokio::test]
async fn test_create_product_as_staff() {
    let app = spawn_app().await;

    let response = app
        .as_admin(app.client.post(app.url("/products")))
        .json(&new_product("macbookPro"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .as_manager(app.client.post(app.url("/products")))
        .json(&new_product("thinkpad"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(app.stock_of("macbookPro").await, 4);
    assert_eq!(app.stock_of("thinkpad").await, 4);
}

#[tokio::test]
async fn test_create_product_rejects_customers() {
    let app = spawn_app().await;

    let response = app
        .as_customer(app.client.post(app.url("/products")))
        .json(&new_product("macbookPro"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_duplicate_product_is_409() {
    let app = spawn_app().await;
    app.insert_product("macbookPro", 1, 999.0).await;

    let response = app
        .as_admin(app.client.post(app.url("/products")))
        .json(&new_product("macbookPro"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_product_with_future_arrival_is_422() {
    let app = spawn_app().await;
    let mut product = new_product("macbookPro");
    product["arrivalDate"] = json!("2999-01-01");

    let response = app
        .as_admin(app.client.post(app.url("/products")))
        .json(&product)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_list_products() {
    let app = spawn_app().await;
    app.insert_product("b_model", 3, 20.0).await;
    app.insert_product("a_model", 1, 10.0).await;

    let response = app
        .as_customer(app.client.get(app.url("/products")))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response
        .json::<Value>()
        .await
        .expect("Failed to parse response JSON");
    let models: Vec<_> = body
        .as_array()
        .expect("Body is not an array")
        .iter()
        .map(|product| product["model"].as_str().unwrap_or_default().to_owned())
        .collect();
    assert_eq!(models, vec!["a_model", "b_model"]);
    assert_eq!(body[0]["sellingPrice"], 10.0);
}

#[tokio::test]
async fn test_list_products_requires_login() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/products"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_products_database_failure_is_500() {
    let app = spawn_app().await;
    app.db
        .execute_unprepared("DROP TABLE products")
        .await
        .expect("Failed to drop products");

    let response = app
        .as_customer(app.client.get(app.url("/products")))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response
        .json::<Value>()
        .await
        .expect("Failed to parse response JSON");
    assert_eq!(body["error"], "Internal server error");
}
