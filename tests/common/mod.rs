#![allow(dead_code)]

use reqwest::{header, Client, RequestBuilder};
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use std::sync::Arc;

use ezelectronics_carts::{
    connect, create_api_router,
    controllers::cart::{CartController, SeaOrmCartController},
    entities::{
        product::{self, Category},
        user::{self, Role},
    },
    middleware::auth::generate_token,
    Config,
};

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub config: Arc<Config>,
    pub db: Arc<DatabaseConnection>,
}

pub fn test_config(seed_password: Option<&str>) -> Config {
    Config {
        database_url: "sqlite::memory:".into(),
        secret: "test-secret".into(),
        bind_address: "127.0.0.1:0".into(),
        session_ttl_hours: 1,
        seed_password: seed_password.map(str::to_owned),
    }
}

/// Serves the real controller over a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    spawn(test_config(None), None).await
}

/// Serves `carts` in place of the database-backed controller.
pub async fn spawn_app_with(carts: Arc<dyn CartController>) -> TestApp {
    spawn(test_config(None), Some(carts)).await
}

pub async fn spawn(config: Config, carts: Option<Arc<dyn CartController>>) -> TestApp {
    let db = Arc::new(connect(&config).await.expect("Failed to set up database"));
    if config.seed_password.is_none() {
        insert_users(&db).await;
    }

    let config = Arc::new(config);
    let carts: Arc<dyn CartController> = match carts {
        Some(carts) => carts,
        None => Arc::new(SeaOrmCartController::new(db.clone())),
    };
    let app = create_api_router(db.clone(), config.clone(), carts);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .expect("Failed to bind test listener");
    let address = format!(
        "http://{}",
        listener.local_addr().expect("Failed to read address")
    );
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        address,
        client: Client::new(),
        config,
        db,
    }
}

//sessions are minted directly, so these users never log in with a password
async fn insert_users(db: &DatabaseConnection) {
    let users = [
        ("customer", Role::Customer),
        ("customer2", Role::Customer),
        ("manager", Role::Manager),
        ("admin", Role::Admin),
    ]
    .map(|(username, role)| user::ActiveModel {
        username: Set(username.to_owned()),
        name: Set(username.to_owned()),
        surname: Set(username.to_owned()),
        password: Set("unused".to_owned()),
        role: Set(role),
        ..Default::default()
    });

    user::Entity::insert_many(users)
        .exec(db)
        .await
        .expect("Failed to insert users");
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/ezelectronics{}", self.address, path)
    }

    pub fn session(&self, username: &str, role: Role) -> String {
        let token = generate_token(username, role, &self.config.secret, 1)
            .expect("Failed to generate token");
        format!("session={}", token)
    }

    pub fn as_customer(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(header::COOKIE, self.session("customer", Role::Customer))
    }

    pub fn as_manager(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(header::COOKIE, self.session("manager", Role::Manager))
    }

    pub fn as_admin(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(header::COOKIE, self.session("admin", Role::Admin))
    }

    pub async fn insert_product(&self, model: &str, quantity: i32, price: f64) {
        product::Entity::insert(product::ActiveModel {
            model: Set(model.to_owned()),
            category: Set(Category::Smartphone),
            selling_price: Set(price),
            quantity: Set(quantity),
            details: Set(None),
            arrival_date: Set(Some("2024-01-01".to_owned())),
        })
        .exec(&*self.db)
        .await
        .expect("Failed to insert product");
    }

    pub async fn stock_of(&self, model: &str) -> i32 {
        product::Entity::find_by_id(model.to_owned())
            .one(&*self.db)
            .await
            .expect("Failed to query product")
            .expect("Product missing")
            .quantity
    }
}
