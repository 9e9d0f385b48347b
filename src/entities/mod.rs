pub mod cart;
pub mod product;
pub mod product_in_cart;
pub mod user;

use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, Schema, Set,
    TransactionTrait,
};
use tracing::info;

use crate::entities::{
    cart::Entity as Cart, product::Entity as Product, product_in_cart::Entity as ProductInCart,
    user::Entity as User,
};

pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut create_user_table = schema.create_table_from_entity(User);
    let mut create_product_table = schema.create_table_from_entity(Product);
    let mut create_cart_table = schema.create_table_from_entity(Cart);
    let mut create_product_in_cart_table = schema.create_table_from_entity(ProductInCart);

    for statement in [
        create_user_table.if_not_exists(),
        create_product_table.if_not_exists(),
        create_cart_table.if_not_exists(),
        create_product_in_cart_table.if_not_exists(),
    ] {
        db.execute(backend.build(&*statement)).await?;
    }

    Ok(())
}

/// Seeds one user per role, all sharing `password`. Does nothing once any user exists.
pub async fn primary_setup(db: &DatabaseConnection, password: &str) -> Result<(), DbErr> {
    if User::find().count(db).await? > 0 {
        return Ok(());
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| DbErr::Custom(format!("Failed to hash seed password: {err}")))?
        .to_string();

    let seed = [
        ("customer", user::Role::Customer),
        ("manager", user::Role::Manager),
        ("admin", user::Role::Admin),
    ]
    .map(|(username, role)| user::ActiveModel {
        username: Set(username.to_owned()),
        name: Set(username.to_owned()),
        surname: Set(username.to_owned()),
        password: Set(password_hash.clone()),
        role: Set(role),
        ..Default::default()
    });

    let txn = db.begin().await?;
    User::insert_many(seed).exec(&txn).await?;
    txn.commit().await?;

    info!("Seeded customer, manager and admin users");
    Ok(())
}
