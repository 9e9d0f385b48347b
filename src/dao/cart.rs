//! Queries over `carts`, `product_in_cart` and the stock column of `products`.
//!
//! Every function takes any connection, so the controller can run several of them
//! inside one transaction.

use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::{cart, product, product_in_cart};
use crate::models::cart_total;

pub async fn find_product<C: ConnectionTrait>(
    conn: &C,
    model: &str,
) -> Result<Option<product::Model>, DbErr> {
    product::Entity::find_by_id(model.to_owned()).one(conn).await
}

pub async fn find_current_cart<C: ConnectionTrait>(
    conn: &C,
    customer: &str,
) -> Result<Option<cart::Model>, DbErr> {
    cart::Entity::find()
        .filter(cart::Column::Customer.eq(customer))
        .filter(cart::Column::Paid.eq(false))
        .one(conn)
        .await
}

pub async fn create_cart<C: ConnectionTrait>(
    conn: &C,
    customer: &str,
) -> Result<cart::Model, DbErr> {
    cart::ActiveModel {
        customer: Set(customer.to_owned()),
        paid: Set(false),
        payment_date: Set(None),
        total: Set(0.0),
        ..Default::default()
    }
    .insert(conn)
    .await
}

pub async fn find_items<C: ConnectionTrait>(
    conn: &C,
    cart_id: i32,
) -> Result<Vec<product_in_cart::Model>, DbErr> {
    product_in_cart::Entity::find()
        .filter(product_in_cart::Column::CartId.eq(cart_id))
        .order_by_asc(product_in_cart::Column::Id)
        .all(conn)
        .await
}

pub async fn find_item<C: ConnectionTrait>(
    conn: &C,
    cart_id: i32,
    model: &str,
) -> Result<Option<product_in_cart::Model>, DbErr> {
    product_in_cart::Entity::find()
        .filter(product_in_cart::Column::CartId.eq(cart_id))
        .filter(product_in_cart::Column::Model.eq(model))
        .one(conn)
        .await
}

pub async fn insert_item<C: ConnectionTrait>(
    conn: &C,
    cart_id: i32,
    product: &product::Model,
    quantity: i32,
) -> Result<product_in_cart::Model, DbErr> {
    product_in_cart::ActiveModel {
        cart_id: Set(cart_id),
        model: Set(product.model.clone()),
        category: Set(product.category),
        quantity: Set(quantity),
        price: Set(product.selling_price),
        ..Default::default()
    }
    .insert(conn)
    .await
}

pub async fn set_item_quantity<C: ConnectionTrait>(
    conn: &C,
    item: product_in_cart::Model,
    quantity: i32,
) -> Result<(), DbErr> {
    let mut item: product_in_cart::ActiveModel = item.into();
    item.quantity = Set(quantity);
    item.update(conn).await.map(|_| ())
}

pub async fn delete_item<C: ConnectionTrait>(
    conn: &C,
    item: product_in_cart::Model,
) -> Result<(), DbErr> {
    let item: product_in_cart::ActiveModel = item.into();
    item.delete(conn).await.map(|_| ())
}

pub async fn delete_items<C: ConnectionTrait>(conn: &C, cart_id: i32) -> Result<u64, DbErr> {
    product_in_cart::Entity::delete_many()
        .filter(product_in_cart::Column::CartId.eq(cart_id))
        .exec(conn)
        .await
        .map(|result| result.rows_affected)
}

/// Recomputes the stored total from the cart's current lines.
pub async fn refresh_total<C: ConnectionTrait>(
    conn: &C,
    cart: cart::Model,
) -> Result<cart::Model, DbErr> {
    let items = find_items(conn, cart.id).await?;
    let mut cart: cart::ActiveModel = cart.into();
    cart.total = Set(cart_total(&items));
    cart.update(conn).await
}

pub async fn mark_paid<C: ConnectionTrait>(
    conn: &C,
    cart: cart::Model,
    total: f64,
    payment_date: String,
) -> Result<cart::Model, DbErr> {
    let mut cart: cart::ActiveModel = cart.into();
    cart.paid = Set(true);
    cart.payment_date = Set(Some(payment_date));
    cart.total = Set(total);
    cart.update(conn).await
}

/// Subtracts `quantity` units from the product's stock.
pub async fn decrease_stock<C: ConnectionTrait>(
    conn: &C,
    model: &str,
    quantity: i32,
) -> Result<(), DbErr> {
    product::Entity::update_many()
        .col_expr(
            product::Column::Quantity,
            Expr::col(product::Column::Quantity).sub(quantity),
        )
        .filter(product::Column::Model.eq(model))
        .exec(conn)
        .await
        .map(|_| ())
}

pub async fn find_paid_carts<C: ConnectionTrait>(
    conn: &C,
    customer: &str,
) -> Result<Vec<(cart::Model, Vec<product_in_cart::Model>)>, DbErr> {
    cart::Entity::find()
        .filter(cart::Column::Customer.eq(customer))
        .filter(cart::Column::Paid.eq(true))
        .order_by_asc(cart::Column::Id)
        .find_with_related(product_in_cart::Entity)
        .all(conn)
        .await
}

pub async fn find_all_carts<C: ConnectionTrait>(
    conn: &C,
) -> Result<Vec<(cart::Model, Vec<product_in_cart::Model>)>, DbErr> {
    cart::Entity::find()
        .order_by_asc(cart::Column::Id)
        .find_with_related(product_in_cart::Entity)
        .all(conn)
        .await
}

pub async fn delete_all<C: ConnectionTrait>(conn: &C) -> Result<(), DbErr> {
    product_in_cart::Entity::delete_many().exec(conn).await?;
    cart::Entity::delete_many().exec(conn).await?;
    Ok(())
}
