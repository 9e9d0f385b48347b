//! Cart business logic.

use async_trait::async_trait;
use chrono::Utc;
use mockall::automock;
use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::dao::cart as dao;
use crate::models::{cart_total, Cart};

#[derive(Error, Debug)]
pub enum CartError {
    #[error("Cart not found")]
    CartNotFound,
    #[error("Product not found")]
    ProductNotFound,
    #[error("Product not in cart")]
    ProductNotInCart,
    #[error("Product stock is empty")]
    EmptyProductStock,
    #[error("Product stock cannot satisfy the requested quantity")]
    LowProductStock,
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Not enough stock of {0} to complete checkout")]
    InsufficientStock(String),
    #[error(transparent)]
    Db(#[from] DbErr),
}

#[automock]
#[async_trait]
pub trait CartController: Send + Sync {
    /// Adds `quantity` units of `model` to the customer's unpaid cart, creating it if needed.
    async fn add_to_cart(&self, customer: &str, model: &str, quantity: u32)
        -> Result<(), CartError>;

    /// The unpaid cart, or an empty one when the customer has none.
    async fn get_cart(&self, customer: &str) -> Result<Cart, CartError>;

    /// Pays the unpaid cart and takes its quantities out of stock.
    async fn checkout_cart(&self, customer: &str) -> Result<(), CartError>;

    /// Paid carts of the customer, oldest first.
    async fn get_customer_carts(&self, customer: &str) -> Result<Vec<Cart>, CartError>;

    /// Removes one unit of `model` from the unpaid cart.
    async fn remove_product_from_cart(&self, customer: &str, model: &str)
        -> Result<(), CartError>;

    async fn clear_cart(&self, customer: &str) -> Result<(), CartError>;

    async fn delete_all_carts(&self) -> Result<(), CartError>;

    async fn get_all_carts(&self) -> Result<Vec<Cart>, CartError>;
}

#[derive(Debug, Clone)]
pub struct SeaOrmCartController {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCartController {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CartController for SeaOrmCartController {
    async fn add_to_cart(
        &self,
        customer: &str,
        model: &str,
        quantity: u32,
    ) -> Result<(), CartError> {
        let quantity = i32::try_from(quantity).map_err(|_| CartError::LowProductStock)?;
        let txn = self.db.begin().await?;

        let product = dao::find_product(&txn, model)
            .await?
            .ok_or(CartError::ProductNotFound)?;
        if product.quantity <= 0 {
            return Err(CartError::EmptyProductStock);
        }

        let cart = match dao::find_current_cart(&txn, customer).await? {
            Some(cart) => cart,
            None => dao::create_cart(&txn, customer).await?,
        };

        match dao::find_item(&txn, cart.id, model).await? {
            Some(item) => {
                let requested = item.quantity + quantity;
                if requested > product.quantity {
                    return Err(CartError::LowProductStock);
                }
                dao::set_item_quantity(&txn, item, requested).await?;
            }
            None => {
                if quantity > product.quantity {
                    return Err(CartError::LowProductStock);
                }
                dao::insert_item(&txn, cart.id, &product, quantity).await?;
            }
        }

        dao::refresh_total(&txn, cart).await?;
        txn.commit().await?;

        debug!(customer, model, quantity, "Added product to cart");
        Ok(())
    }

    async fn get_cart(&self, customer: &str) -> Result<Cart, CartError> {
        let db = &*self.db;

        match dao::find_current_cart(db, customer).await? {
            Some(cart) => {
                let items = dao::find_items(db, cart.id).await?;
                Ok(Cart::from((cart, items)))
            }
            None => Ok(Cart::empty(customer)),
        }
    }

    async fn checkout_cart(&self, customer: &str) -> Result<(), CartError> {
        let txn = self.db.begin().await?;

        let cart = dao::find_current_cart(&txn, customer)
            .await?
            .ok_or(CartError::CartNotFound)?;
        let items = dao::find_items(&txn, cart.id).await?;
        if items.is_empty() {
            return Err(CartError::EmptyCart);
        }

        for item in &items {
            let available = dao::find_product(&txn, &item.model)
                .await?
                .map(|product| product.quantity)
                .unwrap_or(0);
            if available < item.quantity {
                return Err(CartError::InsufficientStock(item.model.clone()));
            }
        }

        for item in &items {
            dao::decrease_stock(&txn, &item.model, item.quantity).await?;
        }

        let payment_date = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        dao::mark_paid(&txn, cart, cart_total(&items), payment_date).await?;
        txn.commit().await?;

        info!(customer, products = items.len(), "Cart checked out");
        Ok(())
    }

    async fn get_customer_carts(&self, customer: &str) -> Result<Vec<Cart>, CartError> {
        let carts = dao::find_paid_carts(&*self.db, customer).await?;

        Ok(carts.into_iter().map(Cart::from).collect())
    }

    async fn remove_product_from_cart(
        &self,
        customer: &str,
        model: &str,
    ) -> Result<(), CartError> {
        let txn = self.db.begin().await?;

        if dao::find_product(&txn, model).await?.is_none() {
            return Err(CartError::ProductNotFound);
        }

        let cart = dao::find_current_cart(&txn, customer)
            .await?
            .ok_or(CartError::CartNotFound)?;
        let item = dao::find_item(&txn, cart.id, model)
            .await?
            .ok_or(CartError::ProductNotInCart)?;

        if item.quantity > 1 {
            let remaining = item.quantity - 1;
            dao::set_item_quantity(&txn, item, remaining).await?;
        } else {
            dao::delete_item(&txn, item).await?;
        }

        dao::refresh_total(&txn, cart).await?;
        txn.commit().await?;

        debug!(customer, model, "Removed product from cart");
        Ok(())
    }

    async fn clear_cart(&self, customer: &str) -> Result<(), CartError> {
        let txn = self.db.begin().await?;

        let cart = dao::find_current_cart(&txn, customer)
            .await?
            .ok_or(CartError::CartNotFound)?;
        let removed = dao::delete_items(&txn, cart.id).await?;
        dao::refresh_total(&txn, cart).await?;
        txn.commit().await?;

        debug!(customer, removed, "Cleared cart");
        Ok(())
    }

    async fn delete_all_carts(&self) -> Result<(), CartError> {
        let txn = self.db.begin().await?;
        dao::delete_all(&txn).await?;
        txn.commit().await?;

        info!("Deleted all carts");
        Ok(())
    }

    async fn get_all_carts(&self) -> Result<Vec<Cart>, CartError> {
        let carts = dao::find_all_carts(&*self.db).await?;

        Ok(carts.into_iter().map(Cart::from).collect())
    }
}
