//! Response shapes of the cart endpoints.

use serde::{Deserialize, Serialize};

use crate::entities::{cart, product::Category, product_in_cart};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub customer: String,
    pub paid: bool,
    pub payment_date: Option<String>,
    pub total: f64,
    pub products: Vec<ProductInCart>,
}

impl Cart {
    /// The cart a customer sees before adding anything.
    pub fn empty(customer: &str) -> Self {
        Self {
            customer: customer.to_owned(),
            paid: false,
            payment_date: None,
            total: 0.0,
            products: Vec::new(),
        }
    }
}

impl From<(cart::Model, Vec<product_in_cart::Model>)> for Cart {
    fn from((cart, items): (cart::Model, Vec<product_in_cart::Model>)) -> Self {
        Self {
            customer: cart.customer,
            paid: cart.paid,
            payment_date: cart.payment_date,
            total: cart.total,
            products: items.into_iter().map(ProductInCart::from).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductInCart {
    pub model: String,
    pub quantity: i32,
    pub category: Category,
    pub price: f64,
}

impl From<product_in_cart::Model> for ProductInCart {
    fn from(item: product_in_cart::Model) -> Self {
        Self {
            model: item.model,
            quantity: item.quantity,
            category: item.category,
            price: item.price,
        }
    }
}

pub fn cart_total<'a>(items: impl IntoIterator<Item = &'a product_in_cart::Model>) -> f64 {
    items
        .into_iter()
        .map(|item| item.quantity as f64 * item.price)
        .sum()
}
