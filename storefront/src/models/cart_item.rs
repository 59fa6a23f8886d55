// storefront/src/models/cart_item.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Product;

/// A line of the cart submitted at checkout. Never stored on its own; the price is the
/// one the client saw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
  #[serde(alias = "_id", alias = "id")]
  pub product_id: Uuid,
  pub quantity: i32,
  #[serde(alias = "price")]
  pub unit_price: Decimal,
}

/// A product from the catalog joined with the quantity held in a cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProductView {
  #[serde(flatten)]
  pub product: Product,
  pub quantity: i32,
}
