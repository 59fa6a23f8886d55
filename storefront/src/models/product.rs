// storefront/src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub description: String,
  pub price: Decimal,
  /// Public URL of the product image.
  pub image: String,
  pub category: String,
  pub is_featured: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Request body for creating a product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
  pub name: String,
  #[serde(default)]
  pub description: String,
  pub price: Decimal,
  #[serde(default)]
  pub image: Option<String>,
  pub category: String,
}

impl NewProduct {
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(AppError::Validation("Product name is required".to_string()));
    }
    if self.category.trim().is_empty() {
      return Err(AppError::Validation("Product category is required".to_string()));
    }
    if self.price.is_sign_negative() {
      return Err(AppError::Validation("Product price must not be negative".to_string()));
    }
    Ok(())
  }

  pub fn into_product(self, now: DateTime<Utc>) -> Product {
    Product {
      id: Uuid::new_v4(),
      name: self.name.trim().to_string(),
      description: self.description,
      price: self.price,
      image: self.image.unwrap_or_default(),
      category: self.category.trim().to_string(),
      is_featured: false,
      created_at: now,
      updated_at: now,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  fn draft(name: &str, price: Decimal) -> NewProduct {
    NewProduct {
      name: name.to_string(),
      description: String::new(),
      price,
      image: None,
      category: "jeans".to_string(),
    }
  }

  #[test]
  fn rejects_blank_name_and_negative_price() {
    assert!(matches!(draft("  ", dec!(10)).validate(), Err(AppError::Validation(_))));
    assert!(matches!(draft("Tee", dec!(-1)).validate(), Err(AppError::Validation(_))));
    assert!(draft("Tee", dec!(0)).validate().is_ok());
  }

  #[test]
  fn new_products_start_unfeatured() {
    let now = Utc::now();
    let product = draft(" Tee ", dec!(19.99)).into_product(now);
    assert_eq!(product.name, "Tee");
    assert!(!product.is_featured);
    assert_eq!(product.image, "");
    assert_eq!(product.created_at, now);
  }
}
