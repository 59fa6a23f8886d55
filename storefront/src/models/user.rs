// storefront/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
  Customer,
  Admin,
}

/// One product in a user's saved cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
  pub product_id: Uuid,
  pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: Uuid,
  pub name: String,
  pub email: String,
  pub role: UserRole,
  #[sqlx(json)]
  pub cart_items: Vec<CartEntry>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl User {
  pub fn new(name: impl Into<String>, email: impl Into<String>, role: UserRole, now: DateTime<Utc>) -> Self {
    Self {
      id: Uuid::new_v4(),
      name: name.into(),
      email: email.into(),
      role,
      cart_items: Vec::new(),
      created_at: now,
      updated_at: now,
    }
  }

  pub fn is_admin(&self) -> bool {
    self.role == UserRole::Admin
  }
}
