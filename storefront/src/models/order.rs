// storefront/src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

/// `Failed` exists in the stored enum for manual reconciliation; a rejected verification
/// leaves the order untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Paid,
  Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
  pub product_id: Uuid,
  pub quantity: i32,
  pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub owner_user_id: Uuid,
  #[sqlx(json)]
  pub line_items: Vec<OrderLineItem>,
  /// Amount before conversion to minor units, as charged when the session opened.
  pub total_amount: Decimal,
  /// Gateway reference of the payment session.
  pub payment_session_id: String,
  pub status: OrderStatus,
  pub paid_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  pub fn pending(
    owner_user_id: Uuid,
    line_items: Vec<OrderLineItem>,
    total_amount: Decimal,
    payment_session_id: String,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      id: Uuid::new_v4(),
      owner_user_id,
      line_items,
      total_amount,
      payment_session_id,
      status: OrderStatus::Pending,
      paid_at: None,
      created_at: now,
      updated_at: now,
    }
  }

  /// Marks the order paid. Repeating the call keeps the first payment time.
  pub fn mark_paid(&mut self, paid_at: DateTime<Utc>, now: DateTime<Utc>) {
    if self.status != OrderStatus::Paid {
      self.status = OrderStatus::Paid;
      self.paid_at = Some(paid_at);
    }
    self.updated_at = now;
  }
}
