// storefront/src/models/coupon.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A discount code. Each owner holds at most one coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
  pub code: String,
  pub discount_percentage: i32,
  pub expiration_date: DateTime<Utc>,
  pub owner_user_id: Uuid,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
}

impl Coupon {
  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
    self.expiration_date <= now
  }
}
