// storefront/src/gateway/mod.rs

//! The payment gateway port: hosted payment sessions opened at checkout and verified
//! afterwards by reference.

pub mod mock;
pub mod paystack;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{AppConfig, GatewayKind};
use crate::models::CartLine;

pub use mock::MockGateway;
pub use paystack::PaystackGateway;

/// Status string the gateway reports for a settled payment.
pub const SUCCESS_STATUS: &str = "success";

#[derive(Debug, Error)]
pub enum GatewayError {
  #[error("Payment gateway request failed: {0}")]
  Transport(String),

  /// Non-2xx answer; `message` is the provider's own explanation.
  #[error("{message}")]
  Rejected { status: u16, message: String },

  #[error("Unexpected payment gateway response: {0}")]
  Decode(String),

  #[error("Payment gateway misconfigured: {0}")]
  Configuration(String),
}

/// Snapshot of one cart line stored in the session metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataLineItem {
  pub id: Uuid,
  pub quantity: i32,
  pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
  pub display_name: String,
  pub variable_name: String,
  pub value: String,
}

/// Metadata attached to a session and echoed back on verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
  pub user_id: Uuid,
  /// Code of the coupon actually applied to the total. Empty when none was applied,
  /// including when a submitted code was unknown or expired.
  #[serde(default)]
  pub coupon_code: String,
  /// JSON text of `[{id, quantity, price}]`.
  #[serde(default)]
  pub products: String,
  #[serde(default, rename = "custom_fields")]
  pub custom_fields: Vec<CustomField>,
}

impl SessionMetadata {
  pub fn new(user_id: Uuid, coupon_code: Option<&str>, lines: &[CartLine]) -> Result<Self, GatewayError> {
    let snapshot: Vec<MetadataLineItem> = lines
      .iter()
      .map(|line| MetadataLineItem {
        id: line.product_id,
        quantity: line.quantity,
        price: line.unit_price,
      })
      .collect();
    let products = serde_json::to_string(&snapshot).map_err(|e| GatewayError::Decode(e.to_string()))?;

    Ok(Self {
      user_id,
      coupon_code: coupon_code.unwrap_or_default().to_string(),
      products,
      custom_fields: vec![CustomField {
        display_name: "Order Type".to_string(),
        variable_name: "order_type".to_string(),
        value: "product_purchase".to_string(),
      }],
    })
  }

  /// The coupon redeemed with this payment, if any.
  pub fn coupon(&self) -> Option<&str> {
    let code = self.coupon_code.trim();
    (!code.is_empty()).then_some(code)
  }

  pub fn line_items(&self) -> Result<Vec<MetadataLineItem>, GatewayError> {
    serde_json::from_str(&self.products).map_err(|e| GatewayError::Decode(format!("products metadata: {}", e)))
  }
}

#[derive(Debug, Clone)]
pub struct SessionRequest {
  pub email: String,
  /// Amount in the smallest currency unit.
  pub amount_minor: i64,
  pub metadata: SessionMetadata,
  pub callback_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
  pub reference: String,
  pub authorization_url: String,
}

#[derive(Debug, Clone)]
pub struct VerifiedPayment {
  pub reference: String,
  pub status: String,
  pub amount_minor: i64,
  pub metadata: Option<SessionMetadata>,
  pub paid_at: Option<DateTime<Utc>>,
}

impl VerifiedPayment {
  pub fn is_successful(&self) -> bool {
    self.status == SUCCESS_STATUS
  }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  async fn initialize_session(&self, request: &SessionRequest) -> Result<PaymentSession, GatewayError>;

  async fn verify_session(&self, reference: &str) -> Result<VerifiedPayment, GatewayError>;

  /// Releases a session that no order will ever reference. Hosted checkouts expire on
  /// their own, so the default only records the orphan.
  async fn abandon_session(&self, reference: &str) -> Result<(), GatewayError> {
    tracing::warn!(%reference, "Orphaned payment session left to expire at the gateway.");
    Ok(())
  }
}

pub fn build_gateway(config: &AppConfig) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
  match config.payment_gateway {
    GatewayKind::Mock => {
      tracing::warn!("Using the in-process mock payment gateway.");
      Ok(Arc::new(MockGateway::new()))
    }
    GatewayKind::Paystack => {
      let secret_key = config
        .paystack_secret_key
        .clone()
        .ok_or_else(|| GatewayError::Configuration("PAYSTACK_SECRET_KEY is not set".to_string()))?;
      let gateway = PaystackGateway::new(
        &config.paystack_base_url,
        secret_key,
        Duration::from_secs(config.gateway_timeout_secs),
      )?;
      Ok(Arc::new(gateway))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  #[test]
  fn metadata_carries_cart_snapshot_and_empty_coupon() {
    let user_id = Uuid::new_v4();
    let product_id = Uuid::new_v4();
    let lines = vec![CartLine {
      product_id,
      quantity: 2,
      unit_price: dec!(50),
    }];

    let metadata = SessionMetadata::new(user_id, None, &lines).unwrap();

    assert_eq!(metadata.coupon_code, "");
    assert_eq!(metadata.coupon(), None);
    let items = metadata.line_items().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, product_id);
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].price, dec!(50));

    let json = serde_json::to_value(&metadata).unwrap();
    assert_eq!(json["userId"], user_id.to_string());
    assert_eq!(json["custom_fields"][0]["variable_name"], "order_type");
  }

  #[test]
  fn coupon_is_reported_when_present() {
    let metadata = SessionMetadata::new(Uuid::new_v4(), Some("GIFTABC123"), &[]).unwrap();
    assert_eq!(metadata.coupon(), Some("GIFTABC123"));
  }
}
