// storefront/src/pipelines/contexts.rs

//! Data structs the sagas run on. Handlers build them and wrap them in
//! `saga::ContextData`.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::gateway::{PaymentSession, VerifiedPayment};
use crate::models::{CartLine, Coupon, Order, User};
use crate::state::AppState;

#[derive(Clone)]
pub struct CheckoutCtxData {
  pub app_state: AppState,
  pub buyer_id: Uuid,
  pub buyer_email: String,
  pub lines: Vec<CartLine>,
  /// `None` when the client sent no code or a blank one.
  pub coupon_code: Option<String>,

  pub subtotal: Decimal,
  /// Subtotal less any coupon discount; this is what gets charged and stored.
  pub total_amount: Decimal,
  pub applied_coupon: Option<Coupon>,
  pub amount_minor: i64,
  pub session: Option<PaymentSession>,
  pub order_id: Option<Uuid>,
  pub reward_coupon: Option<Coupon>,
}

impl CheckoutCtxData {
  pub fn new(app_state: AppState, buyer: &User, lines: Vec<CartLine>, coupon_code: Option<String>) -> Self {
    Self {
      app_state,
      buyer_id: buyer.id,
      buyer_email: buyer.email.clone(),
      lines,
      coupon_code: coupon_code
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty()),
      subtotal: Decimal::ZERO,
      total_amount: Decimal::ZERO,
      applied_coupon: None,
      amount_minor: 0,
      session: None,
      order_id: None,
      reward_coupon: None,
    }
  }
}

#[derive(Clone)]
pub struct VerifyPaymentCtxData {
  pub app_state: AppState,
  pub caller_id: Uuid,
  pub reference: String,

  pub payment: Option<VerifiedPayment>,
  /// Gateway status when it reported anything but success.
  pub rejected_status: Option<String>,
  pub order: Option<Order>,
  pub coupon_released: bool,
}

impl VerifyPaymentCtxData {
  pub fn new(app_state: AppState, caller_id: Uuid, reference: String) -> Self {
    Self {
      app_state,
      caller_id,
      reference,
      payment: None,
      rejected_status: None,
      order: None,
      coupon_released: false,
    }
  }
}
