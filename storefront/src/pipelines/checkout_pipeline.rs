// storefront/src/pipelines/checkout_pipeline.rs

//! Checkout saga: price the submitted cart, apply a coupon, open a hosted payment
//! session, record the pending order and reward large orders with a coupon.
//!
//! If the order cannot be stored after the session opened, the session is abandoned
//! by the compensation of `open_payment_session`.

use crate::errors::{AppError, Result as AppResult};
use crate::gateway::{SessionMetadata, SessionRequest};
use crate::models::{Order, OrderLineItem};
use crate::pipelines::contexts::CheckoutCtxData;
use crate::services::{coupon_service, pricing};
use saga::{ContextData, Saga, SagaRegistry, SkipCondition, StepControl};
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const VALIDATE_CART_LINES: &str = "validate_cart_lines";
pub const PRICE_CART: &str = "price_cart";
pub const APPLY_COUPON_DISCOUNT: &str = "apply_coupon_discount";
pub const OPEN_PAYMENT_SESSION: &str = "open_payment_session";
pub const PERSIST_PENDING_ORDER: &str = "persist_pending_order";
pub const ISSUE_REWARD_COUPON: &str = "issue_reward_coupon";

pub fn build_checkout_saga() -> Saga<CheckoutCtxData, AppError> {
  let no_coupon_code: SkipCondition<CheckoutCtxData> =
    Arc::new(|ctx_data: ContextData<CheckoutCtxData>| ctx_data.read().coupon_code.is_none());
  let below_reward_threshold: SkipCondition<CheckoutCtxData> = Arc::new(|ctx_data: ContextData<CheckoutCtxData>| {
    let guard = ctx_data.read();
    guard.total_amount < guard.app_state.config.reward_threshold
  });

  let mut saga = Saga::<CheckoutCtxData, AppError>::new(
    "checkout",
    &[
      (VALIDATE_CART_LINES, false, None),
      (PRICE_CART, false, None),
      (APPLY_COUPON_DISCOUNT, false, Some(no_coupon_code)),
      (OPEN_PAYMENT_SESSION, false, None),
      (PERSIST_PENDING_ORDER, false, None),
      // A failed reward never fails the checkout.
      (ISSUE_REWARD_COUPON, true, Some(below_reward_threshold)),
    ],
  );

  saga.on_step(VALIDATE_CART_LINES, validate_cart_lines);
  saga.on_step(PRICE_CART, price_cart);
  saga.on_step(APPLY_COUPON_DISCOUNT, apply_coupon_discount);
  saga.on_step(OPEN_PAYMENT_SESSION, open_payment_session);
  saga.compensate_step(OPEN_PAYMENT_SESSION, abandon_payment_session);
  saga.on_step(PERSIST_PENDING_ORDER, persist_pending_order);
  saga.on_step(ISSUE_REWARD_COUPON, issue_reward_coupon);
  saga
}

pub fn register_checkout_pipeline(sagas: &SagaRegistry<AppError>) {
  sagas.register_saga(build_checkout_saga());
}

#[instrument(name = "checkout::validate_cart_lines", skip_all)]
async fn validate_cart_lines(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<StepControl> {
  ctx_data.with(|ctx| pricing::validate_cart(&ctx.lines))?;
  Ok(StepControl::Continue)
}

#[instrument(name = "checkout::price_cart", skip_all)]
async fn price_cart(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<StepControl> {
  let subtotal = ctx_data.with(|ctx| pricing::cart_total(&ctx.lines))?;
  ctx_data.update(|ctx| {
    ctx.subtotal = subtotal;
    ctx.total_amount = subtotal;
  });
  info!(%subtotal, "Cart priced.");
  Ok(StepControl::Continue)
}

/// An unknown, inactive or (under the enforcing policy) expired code is ignored and the
/// checkout continues at full price.
#[instrument(name = "checkout::apply_coupon_discount", skip_all)]
async fn apply_coupon_discount(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<StepControl> {
  let (code, buyer_id, coupons, now, enforce_expiration) = {
    let guard = ctx_data.read();
    let Some(code) = guard.coupon_code.clone() else {
      return Ok(StepControl::Continue);
    };
    (
      code,
      guard.buyer_id,
      guard.app_state.stores.coupons.clone(),
      guard.app_state.clock.utc(),
      guard.app_state.config.enforce_coupon_expiration,
    )
  };

  let Some(coupon) = coupon_service::find_redeemable(coupons.as_ref(), &code, buyer_id, now, enforce_expiration).await?
  else {
    info!(%code, "Coupon not redeemable for buyer; charging full price.");
    return Ok(StepControl::Continue);
  };

  let discounted = {
    let mut guard = ctx_data.write();
    guard.total_amount = pricing::apply_discount(guard.subtotal, coupon.discount_percentage)?;
    guard.applied_coupon = Some(coupon.clone());
    guard.total_amount
  };
  info!(code = %coupon.code, percentage = coupon.discount_percentage, total = %discounted, "Coupon applied.");
  Ok(StepControl::Continue)
}

#[instrument(name = "checkout::open_payment_session", skip_all)]
async fn open_payment_session(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<StepControl> {
  let (request, gateway) = {
    let guard = ctx_data.read();
    let amount_minor = pricing::to_minor_units(guard.total_amount)?;
    let applied_code = guard.applied_coupon.as_ref().map(|c| c.code.as_str());
    let metadata = SessionMetadata::new(guard.buyer_id, applied_code, &guard.lines)?;
    (
      SessionRequest {
        email: guard.buyer_email.clone(),
        amount_minor,
        metadata,
        callback_url: guard.app_state.config.payment_callback_url(),
      },
      guard.app_state.gateway.clone(),
    )
  };

  let session = gateway.initialize_session(&request).await?;
  info!(reference = %session.reference, amount_minor = request.amount_minor, "Payment session opened.");
  ctx_data.update(|ctx| {
    ctx.amount_minor = request.amount_minor;
    ctx.session = Some(session);
  });
  Ok(StepControl::Continue)
}

async fn abandon_payment_session(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<()> {
  let (reference, gateway) = {
    let guard = ctx_data.read();
    (
      guard.session.as_ref().map(|s| s.reference.clone()),
      guard.app_state.gateway.clone(),
    )
  };
  let Some(reference) = reference else {
    return Ok(());
  };
  warn!(%reference, "Abandoning payment session with no order.");
  gateway.abandon_session(&reference).await?;
  Ok(())
}

#[instrument(name = "checkout::persist_pending_order", skip_all)]
async fn persist_pending_order(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<StepControl> {
  let (order, orders) = {
    let guard = ctx_data.read();
    let session = guard
      .session
      .as_ref()
      .ok_or_else(|| AppError::Internal("Payment session missing before order creation".to_string()))?;
    let line_items = guard
      .lines
      .iter()
      .map(|line| OrderLineItem {
        product_id: line.product_id,
        quantity: line.quantity,
        price: line.unit_price,
      })
      .collect();
    let order = Order::pending(
      guard.buyer_id,
      line_items,
      guard.total_amount,
      session.reference.clone(),
      guard.app_state.clock.utc(),
    );
    (order, guard.app_state.stores.orders.clone())
  };

  let order_id = orders.insert(&order).await?;
  info!(%order_id, "Pending order stored.");
  ctx_data.update(|ctx| ctx.order_id = Some(order_id));
  Ok(StepControl::Continue)
}

#[instrument(name = "checkout::issue_reward_coupon", skip_all)]
async fn issue_reward_coupon(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<StepControl> {
  let (buyer_id, coupons, now) = {
    let guard = ctx_data.read();
    (guard.buyer_id, guard.app_state.stores.coupons.clone(), guard.app_state.clock.utc())
  };
  let coupon = coupon_service::issue_reward_coupon(coupons.as_ref(), buyer_id, now).await?;
  ctx_data.update(|ctx| ctx.reward_coupon = Some(coupon));
  Ok(StepControl::Continue)
}
