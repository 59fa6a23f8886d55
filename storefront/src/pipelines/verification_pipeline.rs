// storefront/src/pipelines/verification_pipeline.rs

//! Payment verification saga. A non-success gateway status halts the saga before any
//! local state is read or written.

use crate::errors::{AppError, Result as AppResult};
use crate::pipelines::contexts::VerifyPaymentCtxData;
use saga::{ContextData, Saga, SagaRegistry, SkipCondition, StepControl};
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const CONFIRM_WITH_GATEWAY: &str = "confirm_with_gateway";
pub const LOAD_ORDER: &str = "load_order";
pub const RELEASE_REDEEMED_COUPON: &str = "release_redeemed_coupon";
pub const MARK_ORDER_PAID: &str = "mark_order_paid";

pub fn build_verification_saga() -> Saga<VerifyPaymentCtxData, AppError> {
  let no_redeemed_coupon: SkipCondition<VerifyPaymentCtxData> =
    Arc::new(|ctx_data: ContextData<VerifyPaymentCtxData>| {
      let guard = ctx_data.read();
      guard
        .payment
        .as_ref()
        .and_then(|p| p.metadata.as_ref())
        .and_then(|m| m.coupon())
        .is_none()
    });

  let mut saga = Saga::<VerifyPaymentCtxData, AppError>::new(
    "verify_payment",
    &[
      (CONFIRM_WITH_GATEWAY, false, None),
      (LOAD_ORDER, false, None),
      // Coupons and orders share no transaction; this write is best effort.
      (RELEASE_REDEEMED_COUPON, true, Some(no_redeemed_coupon)),
      (MARK_ORDER_PAID, false, None),
    ],
  );

  saga.on_step(CONFIRM_WITH_GATEWAY, confirm_with_gateway);
  saga.on_step(LOAD_ORDER, load_order);
  saga.on_step(RELEASE_REDEEMED_COUPON, release_redeemed_coupon);
  saga.on_step(MARK_ORDER_PAID, mark_order_paid);
  saga
}

pub fn register_verification_pipeline(sagas: &SagaRegistry<AppError>) {
  sagas.register_saga(build_verification_saga());
}

#[instrument(name = "verify::confirm_with_gateway", skip_all)]
async fn confirm_with_gateway(ctx_data: ContextData<VerifyPaymentCtxData>) -> AppResult<StepControl> {
  let (reference, gateway) = ctx_data.with(|ctx| (ctx.reference.clone(), ctx.app_state.gateway.clone()));

  let payment = gateway.verify_session(&reference).await?;
  if !payment.is_successful() {
    warn!(%reference, status = %payment.status, "Gateway reports payment not successful.");
    ctx_data.update(|ctx| ctx.rejected_status = Some(payment.status.clone()));
    return Ok(StepControl::Halt);
  }

  info!(%reference, amount_minor = payment.amount_minor, "Gateway confirmed payment.");
  ctx_data.update(|ctx| ctx.payment = Some(payment));
  Ok(StepControl::Continue)
}

#[instrument(name = "verify::load_order", skip_all)]
async fn load_order(ctx_data: ContextData<VerifyPaymentCtxData>) -> AppResult<StepControl> {
  let (reference, caller_id, orders) = ctx_data.with(|ctx| {
    (
      ctx.reference.clone(),
      ctx.caller_id,
      ctx.app_state.stores.orders.clone(),
    )
  });

  let order = orders.find_by_session_reference(&reference).await?.ok_or_else(|| {
    warn!(%reference, "Paid session has no matching order.");
    AppError::NotFound("Order not found".to_string())
  })?;
  if order.owner_user_id != caller_id {
    warn!(order_id = %order.id, %caller_id, "Payment verified by a user other than the order owner.");
  }
  ctx_data.update(|ctx| ctx.order = Some(order));
  Ok(StepControl::Continue)
}

#[instrument(name = "verify::release_redeemed_coupon", skip_all)]
async fn release_redeemed_coupon(ctx_data: ContextData<VerifyPaymentCtxData>) -> AppResult<StepControl> {
  let (redeemed, coupons) = ctx_data.with(|ctx| {
    let redeemed = ctx
      .payment
      .as_ref()
      .and_then(|p| p.metadata.as_ref())
      .and_then(|m| m.coupon().map(|code| (code.to_string(), m.user_id)));
    (redeemed, ctx.app_state.stores.coupons.clone())
  });
  let Some((code, owner_user_id)) = redeemed else {
    return Ok(StepControl::Continue);
  };

  let released = coupons.deactivate(&code, owner_user_id).await?;
  if released {
    info!(%code, %owner_user_id, "Redeemed coupon deactivated.");
  } else {
    info!(%code, %owner_user_id, "No active coupon matched; nothing to deactivate.");
  }
  ctx_data.update(|ctx| ctx.coupon_released = released);
  Ok(StepControl::Continue)
}

#[instrument(name = "verify::mark_order_paid", skip_all)]
async fn mark_order_paid(ctx_data: ContextData<VerifyPaymentCtxData>) -> AppResult<StepControl> {
  let (mut order, paid_at, now, orders) = {
    let guard = ctx_data.read();
    let order = guard
      .order
      .clone()
      .ok_or_else(|| AppError::Internal("Order missing before payment update".to_string()))?;
    let now = guard.app_state.clock.utc();
    let paid_at = guard.payment.as_ref().and_then(|p| p.paid_at).unwrap_or(now);
    (order, paid_at, now, guard.app_state.stores.orders.clone())
  };

  order.mark_paid(paid_at, now);
  orders.save(&order).await?;
  info!(order_id = %order.id, "Order marked paid.");
  ctx_data.update(|ctx| ctx.order = Some(order));
  Ok(StepControl::Continue)
}
