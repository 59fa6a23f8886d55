// storefront/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::CartLine;
use crate::pipelines::contexts::{CheckoutCtxData, VerifyPaymentCtxData};
use crate::services::pricing;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use saga::{ContextData, SagaOutcome};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionPayload {
  #[serde(alias = "products")]
  pub line_items: Vec<CartLine>,
  #[serde(default)]
  pub coupon_code: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct VerifyPaymentPayload {
  pub reference: String,
}

#[instrument(
  name = "handler::create_checkout_session",
  skip(app_state, auth_user, payload),
  fields(user_id = %auth_user.user.id, lines = payload.line_items.len())
)]
pub async fn create_checkout_session_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<CreateSessionPayload>,
) -> Result<HttpResponse, AppError> {
  let CreateSessionPayload {
    line_items,
    coupon_code,
  } = payload.into_inner();

  let checkout_ctx = ContextData::new(CheckoutCtxData::new(
    app_state.get_ref().clone(),
    &auth_user.user,
    line_items,
    coupon_code,
  ));

  match app_state.sagas.run(checkout_ctx.clone()).await? {
    SagaOutcome::Completed => {
      let guard = checkout_ctx.read();
      let session = guard.session.as_ref().ok_or_else(|| {
        AppError::Internal("Checkout completed without a payment session".to_string())
      })?;
      let order_id = guard
        .order_id
        .ok_or_else(|| AppError::Internal("Checkout completed without an order".to_string()))?;

      info!(
        reference = %session.reference,
        %order_id,
        total = %guard.total_amount,
        reward_issued = guard.reward_coupon.is_some(),
        "Checkout session created."
      );
      Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": {
          "authorizationUrl": session.authorization_url,
          "reference": session.reference,
          "totalAmount": guard.total_amount,
          "orderId": order_id,
        }
      })))
    }
    SagaOutcome::Halted { step } => {
      warn!(%step, "Checkout saga halted unexpectedly.");
      Err(AppError::Internal(format!("Checkout halted at step '{}'", step)))
    }
  }
}

#[instrument(
  name = "handler::verify_payment",
  skip(app_state, auth_user, payload),
  fields(user_id = %auth_user.user.id, reference = %payload.reference)
)]
pub async fn verify_payment_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<VerifyPaymentPayload>,
) -> Result<HttpResponse, AppError> {
  let reference = payload.into_inner().reference.trim().to_string();
  if reference.is_empty() {
    return Err(AppError::Validation("Payment reference is required".to_string()));
  }

  let verify_ctx = ContextData::new(VerifyPaymentCtxData::new(
    app_state.get_ref().clone(),
    auth_user.user.id,
    reference,
  ));

  match app_state.sagas.run(verify_ctx.clone()).await? {
    SagaOutcome::Completed => {
      let guard = verify_ctx.read();
      let payment = guard
        .payment
        .as_ref()
        .ok_or_else(|| AppError::Internal("Verification completed without a payment".to_string()))?;
      let order = guard
        .order
        .as_ref()
        .ok_or_else(|| AppError::Internal("Verification completed without an order".to_string()))?;
      let payment_date: Option<DateTime<Utc>> = order.paid_at;

      info!(order_id = %order.id, coupon_released = guard.coupon_released, "Payment verified.");
      Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Payment verified successfully",
        "data": {
          "orderId": order.id,
          "amount": pricing::from_minor_units(payment.amount_minor),
          "paymentDate": payment_date,
        }
      })))
    }
    SagaOutcome::Halted { step } => {
      let status = verify_ctx
        .read()
        .rejected_status
        .clone()
        .unwrap_or_else(|| "unknown".to_string());
      warn!(%step, %status, "Payment was not successful.");
      Err(AppError::VerificationRejected { status })
    }
  }
}
