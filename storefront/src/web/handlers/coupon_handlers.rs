// storefront/src/web/handlers/coupon_handlers.rs

use actix_web::{web, HttpResponse};
use mockable::Clock;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::services::coupon_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct ValidateCouponPayload {
  pub code: String,
}

/// The caller's redeemable coupon, or `null`.
#[instrument(name = "handler::get_coupon", skip(app_state, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn get_coupon_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let now = app_state.clock.utc();
  let enforce = app_state.config.enforce_coupon_expiration;
  let coupon = app_state
    .stores
    .coupons
    .find_active_for_owner(auth_user.user.id)
    .await?
    .filter(|coupon| coupon_service::is_redeemable(coupon, now, enforce));
  Ok(HttpResponse::Ok().json(coupon))
}

#[instrument(name = "handler::validate_coupon", skip(app_state, payload, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn validate_coupon_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<ValidateCouponPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let coupon = coupon_service::find_redeemable(
    app_state.stores.coupons.as_ref(),
    &payload.code,
    auth_user.user.id,
    app_state.clock.utc(),
    app_state.config.enforce_coupon_expiration,
  )
  .await?
  .ok_or_else(|| AppError::NotFound("Coupon not found".to_string()))?;

  info!(code = %coupon.code, "Coupon validated.");
  Ok(HttpResponse::Ok().json(json!({
    "message": "Coupon is valid",
    "code": coupon.code,
    "discountPercentage": coupon.discount_percentage,
  })))
}
