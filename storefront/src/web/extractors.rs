// storefront/src/web/extractors.rs

//! Request guards: `AuthenticatedUser` resolves the caller from an access token and
//! `AdminUser` additionally requires the admin role.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use mockable::Clock;
use tracing::warn;

use crate::errors::AppError;
use crate::models::User;
use crate::services::auth_service;
use crate::state::AppState;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub user: User,
}

/// The token from the `accessToken` cookie, or else from an `Authorization: Bearer` header.
fn access_token_from(req: &HttpRequest) -> Option<String> {
  if let Some(cookie) = req.cookie(ACCESS_TOKEN_COOKIE) {
    let value = cookie.value().trim();
    if !value.is_empty() {
      return Some(value.to_string());
    }
  }
  req
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|value| value.to_str().ok())
    .and_then(|value| value.strip_prefix("Bearer "))
    .map(|token| token.trim().to_string())
    .filter(|token| !token.is_empty())
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let app_state = req.app_data::<web::Data<AppState>>().cloned();
    let token = access_token_from(req);

    Box::pin(async move {
      let app_state =
        app_state.ok_or_else(|| AppError::Internal("Application state is not configured".to_string()))?;
      let token = token.ok_or_else(|| {
        warn!("Request without access token.");
        AppError::Auth("Unauthorized - No access token provided".to_string())
      })?;
      let claims = auth_service::decode_access_token(
        &token,
        &app_state.config.access_token_secret,
        app_state.clock.utc(),
      )?;
      let user = app_state
        .stores
        .users
        .find_by_id(claims.user_id)
        .await?
        .ok_or_else(|| AppError::Auth("Unauthorized - User not found".to_string()))?;
      Ok(AuthenticatedUser { user })
    })
  }
}

#[derive(Debug, Clone)]
pub struct AdminUser {
  pub user: User,
}

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
    let authenticated = AuthenticatedUser::from_request(req, payload);
    Box::pin(async move {
      let AuthenticatedUser { user } = authenticated.await?;
      if !user.is_admin() {
        warn!(user_id = %user.id, "Non-admin user denied.");
        return Err(AppError::Forbidden("Unauthorized - Admin only".to_string()));
      }
      Ok(AdminUser { user })
    })
  }
}
