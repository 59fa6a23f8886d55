// storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use mockable::Clock;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{CartEntry, CartProductView};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartPayload {
  pub product_id: Uuid,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartPayload {
  #[serde(default)]
  pub product_id: Option<Uuid>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateQuantityPayload {
  pub quantity: i32,
}

/// Adds one unit of `product_id`, creating the entry when it is not in the cart yet.
pub fn add_item(cart: &mut Vec<CartEntry>, product_id: Uuid) {
  match cart.iter_mut().find(|entry| entry.product_id == product_id) {
    Some(entry) => entry.quantity = entry.quantity.saturating_add(1),
    None => cart.push(CartEntry { product_id, quantity: 1 }),
  }
}

/// Removes the entry for `product_id`, or every entry when no id is given.
pub fn remove_item(cart: &mut Vec<CartEntry>, product_id: Option<Uuid>) {
  match product_id {
    Some(id) => cart.retain(|entry| entry.product_id != id),
    None => cart.clear(),
  }
}

/// Sets the quantity of an existing entry. Zero removes it.
pub fn set_quantity(cart: &mut Vec<CartEntry>, product_id: Uuid, quantity: i32) -> Result<(), AppError> {
  if quantity < 0 {
    return Err(AppError::Validation("Quantity must not be negative".to_string()));
  }
  let position = cart
    .iter()
    .position(|entry| entry.product_id == product_id)
    .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

  if quantity == 0 {
    cart.remove(position);
  } else {
    cart[position].quantity = quantity;
  }
  Ok(())
}

#[instrument(name = "handler::get_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let cart = auth_user.user.cart_items;
  let ids: Vec<Uuid> = cart.iter().map(|entry| entry.product_id).collect();
  let mut products: HashMap<Uuid, _> = app_state
    .stores
    .products
    .find_many(&ids)
    .await?
    .into_iter()
    .map(|product| (product.id, product))
    .collect();

  // Entries whose product has since been deleted are left out.
  let items: Vec<CartProductView> = cart
    .iter()
    .filter_map(|entry| {
      products.remove(&entry.product_id).map(|product| CartProductView {
        product,
        quantity: entry.quantity,
      })
    })
    .collect();

  Ok(HttpResponse::Ok().json(items))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, payload, auth_user),
  fields(user_id = %auth_user.user.id, product_id = %payload.product_id)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<AddToCartPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product_id = payload.product_id;
  if app_state.stores.products.find_by_id(product_id).await?.is_none() {
    warn!("Attempt to add unknown product to cart.");
    return Err(AppError::NotFound("Product not found".to_string()));
  }

  let mut user = auth_user.user;
  add_item(&mut user.cart_items, product_id);
  app_state
    .stores
    .users
    .save_cart(user.id, &user.cart_items, app_state.clock.utc())
    .await?;

  info!(entries = user.cart_items.len(), "Product added to cart.");
  Ok(HttpResponse::Ok().json(user.cart_items))
}

/// The body is optional here; an empty body clears the whole cart.
#[instrument(name = "handler::remove_from_cart", skip(app_state, body, auth_user), fields(user_id = %auth_user.user.id))]
pub async fn remove_from_cart_handler(
  app_state: web::Data<AppState>,
  body: web::Bytes,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let payload: RemoveFromCartPayload = if body.iter().all(u8::is_ascii_whitespace) {
    RemoveFromCartPayload::default()
  } else {
    serde_json::from_slice(&body).map_err(|e| AppError::Validation(e.to_string()))?
  };

  let mut user = auth_user.user;
  remove_item(&mut user.cart_items, payload.product_id);
  app_state
    .stores
    .users
    .save_cart(user.id, &user.cart_items, app_state.clock.utc())
    .await?;

  info!(product_id = ?payload.product_id, "Cart entries removed.");
  Ok(HttpResponse::Ok().json(user.cart_items))
}

#[instrument(
  name = "handler::update_quantity",
  skip(app_state, path, payload, auth_user),
  fields(user_id = %auth_user.user.id, product_id = %path.as_ref(), quantity = payload.quantity)
)]
pub async fn update_quantity_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateQuantityPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let mut user = auth_user.user;
  set_quantity(&mut user.cart_items, product_id, payload.quantity)?;
  app_state
    .stores
    .users
    .save_cart(user.id, &user.cart_items, app_state.clock.utc())
    .await?;
  Ok(HttpResponse::Ok().json(user.cart_items))
}
