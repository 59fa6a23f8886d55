// storefront/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use mockable::Clock;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::cache::ProductCacheKey;
use crate::errors::AppError;
use crate::models::{NewProduct, Product};
use crate::state::AppState;
use crate::web::extractors::AdminUser;

const RECOMMENDATION_SAMPLE_SIZE: usize = 3;

/// The reduced product shape returned by the recommendations endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedProduct {
  pub id: Uuid,
  pub name: String,
  pub description: String,
  pub price: Decimal,
  pub image: String,
}

impl From<Product> for RecommendedProduct {
  fn from(product: Product) -> Self {
    Self {
      id: product.id,
      name: product.name,
      description: product.description,
      price: product.price,
      image: product.image,
    }
  }
}

#[instrument(name = "handler::list_products", skip(app_state, admin), fields(admin_id = %admin.user.id))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let products = app_state.stores.products.list_all().await?;
  info!("Fetched {} products.", products.len());
  Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

#[instrument(name = "handler::featured_products", skip(app_state))]
pub async fn featured_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products = app_state
    .featured
    .get_or_refresh(ProductCacheKey::Featured, || {
      app_state.stores.products.list_featured()
    })
    .await?;
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::recommended_products", skip(app_state))]
pub async fn recommended_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products: Vec<RecommendedProduct> = app_state
    .stores
    .products
    .sample(RECOMMENDATION_SAMPLE_SIZE)
    .await?
    .into_iter()
    .map(RecommendedProduct::from)
    .collect();
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::products_by_category", skip(app_state, path), fields(category = %path.as_ref()))]
pub async fn products_by_category_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let category = path.into_inner();
  let products = app_state.stores.products.list_by_category(&category).await?;
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::create_product", skip(app_state, admin, payload), fields(admin_id = %admin.user.id))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  payload: web::Json<NewProduct>,
) -> Result<HttpResponse, AppError> {
  let new_product = payload.into_inner();
  new_product.validate()?;

  let product = new_product.into_product(app_state.clock.utc());
  app_state.stores.products.insert(&product).await?;
  info!(product_id = %product.id, "Product created.");
  Ok(HttpResponse::Created().json(product))
}

#[instrument(name = "handler::toggle_featured", skip(app_state, admin, path), fields(product_id = %path.as_ref(), admin_id = %admin.user.id))]
pub async fn toggle_featured_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let product = app_state
    .stores
    .products
    .toggle_featured(product_id, app_state.clock.utc())
    .await?
    .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

  refresh_featured_cache(&app_state).await;
  info!(is_featured = product.is_featured, "Featured flag toggled.");
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::delete_product", skip(app_state, admin, path), fields(product_id = %path.as_ref(), admin_id = %admin.user.id))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  if !app_state.stores.products.delete(product_id).await? {
    warn!("Product to delete was not found.");
    return Err(AppError::NotFound("Product not found".to_string()));
  }
  app_state.featured.invalidate(&ProductCacheKey::Featured);
  info!("Product deleted.");
  Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted successfully" })))
}

/// Reloads featured products into the cache. A failed reload only drops the stale entry;
/// the next read loads again.
async fn refresh_featured_cache(app_state: &AppState) {
  match app_state.stores.products.list_featured().await {
    Ok(products) => app_state.featured.insert(ProductCacheKey::Featured, products),
    Err(e) => {
      warn!(error = %e, "Could not refresh featured products cache.");
      app_state.featured.invalidate(&ProductCacheKey::Featured);
    }
  }
}
