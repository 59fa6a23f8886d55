// storefront/src/web/routes.rs

use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::web::handlers::{cart_handlers, checkout_handlers, coupon_handlers, product_handlers};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// JSON bodies that fail to parse (a cart that is not a list, a missing field) are
/// validation errors.
pub fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

pub fn path_config() -> web::PathConfig {
  web::PathConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("", web::post().to(product_handlers::create_product_handler))
          .route("/featured", web::get().to(product_handlers::featured_products_handler))
          .route(
            "/recommendations",
            web::get().to(product_handlers::recommended_products_handler),
          )
          .route(
            "/category/{category}",
            web::get().to(product_handlers::products_by_category_handler),
          )
          .route("/{product_id}", web::patch().to(product_handlers::toggle_featured_handler))
          .route("/{product_id}", web::delete().to(product_handlers::delete_product_handler)),
      )
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::get_cart_handler))
          .route("", web::post().to(cart_handlers::add_to_cart_handler))
          .route("", web::delete().to(cart_handlers::remove_from_cart_handler))
          .route("/{product_id}", web::put().to(cart_handlers::update_quantity_handler)),
      )
      .service(
        web::scope("/coupons")
          .route("", web::get().to(coupon_handlers::get_coupon_handler))
          .route("/validate", web::post().to(coupon_handlers::validate_coupon_handler)),
      )
      .service(
        web::scope("/checkout")
          .route("/session", web::post().to(checkout_handlers::create_checkout_session_handler))
          .route("/verify", web::post().to(checkout_handlers::verify_payment_handler)),
      ),
  );
}
