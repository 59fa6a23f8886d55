// storefront/src/seed.rs

//! Demo data for local runs: a small catalog, an admin and a customer. Access tokens for
//! both users are logged since sign-in is handled elsewhere.

use chrono::Duration;
use mockable::Clock;
use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::errors::Result;
use crate::models::{NewProduct, User, UserRole};
use crate::services::auth_service;
use crate::state::AppState;

const DEMO_TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedResult {
  Applied { products: usize },
  AlreadySeeded,
}

fn demo_catalog() -> Vec<(NewProduct, bool)> {
  let product = |name: &str, description: &str, cents: i64, category: &str| NewProduct {
    name: name.to_string(),
    description: description.to_string(),
    price: Decimal::new(cents, 2),
    image: Some(format!("https://picsum.photos/seed/{}/600/600", name.to_lowercase().replace(' ', "-"))),
    category: category.to_string(),
  };
  vec![
    (product("Denim Jacket", "Classic blue denim", 8999, "jackets"), true),
    (product("Canvas Sneakers", "Everyday low-tops", 5000, "shoes"), true),
    (product("Leather Boots", "Waterproof ankle boots", 12950, "shoes"), false),
    (product("Linen Shirt", "Breathable summer shirt", 2500, "t-shirts"), false),
    (product("Aviator Glasses", "Polarised lenses", 4500, "glasses"), true),
    (product("Tote Bag", "Heavy cotton tote", 1999, "bags"), false),
  ]
}

/// Seeds the demo catalog and users unless products already exist.
#[instrument(name = "seed::seed_demo_data", skip(app_state))]
pub async fn seed_demo_data(app_state: &AppState) -> Result<SeedResult> {
  let stores = &app_state.stores;
  if !stores.products.list_all().await?.is_empty() {
    info!("Catalog is not empty; demo data seeding skipped.");
    return Ok(SeedResult::AlreadySeeded);
  }

  let now = app_state.clock.utc();
  let catalog = demo_catalog();
  let count = catalog.len();
  for (new_product, featured) in catalog {
    let mut product = new_product.into_product(now);
    product.is_featured = featured;
    stores.products.insert(&product).await?;
  }

  let admin = User::new("Demo Admin", "admin@storefront.local", UserRole::Admin, now);
  let customer = User::new("Demo Customer", "customer@storefront.local", UserRole::Customer, now);
  for user in [&admin, &customer] {
    stores.users.insert(user).await?;
    let token = auth_service::issue_access_token(
      user.id,
      &app_state.config.access_token_secret,
      Duration::days(DEMO_TOKEN_TTL_DAYS),
      now,
    )?;
    info!(user_id = %user.id, email = %user.email, role = ?user.role, access_token = %token, "Demo user created.");
  }

  info!(products = count, "Demo data seeded.");
  Ok(SeedResult::Applied { products: count })
}
