// storefront/src/store/mod.rs

//! Storage ports used by the handlers and sagas, plus the in-memory and PostgreSQL
//! adapters behind them.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{CartEntry, Coupon, Order, Product, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait ProductStore: Send + Sync {
  async fn list_all(&self) -> Result<Vec<Product>>;
  async fn list_featured(&self) -> Result<Vec<Product>>;
  async fn list_by_category(&self, category: &str) -> Result<Vec<Product>>;
  /// Up to `size` products chosen at random.
  async fn sample(&self, size: usize) -> Result<Vec<Product>>;
  async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>>;
  /// Products among `ids` that exist, in no particular order.
  async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>>;
  async fn insert(&self, product: &Product) -> Result<()>;
  /// Returns false when no product had that id.
  async fn delete(&self, id: Uuid) -> Result<bool>;
  /// Flips `is_featured`, stamps `updated_at` with `now` and returns the updated product.
  async fn toggle_featured(&self, id: Uuid, now: DateTime<Utc>) -> Result<Option<Product>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
  async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
  async fn insert(&self, user: &User) -> Result<()>;
  async fn save_cart(&self, user_id: Uuid, cart_items: &[CartEntry], now: DateTime<Utc>) -> Result<()>;
}

#[async_trait]
pub trait CouponStore: Send + Sync {
  async fn find_active(&self, code: &str, owner_user_id: Uuid) -> Result<Option<Coupon>>;
  async fn find_active_for_owner(&self, owner_user_id: Uuid) -> Result<Option<Coupon>>;
  /// Stores `coupon` as the owner's only coupon, in one atomic write.
  async fn replace_for_owner(&self, coupon: &Coupon) -> Result<()>;
  /// Returns false when no active coupon matched.
  async fn deactivate(&self, code: &str, owner_user_id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  async fn insert(&self, order: &Order) -> Result<Uuid>;
  async fn find_by_session_reference(&self, reference: &str) -> Result<Option<Order>>;
  async fn save(&self, order: &Order) -> Result<()>;
}

/// The set of stores shared through `AppState`.
#[derive(Clone)]
pub struct Stores {
  pub products: Arc<dyn ProductStore>,
  pub users: Arc<dyn UserStore>,
  pub coupons: Arc<dyn CouponStore>,
  pub orders: Arc<dyn OrderStore>,
}

impl Stores {
  pub fn in_memory() -> Self {
    Self::from_single(Arc::new(MemoryStore::default()))
  }

  pub fn postgres(pool: PgPool) -> Self {
    Self::from_single(Arc::new(PgStore::new(pool)))
  }

  pub fn from_single<S>(store: Arc<S>) -> Self
  where
    S: ProductStore + UserStore + CouponStore + OrderStore + 'static,
  {
    Self {
      products: store.clone(),
      users: store.clone(),
      coupons: store.clone(),
      orders: store,
    }
  }

  /// Swaps the order store, keeping the rest.
  pub fn with_orders(mut self, orders: Arc<dyn OrderStore>) -> Self {
    self.orders = orders;
    self
  }
}
