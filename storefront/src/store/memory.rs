// storefront/src/store/memory.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use uuid::Uuid;

use super::{CouponStore, OrderStore, ProductStore, UserStore};
use crate::errors::{AppError, Result};
use crate::models::{CartEntry, Coupon, Order, Product, User};

/// Process-local store used when no database is configured, and by tests.
#[derive(Default)]
pub struct MemoryStore {
  products: RwLock<HashMap<Uuid, Product>>,
  users: RwLock<HashMap<Uuid, User>>,
  /// Keyed by owner: one coupon per user.
  coupons: RwLock<HashMap<Uuid, Coupon>>,
  orders: RwLock<HashMap<Uuid, Order>>,
}

fn sorted(mut products: Vec<Product>) -> Vec<Product> {
  products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
  products
}

#[async_trait]
impl ProductStore for MemoryStore {
  async fn list_all(&self) -> Result<Vec<Product>> {
    Ok(sorted(self.products.read().values().cloned().collect()))
  }

  async fn list_featured(&self) -> Result<Vec<Product>> {
    Ok(sorted(
      self.products.read().values().filter(|p| p.is_featured).cloned().collect(),
    ))
  }

  async fn list_by_category(&self, category: &str) -> Result<Vec<Product>> {
    Ok(sorted(
      self
        .products
        .read()
        .values()
        .filter(|p| p.category == category)
        .cloned()
        .collect(),
    ))
  }

  async fn sample(&self, size: usize) -> Result<Vec<Product>> {
    let all: Vec<Product> = self.products.read().values().cloned().collect();
    let mut rng = rand::thread_rng();
    Ok(all.choose_multiple(&mut rng, size).cloned().collect())
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>> {
    Ok(self.products.read().get(&id).cloned())
  }

  async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
    let products = self.products.read();
    Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
  }

  async fn insert(&self, product: &Product) -> Result<()> {
    self.products.write().insert(product.id, product.clone());
    Ok(())
  }

  async fn delete(&self, id: Uuid) -> Result<bool> {
    Ok(self.products.write().remove(&id).is_some())
  }

  async fn toggle_featured(&self, id: Uuid, now: DateTime<Utc>) -> Result<Option<Product>> {
    let mut products = self.products.write();
    Ok(products.get_mut(&id).map(|product| {
      product.is_featured = !product.is_featured;
      product.updated_at = now;
      product.clone()
    }))
  }
}

#[async_trait]
impl UserStore for MemoryStore {
  async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
    Ok(self.users.read().get(&id).cloned())
  }

  async fn insert(&self, user: &User) -> Result<()> {
    self.users.write().insert(user.id, user.clone());
    Ok(())
  }

  async fn save_cart(&self, user_id: Uuid, cart_items: &[CartEntry], now: DateTime<Utc>) -> Result<()> {
    let mut users = self.users.write();
    let user = users
      .get_mut(&user_id)
      .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
    user.cart_items = cart_items.to_vec();
    user.updated_at = now;
    Ok(())
  }
}

#[async_trait]
impl CouponStore for MemoryStore {
  async fn find_active(&self, code: &str, owner_user_id: Uuid) -> Result<Option<Coupon>> {
    Ok(
      self
        .coupons
        .read()
        .get(&owner_user_id)
        .filter(|c| c.is_active && c.code == code)
        .cloned(),
    )
  }

  async fn find_active_for_owner(&self, owner_user_id: Uuid) -> Result<Option<Coupon>> {
    Ok(self.coupons.read().get(&owner_user_id).filter(|c| c.is_active).cloned())
  }

  async fn replace_for_owner(&self, coupon: &Coupon) -> Result<()> {
    self.coupons.write().insert(coupon.owner_user_id, coupon.clone());
    Ok(())
  }

  async fn deactivate(&self, code: &str, owner_user_id: Uuid) -> Result<bool> {
    let mut coupons = self.coupons.write();
    match coupons.get_mut(&owner_user_id) {
      Some(coupon) if coupon.is_active && coupon.code == code => {
        coupon.is_active = false;
        Ok(true)
      }
      _ => Ok(false),
    }
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn insert(&self, order: &Order) -> Result<Uuid> {
    let mut orders = self.orders.write();
    if orders.values().any(|o| o.payment_session_id == order.payment_session_id) {
      return Err(AppError::Validation(format!(
        "An order already references payment session {}",
        order.payment_session_id
      )));
    }
    orders.insert(order.id, order.clone());
    Ok(order.id)
  }

  async fn find_by_session_reference(&self, reference: &str) -> Result<Option<Order>> {
    Ok(
      self
        .orders
        .read()
        .values()
        .find(|o| o.payment_session_id == reference)
        .cloned(),
    )
  }

  async fn save(&self, order: &Order) -> Result<()> {
    let mut orders = self.orders.write();
    match orders.get_mut(&order.id) {
      Some(stored) => {
        *stored = order.clone();
        Ok(())
      }
      None => Err(AppError::NotFound(format!("Order {} not found", order.id))),
    }
  }
}

impl MemoryStore {
  /// Number of stored orders.
  pub fn order_count(&self) -> usize {
    self.orders.read().len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, TimeZone};
  use crate::models::{NewProduct, UserRole};
  use rust_decimal_macros::dec;

  fn coupon(code: &str, owner: Uuid) -> Coupon {
    let now = Utc::now();
    Coupon {
      code: code.to_string(),
      discount_percentage: 10,
      expiration_date: now + Duration::days(30),
      owner_user_id: owner,
      is_active: true,
      created_at: now,
    }
  }

  #[tokio::test]
  async fn replacing_a_coupon_keeps_one_per_owner() {
    let store = MemoryStore::default();
    let owner = Uuid::new_v4();
    store.replace_for_owner(&coupon("GIFTAAAAAA", owner)).await.unwrap();
    store.replace_for_owner(&coupon("GIFTBBBBBB", owner)).await.unwrap();

    assert!(store.find_active("GIFTAAAAAA", owner).await.unwrap().is_none());
    let active = store.find_active_for_owner(owner).await.unwrap().unwrap();
    assert_eq!(active.code, "GIFTBBBBBB");
  }

  #[tokio::test]
  async fn coupon_lookup_is_scoped_to_owner() {
    let store = MemoryStore::default();
    let owner = Uuid::new_v4();
    store.replace_for_owner(&coupon("GIFT123456", owner)).await.unwrap();

    assert!(store.find_active("GIFT123456", Uuid::new_v4()).await.unwrap().is_none());
    assert!(store.deactivate("GIFT123456", owner).await.unwrap());
    assert!(!store.deactivate("GIFT123456", owner).await.unwrap());
    assert!(store.find_active("GIFT123456", owner).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn orders_are_found_by_session_reference() {
    let store = MemoryStore::default();
    let order = Order::pending(Uuid::new_v4(), Vec::new(), dec!(10), "ref_1".into(), Utc::now());
    let id = OrderStore::insert(&store, &order).await.unwrap();

    let found = store.find_by_session_reference("ref_1").await.unwrap().unwrap();
    assert_eq!(found.id, id);
    assert!(store.find_by_session_reference("ref_2").await.unwrap().is_none());
    assert!(OrderStore::insert(&store, &order).await.is_err());
    assert_eq!(store.order_count(), 1);
  }

  #[tokio::test]
  async fn toggle_and_save_cart_stamp_supplied_time() {
    let store = MemoryStore::default();
    let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let later = created + Duration::hours(3);

    let product = NewProduct {
      name: "Cap".to_string(),
      description: String::new(),
      price: dec!(12.50),
      image: None,
      category: "hats".to_string(),
    }
    .into_product(created);
    ProductStore::insert(&store, &product).await.unwrap();
    let user = User::new("Ada", "ada@example.com", UserRole::Customer, created);
    UserStore::insert(&store, &user).await.unwrap();

    let toggled = store.toggle_featured(product.id, later).await.unwrap().unwrap();
    assert!(toggled.is_featured);
    assert_eq!(toggled.updated_at, later);
    assert!(store.toggle_featured(Uuid::new_v4(), later).await.unwrap().is_none());

    let entries = vec![CartEntry { product_id: product.id, quantity: 2 }];
    store.save_cart(user.id, &entries, later).await.unwrap();
    let saved = UserStore::find_by_id(&store, user.id).await.unwrap().unwrap();
    assert_eq!(saved.cart_items, entries);
    assert_eq!(saved.updated_at, later);
    assert!(store.save_cart(Uuid::new_v4(), &entries, later).await.is_err());
  }
}
