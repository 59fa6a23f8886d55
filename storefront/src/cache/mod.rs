// storefront/src/cache/mod.rs

//! A small time-to-live cache with an injected clock, used for the featured-products
//! read path.

use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

use crate::models::Product;

struct Entry<V> {
  value: V,
  expires_at: DateTime<Utc>,
}

pub struct TtlCache<K, V> {
  entries: Mutex<HashMap<K, Entry<V>>>,
  ttl: Duration,
  clock: Arc<dyn Clock + Send + Sync>,
}

impl<K, V> TtlCache<K, V>
where
  K: Eq + Hash + Clone + std::fmt::Debug,
  V: Clone,
{
  pub fn new(ttl: Duration, clock: Arc<dyn Clock + Send + Sync>) -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
      ttl,
      clock,
    }
  }

  /// The cached value, unless it has expired. Expired entries are evicted here.
  pub fn get(&self, key: &K) -> Option<V> {
    let now = self.clock.utc();
    let mut entries = self.entries.lock();
    match entries.get(key) {
      Some(entry) if now < entry.expires_at => Some(entry.value.clone()),
      Some(_) => {
        debug!(?key, "Cache entry expired.");
        entries.remove(key);
        None
      }
      None => None,
    }
  }

  pub fn insert(&self, key: K, value: V) {
    let expires_at = self.clock.utc() + self.ttl;
    self.entries.lock().insert(key, Entry { value, expires_at });
  }

  pub fn invalidate(&self, key: &K) {
    self.entries.lock().remove(key);
  }

  /// Returns the cached value or loads, stores and returns a fresh one. A failed load
  /// leaves the cache untouched.
  pub async fn get_or_refresh<F, Fut, E>(&self, key: K, loader: F) -> Result<V, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>>,
  {
    if let Some(value) = self.get(&key) {
      return Ok(value);
    }
    debug!(?key, "Cache miss, loading.");
    let value = loader().await?;
    self.insert(key, value.clone());
    Ok(value)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductCacheKey {
  Featured,
}

pub type FeaturedProductsCache = TtlCache<ProductCacheKey, Vec<Product>>;
