// storefront/src/state.rs
use crate::cache::{FeaturedProductsCache, TtlCache};
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::gateway::PaymentGateway;
use crate::store::Stores;
use chrono::Duration;
use mockable::Clock;
use saga::SagaRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub stores: Stores,
  pub gateway: Arc<dyn PaymentGateway>,
  pub featured: Arc<FeaturedProductsCache>,
  pub clock: Arc<dyn Clock + Send + Sync>,
  pub sagas: Arc<SagaRegistry<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Sagas still need registering, see `pipelines::register_all_pipelines`.
  pub fn new(
    config: Arc<AppConfig>,
    stores: Stores,
    gateway: Arc<dyn PaymentGateway>,
    clock: Arc<dyn Clock + Send + Sync>,
  ) -> Self {
    let featured = Arc::new(TtlCache::new(
      Duration::seconds(config.featured_cache_ttl_secs),
      clock.clone(),
    ));
    Self {
      stores,
      gateway,
      featured,
      clock,
      sagas: Arc::new(SagaRegistry::new()),
      config,
    }
  }
}
