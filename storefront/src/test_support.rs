// storefront/src/test_support.rs

//! Test doubles shared by unit and integration tests: a settable clock, an order store
//! that always fails and a fully wired in-memory `AppState`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::gateway::mock::MockGateway;
use crate::models::{Order, User, UserRole};
use crate::pipelines::register_all_pipelines;
use crate::services::auth_service;
use crate::state::AppState;
use crate::store::{MemoryStore, OrderStore, Stores};

pub const TEST_TOKEN_SECRET: &str = "test-access-token-secret";

pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
  pub fn new(now: DateTime<Utc>) -> Self {
    Self(Mutex::new(now))
  }

  pub fn advance(&self, delta: Duration) {
    *self.0.lock() += delta;
  }
}

impl Clock for MutableClock {
  fn local(&self) -> DateTime<Local> {
    self.utc().with_timezone(&Local)
  }

  fn utc(&self) -> DateTime<Utc> {
    *self.0.lock()
  }
}

/// Fixed instant the test state starts at.
pub fn fixed_now() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().unwrap_or_else(Utc::now)
}

/// An order store whose writes always fail.
#[derive(Default)]
pub struct FailingOrderStore;

#[async_trait]
impl OrderStore for FailingOrderStore {
  async fn insert(&self, _order: &Order) -> Result<Uuid> {
    Err(AppError::Internal("order store unavailable".to_string()))
  }

  async fn find_by_session_reference(&self, _reference: &str) -> Result<Option<Order>> {
    Ok(None)
  }

  async fn save(&self, _order: &Order) -> Result<()> {
    Err(AppError::Internal("order store unavailable".to_string()))
  }
}

/// Configuration for tests: mock gateway, known token secret, defaults elsewhere.
pub fn test_config(overrides: &[(&str, &str)]) -> AppConfig {
  let mut vars: HashMap<String, String> = HashMap::from([
    ("PAYMENT_GATEWAY".to_string(), "mock".to_string()),
    ("ACCESS_TOKEN_SECRET".to_string(), TEST_TOKEN_SECRET.to_string()),
  ]);
  for (key, value) in overrides {
    vars.insert(key.to_string(), value.to_string());
  }
  AppConfig::from_lookup(move |key: &str| vars.get(key).cloned()).expect("test configuration is valid")
}

/// An `AppState` over in-memory stores and the mock gateway, with sagas registered.
pub struct TestApp {
  pub state: AppState,
  pub memory: Arc<MemoryStore>,
  pub gateway: Arc<MockGateway>,
  pub clock: Arc<MutableClock>,
}

impl TestApp {
  pub fn new() -> Self {
    Self::with_config(test_config(&[]))
  }

  pub fn with_config(config: AppConfig) -> Self {
    let memory = Arc::new(MemoryStore::default());
    Self::build(config, memory.clone(), Stores::from_single(memory))
  }

  /// Same as `new`, but orders go to `orders` instead of the memory store.
  pub fn with_order_store(orders: Arc<dyn OrderStore>) -> Self {
    let memory = Arc::new(MemoryStore::default());
    let stores = Stores::from_single(memory.clone()).with_orders(orders);
    Self::build(test_config(&[]), memory, stores)
  }

  fn build(config: AppConfig, memory: Arc<MemoryStore>, stores: Stores) -> Self {
    let gateway = Arc::new(MockGateway::new());
    let clock = Arc::new(MutableClock::new(fixed_now()));
    let state = AppState::new(Arc::new(config), stores, gateway.clone(), clock.clone());
    register_all_pipelines(&state.sagas);
    Self {
      state,
      memory,
      gateway,
      clock,
    }
  }

  /// Stores a new user and returns it with a valid access token.
  pub async fn user_with_token(&self, role: UserRole) -> (User, String) {
    let email = format!("{}@example.com", Uuid::new_v4().simple());
    let user = User::new("Test User", email, role, self.clock.utc());
    self.state.stores.users.insert(&user).await.expect("insert test user");
    let token = self.token_for(&user);
    (user, token)
  }

  pub fn token_for(&self, user: &User) -> String {
    auth_service::issue_access_token(user.id, TEST_TOKEN_SECRET, Duration::hours(1), self.clock.utc())
      .expect("sign test token")
  }
}

impl Default for TestApp {
  fn default() -> Self {
    Self::new()
  }
}
