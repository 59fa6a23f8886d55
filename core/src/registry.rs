// core/src/registry.rs

//! `SagaRegistry<E>`: a type-keyed registry of sagas. A saga is looked up by the data
//! type of the `ContextData<TData>` it runs on, so each context type maps to one saga.

use crate::core::context_data::ContextData;
use crate::core::control::SagaOutcome;
use crate::error::SagaError;
use crate::saga::definition::Saga;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, Level};

#[async_trait]
trait AnySagaRunner<AppErr>: Send + Sync
where
  AppErr: std::error::Error + Send + Sync + 'static,
{
  /// `ctx_obj` is expected to hold a `ContextData<TData>`.
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<SagaOutcome, AppErr>;
}

struct SagaWrapper<TData, StepErr, AppErr>
where
  TData: 'static + Send + Sync,
  StepErr: std::error::Error + From<SagaError> + Send + Sync + 'static,
{
  saga: Arc<Saga<TData, StepErr>>,
  _app_err: PhantomData<fn() -> AppErr>,
}

#[async_trait]
impl<TData, StepErr, AppErr> AnySagaRunner<AppErr> for SagaWrapper<TData, StepErr, AppErr>
where
  TData: 'static + Send + Sync,
  StepErr: std::error::Error + From<SagaError> + Send + Sync + 'static,
  AppErr: std::error::Error + From<StepErr> + From<SagaError> + Send + Sync + 'static,
{
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<SagaOutcome, AppErr> {
    let typed_ctx_data = match ctx_obj.downcast::<ContextData<TData>>() {
      Ok(boxed) => *boxed,
      Err(_) => {
        let expected_type = std::any::type_name::<ContextData<TData>>();
        event!(Level::ERROR, %expected_type, "Context object type mismatch.");
        return Err(AppErr::from(SagaError::TypeMismatch {
          step_name: "registry_dispatch".to_string(),
          expected_type: expected_type.to_string(),
        }));
      }
    };
    self.saga.run(typed_ctx_data).await.map_err(AppErr::from)
  }
}

/// Registry returning results in the application's error type `E`.
pub struct SagaRegistry<E = SagaError>
where
  E: std::error::Error + From<SagaError> + Send + Sync + 'static,
{
  sagas: RwLock<HashMap<TypeId, Arc<dyn AnySagaRunner<E>>>>,
}

impl<E> SagaRegistry<E>
where
  E: std::error::Error + From<SagaError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      sagas: RwLock::new(HashMap::new()),
    }
  }

  /// Registers `saga` for its context data type, replacing any earlier registration.
  pub fn register_saga<TData, StepErr>(&self, saga: Saga<TData, StepErr>)
  where
    TData: 'static + Send + Sync,
    StepErr: std::error::Error + From<SagaError> + Send + Sync + 'static,
    E: From<StepErr>,
  {
    event!(
      Level::DEBUG,
      saga = %saga.name(),
      tdata_type = %std::any::type_name::<TData>(),
      "Registering saga."
    );
    let wrapper = SagaWrapper::<TData, StepErr, E> {
      saga: Arc::new(saga),
      _app_err: PhantomData,
    };
    self.sagas.write().insert(TypeId::of::<TData>(), Arc::new(wrapper));
  }

  pub fn contains<TData: 'static>(&self) -> bool {
    self.sagas.read().contains_key(&TypeId::of::<TData>())
  }

  /// Runs the saga registered for `TData`.
  pub async fn run<TData>(&self, ctx_data: ContextData<TData>) -> Result<SagaOutcome, E>
  where
    TData: 'static + Send + Sync,
  {
    let runner = {
      let sagas = self.sagas.read();
      sagas.get(&TypeId::of::<TData>()).cloned()
    };
    let Some(runner) = runner else {
      let type_name = std::any::type_name::<TData>();
      event!(Level::ERROR, tdata_type = %type_name, "No saga registered for context type.");
      return Err(E::from(SagaError::ConfigurationError {
        step_name: "SagaRegistry::run".to_string(),
        message: format!("No saga registered for TData type {}", type_name),
      }));
    };
    runner.run_erased(Box::new(ctx_data)).await
  }
}

impl<E> Default for SagaRegistry<E>
where
  E: std::error::Error + From<SagaError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}
