// core/src/saga/hooks.rs

//! Registration of step actions and compensations.

use tracing::{event, Level};

use crate::core::context_data::ContextData;
use crate::core::control::StepControl;
use crate::core::handler::{Compensation, Handler};
use crate::error::SagaError;
use crate::saga::definition::Saga;
use std::future::Future;

impl<TData, E> Saga<TData, E>
where
  TData: 'static + Send + Sync,
  E: std::error::Error + From<SagaError> + Send + Sync + 'static,
{
  /// Sets the action for a step, replacing any previous one.
  ///
  /// The action's own error type only needs to convert into the saga's `E`.
  ///
  /// # Panics
  /// If the step does not exist.
  pub fn on_step<F, UserErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<E> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let action: Handler<TData, E> = Box::new(move |ctx_data| {
      let user_fut = handler_fn(ctx_data);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    });
    if self.actions.insert(step_name.to_string(), action).is_some() {
      event!(Level::DEBUG, saga = %self.name, %step_name, "Replaced existing step action.");
    }
  }

  /// Sets the compensation for a step. It runs only if the step completed and a later
  /// non-optional step fails.
  ///
  /// # Panics
  /// If the step does not exist.
  pub fn compensate_step<F, UserErr>(
    &mut self,
    step_name: &str,
    compensation_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<(), UserErr>> + Send + 'static,
    UserErr: Into<E> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let compensation: Compensation<TData, E> = Box::new(move |ctx_data| {
      let user_fut = compensation_fn(ctx_data);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    });
    self.compensations.insert(step_name.to_string(), compensation);
  }
}
