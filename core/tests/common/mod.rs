// tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use saga::{Compensation, ContextData, Handler, SagaError, StepControl};
use tracing::Level;

#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub steps_executed: Vec<String>,
  pub compensated: Vec<String>,
  pub halt_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  // SagaError is not Clone, so keep its Debug text for comparisons.
  #[error("Saga engine error: {0}")]
  Saga(String),

  #[error("Test step failed: {0}")]
  Step(String),

  #[error("Test compensation failed: {0}")]
  Compensation(String),
}

impl From<SagaError> for TestError {
  fn from(err: SagaError) -> Self {
    TestError::Saga(format!("{:?}", err))
  }
}

pub fn create_simple_handler(step_name: &'static str) -> Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.steps_executed.push(step_name.to_string());
      tracing::debug!(target: "test_handlers", step = %step_name, counter = guard.counter, "executed");
      if guard.halt_at.as_deref() == Some(step_name) {
        return Ok(StepControl::Halt);
      }
      Ok(StepControl::Continue)
    })
  })
}

pub fn create_failing_handler(
  step_name: &'static str,
  error_message: &'static str,
) -> Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      tracing::warn!(target: "test_handlers", step = %step_name, "failing with: '{}'", error_message);
      Err(TestError::Step(error_message.to_string()))
    })
  })
}

pub fn create_recording_compensation(step_name: &'static str) -> Compensation<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      ctx.write().compensated.push(step_name.to_string());
      Ok(())
    })
  })
}

pub fn create_failing_compensation(step_name: &'static str) -> Compensation<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      ctx.write().compensated.push(step_name.to_string());
      Err(TestError::Compensation(format!("cannot undo {}", step_name)))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
