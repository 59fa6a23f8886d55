// tests/registry_tests.rs
mod common;

use common::*;
use saga::{ContextData, Saga, SagaOutcome, SagaRegistry};
use serial_test::serial;

#[derive(Clone, Debug, Default)]
struct UnregisteredContext {
  touched: bool,
}

#[tokio::test]
#[serial]
async fn test_registry_runs_saga_for_context_type() {
  setup_tracing();
  let registry = SagaRegistry::<TestError>::new();
  let mut saga = Saga::<TestContext, TestError>::new("registered", &[("only", false, None)]);
  saga.on_step("only", create_simple_handler("only"));
  registry.register_saga(saga);

  assert!(registry.contains::<TestContext>());
  assert!(!registry.contains::<UnregisteredContext>());

  let ctx = ContextData::new(TestContext::default());
  let outcome = registry.run(ctx.clone()).await.unwrap();

  assert_eq!(outcome, SagaOutcome::Completed);
  assert_eq!(ctx.read().steps_executed, vec!["only"]);
}

#[tokio::test]
#[serial]
async fn test_registry_reports_missing_saga() {
  setup_tracing();
  let registry = SagaRegistry::<TestError>::new();

  let ctx = ContextData::new(UnregisteredContext::default());
  let err = registry.run(ctx.clone()).await.unwrap_err();

  match err {
    TestError::Saga(message) => assert!(message.contains("ConfigurationError"), "got: {}", message),
    other => panic!("Expected a saga error, got {:?}", other),
  }
  assert!(!ctx.read().touched);
}

#[tokio::test]
#[serial]
async fn test_registering_again_replaces_saga() {
  setup_tracing();
  let registry = SagaRegistry::<TestError>::default();

  let mut first = Saga::<TestContext, TestError>::new("first", &[("a", false, None)]);
  first.on_step("a", create_simple_handler("a"));
  registry.register_saga(first);

  let mut second = Saga::<TestContext, TestError>::new("second", &[("b", false, None)]);
  second.on_step("b", create_simple_handler("b"));
  registry.register_saga(second);

  let ctx = ContextData::new(TestContext::default());
  registry.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().steps_executed, vec!["b"]);
}

#[tokio::test]
#[serial]
async fn test_registry_propagates_step_errors() {
  setup_tracing();
  let registry = SagaRegistry::<TestError>::new();
  let mut saga = Saga::<TestContext, TestError>::new("failing", &[("bad", false, None)]);
  saga.on_step("bad", create_failing_handler("bad", "nope"));
  registry.register_saga(saga);

  let err = registry.run(ContextData::new(TestContext::default())).await.unwrap_err();
  assert_eq!(err, TestError::Step("nope".to_string()));
}
