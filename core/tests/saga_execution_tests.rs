// tests/saga_execution_tests.rs
mod common;

use common::*;
use saga::{ContextData, Saga, SagaError, SagaOutcome, SkipCondition, StepControl};
use serial_test::serial;
use std::sync::Arc;

#[tokio::test]
#[serial]
async fn test_saga_runs_steps_in_order() {
  setup_tracing();
  let mut saga = Saga::<TestContext, TestError>::new(
    "ordered",
    &[("step1", false, None), ("step2", false, None), ("step3", false, None)],
  );
  saga.on_step("step1", create_simple_handler("step1"));
  saga.on_step("step2", create_simple_handler("step2"));
  saga.on_step("step3", create_simple_handler("step3"));

  assert_eq!(saga.step_names(), vec!["step1", "step2", "step3"]);

  let ctx = ContextData::new(TestContext::default());
  let outcome = saga.run(ctx.clone()).await.unwrap();

  assert_eq!(outcome, SagaOutcome::Completed);
  assert!(outcome.is_completed());
  let guard = ctx.read();
  assert_eq!(guard.counter, 3);
  assert_eq!(guard.steps_executed, vec!["step1", "step2", "step3"]);
}

#[tokio::test]
#[serial]
async fn test_halt_stops_saga_without_compensation() {
  setup_tracing();
  let mut saga = Saga::<TestContext, TestError>::new(
    "halting",
    &[("stepA", false, None), ("stepB", false, None), ("stepC", false, None)],
  );
  saga.on_step("stepA", create_simple_handler("stepA"));
  saga.on_step("stepB", create_simple_handler("stepB"));
  saga.on_step("stepC", create_simple_handler("stepC"));
  saga.compensate_step("stepA", create_recording_compensation("stepA"));

  let ctx = ContextData::new(TestContext {
    halt_at: Some("stepB".to_string()),
    ..Default::default()
  });
  let outcome = saga.run(ctx.clone()).await.unwrap();

  assert_eq!(
    outcome,
    SagaOutcome::Halted {
      step: "stepB".to_string()
    }
  );
  assert!(!outcome.is_completed());
  let guard = ctx.read();
  assert_eq!(guard.steps_executed, vec!["stepA", "stepB"]);
  assert!(guard.compensated.is_empty());
}

#[tokio::test]
#[serial]
async fn test_skip_condition_skips_step() {
  setup_tracing();
  let skip_when_counter_positive: SkipCondition<TestContext> =
    Arc::new(|ctx: ContextData<TestContext>| ctx.read().counter > 0);
  let mut saga = Saga::<TestContext, TestError>::new(
    "skipping",
    &[("first", false, None), ("maybe", false, Some(skip_when_counter_positive)), ("last", false, None)],
  );
  saga.on_step("first", create_simple_handler("first"));
  saga.on_step("maybe", create_simple_handler("maybe"));
  saga.on_step("last", create_simple_handler("last"));

  let ctx = ContextData::new(TestContext::default());
  saga.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().steps_executed, vec!["first", "last"]);
}

#[tokio::test]
#[serial]
async fn test_optional_step_without_action_is_skipped() {
  setup_tracing();
  let mut saga = Saga::<TestContext, TestError>::new("optional_gap", &[("present", false, None), ("absent", true, None)]);
  saga.on_step("present", create_simple_handler("present"));

  let ctx = ContextData::new(TestContext::default());
  let outcome = saga.run(ctx.clone()).await.unwrap();

  assert_eq!(outcome, SagaOutcome::Completed);
  assert_eq!(ctx.read().steps_executed, vec!["present"]);
}

#[tokio::test]
#[serial]
async fn test_required_step_without_action_fails_and_compensates() {
  setup_tracing();
  let mut saga = Saga::<TestContext, TestError>::new("required_gap", &[("present", false, None), ("absent", false, None)]);
  saga.on_step("present", create_simple_handler("present"));
  saga.compensate_step("present", create_recording_compensation("present"));

  let ctx = ContextData::new(TestContext::default());
  let err = saga.run(ctx.clone()).await.unwrap_err();

  match err {
    TestError::Saga(message) => assert!(message.contains("HandlerMissing"), "got: {}", message),
    other => panic!("Expected a saga error, got {:?}", other),
  }
  assert_eq!(ctx.read().compensated, vec!["present"]);
}

#[tokio::test]
#[serial]
async fn test_optional_step_failure_does_not_stop_saga() {
  setup_tracing();
  let mut saga = Saga::<TestContext, TestError>::new(
    "optional_failure",
    &[("before", false, None), ("flaky", true, None), ("after", false, None)],
  );
  saga.on_step("before", create_simple_handler("before"));
  saga.on_step("flaky", create_failing_handler("flaky", "boom"));
  saga.on_step("after", create_simple_handler("after"));
  saga.compensate_step("before", create_recording_compensation("before"));

  let ctx = ContextData::new(TestContext::default());
  let outcome = saga.run(ctx.clone()).await.unwrap();

  assert_eq!(outcome, SagaOutcome::Completed);
  let guard = ctx.read();
  assert_eq!(guard.steps_executed, vec!["before", "flaky", "after"]);
  assert!(guard.compensated.is_empty());
}

#[tokio::test]
#[serial]
async fn test_action_error_type_converts_into_saga_error_type() {
  setup_tracing();
  let mut saga = Saga::<TestContext, TestError>::new("converting", &[("engine_failure", false, None)]);
  saga.on_step("engine_failure", |_ctx: ContextData<TestContext>| {
    Box::pin(async move { Err::<StepControl, SagaError>(SagaError::Internal("engine".to_string())) })
  });

  let err = saga.run(ContextData::new(TestContext::default())).await.unwrap_err();
  assert!(matches!(err, TestError::Saga(ref m) if m.contains("Internal")));
}

#[test]
#[should_panic(expected = "Step not found")]
fn test_registering_unknown_step_panics() {
  let mut saga = Saga::<TestContext, TestError>::new("typo", &[("real", false, None)]);
  saga.on_step("reel", create_simple_handler("reel"));
}

#[test]
fn test_step_flags_can_be_changed_after_creation() {
  let mut saga = Saga::<TestContext, TestError>::new("flags", &[("a", false, None)]);
  saga.set_optional("a", true);
  saga.set_skip_condition("a", Some(Arc::new(|_ctx: ContextData<TestContext>| true)));
  saga.compensate_step("a", create_recording_compensation("a"));
  assert!(saga.has_compensation("a"));
  assert_eq!(saga.name(), "flags");
}
