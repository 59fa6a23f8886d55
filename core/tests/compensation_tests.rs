// tests/compensation_tests.rs
mod common;

use common::*;
use saga::{ContextData, Saga};
use serial_test::serial;

fn three_step_saga() -> Saga<TestContext, TestError> {
  Saga::new(
    "three_steps",
    &[("reserve", false, None), ("charge", false, None), ("ship", false, None)],
  )
}

#[tokio::test]
#[serial]
async fn test_failure_compensates_completed_steps_in_reverse() {
  setup_tracing();
  let mut saga = Saga::<TestContext, TestError>::new(
    "reverse",
    &[("reserve", false, None), ("charge", false, None), ("notify", false, None), ("ship", false, None)],
  );
  saga.on_step("reserve", create_simple_handler("reserve"));
  saga.on_step("charge", create_simple_handler("charge"));
  saga.on_step("notify", create_simple_handler("notify"));
  saga.on_step("ship", create_failing_handler("ship", "carrier offline"));
  saga.compensate_step("reserve", create_recording_compensation("reserve"));
  saga.compensate_step("charge", create_recording_compensation("charge"));

  let ctx = ContextData::new(TestContext::default());
  let err = saga.run(ctx.clone()).await.unwrap_err();

  assert_eq!(err, TestError::Step("carrier offline".to_string()));
  // "notify" has no compensation and is passed over.
  assert_eq!(ctx.read().compensated, vec!["charge", "reserve"]);
}

#[tokio::test]
#[serial]
async fn test_failing_step_is_not_compensated_itself() {
  setup_tracing();
  let mut saga = three_step_saga();
  saga.on_step("reserve", create_simple_handler("reserve"));
  saga.on_step("charge", create_failing_handler("charge", "card declined"));
  saga.on_step("ship", create_simple_handler("ship"));
  saga.compensate_step("reserve", create_recording_compensation("reserve"));
  saga.compensate_step("charge", create_recording_compensation("charge"));

  let ctx = ContextData::new(TestContext::default());
  let err = saga.run(ctx.clone()).await.unwrap_err();

  assert_eq!(err, TestError::Step("card declined".to_string()));
  let guard = ctx.read();
  assert_eq!(guard.compensated, vec!["reserve"]);
  assert_eq!(guard.steps_executed, vec!["reserve", "charge"]);
}

#[tokio::test]
#[serial]
async fn test_compensation_failure_keeps_original_error() {
  setup_tracing();
  let mut saga = three_step_saga();
  saga.on_step("reserve", create_simple_handler("reserve"));
  saga.on_step("charge", create_simple_handler("charge"));
  saga.on_step("ship", create_failing_handler("ship", "no stock"));
  saga.compensate_step("reserve", create_recording_compensation("reserve"));
  saga.compensate_step("charge", create_failing_compensation("charge"));

  let ctx = ContextData::new(TestContext::default());
  let err = saga.run(ctx.clone()).await.unwrap_err();

  assert_eq!(err, TestError::Step("no stock".to_string()));
  assert_eq!(ctx.read().compensated, vec!["charge", "reserve"]);
}

#[tokio::test]
#[serial]
async fn test_completed_saga_runs_no_compensation() {
  setup_tracing();
  let mut saga = three_step_saga();
  for step in ["reserve", "charge", "ship"] {
    saga.on_step(step, create_simple_handler(step));
    saga.compensate_step(step, create_recording_compensation(step));
  }

  let ctx = ContextData::new(TestContext::default());
  saga.run(ctx.clone()).await.unwrap();

  assert!(ctx.read().compensated.is_empty());
}
