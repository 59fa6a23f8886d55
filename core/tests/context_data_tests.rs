// tests/context_data_tests.rs
mod common;

use common::*;
use saga::{ContextData, Saga, StepControl};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_steps_see_each_others_writes() {
  setup_tracing();
  let mut saga = Saga::<TestContext, TestError>::new("shared", &[("set", false, None), ("add", false, None)]);

  saga.on_step("set", |ctx: ContextData<TestContext>| async move {
    ctx.update(|data| data.counter = 10);
    Ok::<_, TestError>(StepControl::Continue)
  });
  saga.on_step("add", |ctx: ContextData<TestContext>| async move {
    let seen = ctx.with(|data| data.counter);
    assert_eq!(seen, 10);
    ctx.update(|data| data.counter += 5);
    Ok::<_, TestError>(StepControl::Continue)
  });

  let ctx = ContextData::new(TestContext::default());
  saga.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().counter, 15);
}

#[test]
fn test_clones_share_data() {
  let original = ContextData::new(TestContext {
    counter: 1,
    ..Default::default()
  });
  let cloned = original.clone();

  original.write().counter = 5;
  assert_eq!(cloned.read().counter, 5);

  cloned.update(|data| data.steps_executed.push("from_clone".to_string()));
  assert_eq!(original.with(|data| data.steps_executed.clone()), vec!["from_clone"]);
}
