// storefront/tests/workflow_tests.rs

mod common;

use parking_lot::Mutex;
use serial_test::serial;
use std::sync::Arc;

use common::{create_failing_handler, create_simple_handler, setup_tracing};
use plant_storefront::errors::AppError;
use plant_storefront::workflow::{ContextData, Pipeline, PipelineControl, PipelineResult, WorkflowError, Workflows};

#[derive(Debug, Default)]
struct TestCtx {
  counter: i32,
  use_express: bool,
}

#[derive(Debug, Default)]
struct UnregisteredCtx;

type Log = Arc<Mutex<Vec<String>>>;

fn new_log() -> Log {
  Arc::new(Mutex::new(Vec::new()))
}

#[tokio::test]
#[serial]
async fn test_pipeline_runs_steps_in_order() {
  setup_tracing();
  let log = new_log();
  let mut p = Pipeline::<TestCtx>::new(&[("first", false), ("second", false)]);
  p.on_root("second", create_simple_handler(log.clone(), "second:on", PipelineControl::Continue));
  p.after_root("first", create_simple_handler(log.clone(), "first:after", PipelineControl::Continue));
  p.on_root("first", create_simple_handler(log.clone(), "first:on", PipelineControl::Continue));
  p.before_root("first", create_simple_handler(log.clone(), "first:before", PipelineControl::Continue));

  let result = p.run(ContextData::new(TestCtx::default())).await.unwrap();

  assert_eq!(result, PipelineResult::Completed);
  assert_eq!(*log.lock(), vec!["first:before", "first:on", "first:after", "second:on"]);
}

#[tokio::test]
#[serial]
async fn test_handlers_share_mutable_context() {
  setup_tracing();
  let mut p = Pipeline::<TestCtx>::new(&[("bump", false), ("double", false)]);
  p.on_root("bump", |ctx: ContextData<TestCtx>| async move {
    ctx.write().counter += 3;
    Ok::<_, AppError>(PipelineControl::Continue)
  });
  p.on_root("double", |ctx: ContextData<TestCtx>| async move {
    ctx.write().counter *= 2;
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  let ctx = ContextData::new(TestCtx::default());
  p.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().counter, 6);
}

#[tokio::test]
#[serial]
async fn test_stop_halts_remaining_steps() {
  setup_tracing();
  let log = new_log();
  let mut p = Pipeline::<TestCtx>::new(&[("gate", false), ("never", false)]);
  p.on_root("gate", create_simple_handler(log.clone(), "gate", PipelineControl::Stop));
  p.on_root("never", create_simple_handler(log.clone(), "never", PipelineControl::Continue));

  let result = p.run(ContextData::new(TestCtx::default())).await.unwrap();

  assert_eq!(result, PipelineResult::Stopped);
  assert_eq!(*log.lock(), vec!["gate"]);
}

#[tokio::test]
#[serial]
async fn test_handler_error_propagates_unchanged() {
  setup_tracing();
  let log = new_log();
  let mut p = Pipeline::<TestCtx>::new(&[("validate", false), ("persist", false)]);
  p.on_root("validate", create_failing_handler("bad input"));
  p.on_root("persist", create_simple_handler(log.clone(), "persist", PipelineControl::Continue));

  let err = p.run(ContextData::new(TestCtx::default())).await.unwrap_err();

  assert!(matches!(err, AppError::Validation(ref msg) if msg == "bad input"));
  assert!(log.lock().is_empty());
}

#[tokio::test]
#[serial]
async fn test_skip_if_bypasses_step() {
  setup_tracing();
  let log = new_log();
  let mut p = Pipeline::<TestCtx>::new(&[("standard", false), ("express", false)]);
  p.skip_if("standard", |data| data.use_express);
  p.skip_if("express", |data| !data.use_express);
  p.on_root("standard", create_simple_handler(log.clone(), "standard", PipelineControl::Continue));
  p.on_root("express", create_simple_handler(log.clone(), "express", PipelineControl::Continue));

  let ctx = ContextData::new(TestCtx {
    use_express: true,
    ..TestCtx::default()
  });
  p.run(ctx).await.unwrap();

  assert_eq!(*log.lock(), vec!["express"]);
}

#[tokio::test]
#[serial]
async fn test_optional_step_failure_does_not_fail_pipeline() {
  setup_tracing();
  let log = new_log();
  let mut p = Pipeline::<TestCtx>::new(&[("persist", false), ("notify", true), ("finish", false)]);
  p.on_root("persist", create_simple_handler(log.clone(), "persist", PipelineControl::Continue));
  p.on_root("notify", create_failing_handler("mail server down"));
  p.after_root("notify", create_simple_handler(log.clone(), "notify:after", PipelineControl::Continue));
  p.on_root("finish", create_simple_handler(log.clone(), "finish", PipelineControl::Continue));

  let result = p.run(ContextData::new(TestCtx::default())).await.unwrap();

  assert_eq!(result, PipelineResult::Completed);
  // The failed step's remaining phases are abandoned.
  assert_eq!(*log.lock(), vec!["persist", "finish"]);
}

#[tokio::test]
#[serial]
async fn test_optional_step_without_handlers_is_skipped() {
  setup_tracing();
  let log = new_log();
  let mut p = Pipeline::<TestCtx>::new(&[("maybe", true), ("work", false)]);
  p.on_root("work", create_simple_handler(log.clone(), "work", PipelineControl::Continue));

  let result = p.run(ContextData::new(TestCtx::default())).await.unwrap();
  assert_eq!(result, PipelineResult::Completed);
  assert_eq!(*log.lock(), vec!["work"]);
}

#[tokio::test]
#[serial]
async fn test_missing_handler_for_required_step_is_an_error() {
  setup_tracing();
  let p = Pipeline::<TestCtx>::new(&[("unwired", false)]);

  let err = p.run(ContextData::new(TestCtx::default())).await.unwrap_err();

  match err {
    AppError::Workflow {
      source: WorkflowError::HandlerMissing { step_name },
    } => assert_eq!(step_name, "unwired"),
    other => panic!("expected HandlerMissing, got {:?}", other),
  }
}

#[test]
#[should_panic(expected = "step 'ghost' not found")]
fn test_attaching_to_unknown_step_panics() {
  let log = new_log();
  let mut p = Pipeline::<TestCtx>::new(&[("real", false)]);
  p.on_root("ghost", create_simple_handler(log, "ghost", PipelineControl::Continue));
}

#[tokio::test]
#[serial]
async fn test_registry_dispatches_by_context_type() {
  setup_tracing();
  let workflows = Workflows::new();
  let mut p = Pipeline::<TestCtx>::new(&[("bump", false)]);
  p.on_root("bump", |ctx: ContextData<TestCtx>| async move {
    ctx.write().counter += 1;
    Ok::<_, AppError>(PipelineControl::Continue)
  });
  workflows.register_pipeline(p);

  assert!(workflows.is_registered::<TestCtx>());
  assert!(!workflows.is_registered::<UnregisteredCtx>());

  let ctx = ContextData::new(TestCtx::default());
  let result = workflows.run(ctx.clone()).await.unwrap();
  assert_eq!(result, PipelineResult::Completed);
  assert_eq!(ctx.read().counter, 1);
}

#[tokio::test]
#[serial]
async fn test_registry_rejects_unknown_context_type() {
  setup_tracing();
  let workflows = Workflows::new();

  let err = workflows.run(ContextData::new(UnregisteredCtx)).await.unwrap_err();

  assert!(matches!(
    err,
    AppError::Workflow {
      source: WorkflowError::NotRegistered { .. }
    }
  ));
}
