// storefront/src/workflow/pipeline.rs

//! Named-step pipelines. Each step may carry `before`, `on` and `after`
//! handlers; steps can be optional or skipped by a predicate over the context.

use futures_util::future::BoxFuture;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{event, instrument, span, Instrument, Level};

use super::context_data::ContextData;
use super::control::{PipelineControl, PipelineResult};
use super::error::WorkflowError;
use crate::errors::AppError;

pub type Handler<TData> =
  Box<dyn Fn(ContextData<TData>) -> BoxFuture<'static, Result<PipelineControl, AppError>> + Send + Sync>;

pub type SkipCondition<TData> = Arc<dyn Fn(&TData) -> bool + Send + Sync + 'static>;

pub struct StepDef<TData: 'static + Send + Sync> {
  pub name: String,
  pub optional: bool,
  pub skip_if: Option<SkipCondition<TData>>,
}

impl<TData: 'static + Send + Sync> std::fmt::Debug for StepDef<TData> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("optional", &self.optional)
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}

#[derive(Clone, Copy)]
enum Phase {
  Before,
  On,
  After,
}

impl Phase {
  fn as_str(self) -> &'static str {
    match self {
      Phase::Before => "before",
      Phase::On => "on",
      Phase::After => "after",
    }
  }
}

pub struct Pipeline<TData: 'static + Send + Sync> {
  steps: Vec<StepDef<TData>>,
  before: HashMap<String, Vec<Handler<TData>>>,
  on: HashMap<String, Vec<Handler<TData>>>,
  after: HashMap<String, Vec<Handler<TData>>>,
}

impl<TData: 'static + Send + Sync> Pipeline<TData> {
  /// Creates a pipeline from `(step_name, optional)` pairs, run in order.
  pub fn new(step_defs: &[(&str, bool)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional)| StepDef {
        name: (*name).to_string(),
        optional: *optional,
        skip_if: None,
      })
      .collect();

    Self {
      steps,
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
    }
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  /// Panics on an unknown step: that is a wiring mistake, caught at registration.
  fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!("Pipeline setup error: step '{}' not found in pipeline definition.", step_name);
    }
  }

  pub fn skip_if(&mut self, step_name: &str, condition: impl Fn(&TData) -> bool + Send + Sync + 'static) {
    self.ensure_step_exists(step_name);
    if let Some(step) = self.steps.iter_mut().find(|s| s.name == step_name) {
      step.skip_if = Some(Arc::new(condition));
    }
  }

  pub fn before_root<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, E>> + Send + 'static,
    E: Into<AppError> + Send + 'static,
  {
    self.add_handler(Phase::Before, step_name, handler_fn);
  }

  pub fn on_root<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, E>> + Send + 'static,
    E: Into<AppError> + Send + 'static,
  {
    self.add_handler(Phase::On, step_name, handler_fn);
  }

  pub fn after_root<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, E>> + Send + 'static,
    E: Into<AppError> + Send + 'static,
  {
    self.add_handler(Phase::After, step_name, handler_fn);
  }

  fn add_handler<F, E>(
    &mut self,
    phase: Phase,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, E>> + Send + 'static,
    E: Into<AppError> + Send + 'static,
  {
    self.ensure_step_exists(step_name);
    let handler: Handler<TData> = Box::new(move |ctx_data| {
      let fut = handler_fn(ctx_data);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });
    let table = match phase {
      Phase::Before => &mut self.before,
      Phase::On => &mut self.on,
      Phase::After => &mut self.after,
    };
    table.entry(step_name.to_string()).or_default().push(handler);
  }

  fn handlers(&self, phase: Phase, step_name: &str) -> &[Handler<TData>] {
    let table = match phase {
      Phase::Before => &self.before,
      Phase::On => &self.on,
      Phase::After => &self.after,
    };
    table.get(step_name).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Runs every step in order against `ctx_data`.
  ///
  /// A handler returning `Stop` ends the run with `PipelineResult::Stopped`;
  /// a handler error ends it with that error.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(context_type = %std::any::type_name::<TData>(), num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, AppError> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(Level::INFO, "pipeline_step", step_name, step_index = step_idx);

      if let Some(skip_cond) = &step_def.skip_if {
        let skip = skip_cond(&*ctx_data.read());
        if skip {
          event!(Level::DEBUG, step_name, "Step skipped due to 'skip_if' condition.");
          continue;
        }
      }

      let phases = [Phase::Before, Phase::On, Phase::After];
      if phases.iter().all(|phase| self.handlers(*phase, step_name).is_empty()) {
        if step_def.optional {
          event!(Level::DEBUG, step_name, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(Level::ERROR, step_name, "Non-optional step has no handlers.");
        return Err(
          WorkflowError::HandlerMissing {
            step_name: step_def.name.clone(),
          }
          .into(),
        );
      }

      'phases: for phase in phases {
        for handler_fn in self.handlers(phase, step_name) {
          match handler_fn(ctx_data.clone()).instrument(step_span.clone()).await {
            Ok(PipelineControl::Continue) => {}
            Ok(PipelineControl::Stop) => {
              event!(Level::INFO, step_name, phase = phase.as_str(), "Pipeline stopped by a handler.");
              return Ok(PipelineResult::Stopped);
            }
            Err(e) if step_def.optional => {
              event!(Level::WARN, step_name, phase = phase.as_str(), error = %e, "Optional step failed, continuing.");
              break 'phases;
            }
            Err(e) => {
              event!(Level::ERROR, step_name, phase = phase.as_str(), error = %e, "Handler failed.");
              return Err(e);
            }
          }
        }
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed successfully.");
    Ok(PipelineResult::Completed)
  }
}
