// storefront/src/workflow/registry.rs

//! `Workflows`: a registry of pipelines keyed by their context data type.
//! Handlers only need the context value to run the right pipeline.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{event, Level};

use super::context_data::ContextData;
use super::control::PipelineResult;
use super::error::WorkflowError;
use super::pipeline::Pipeline;
use crate::errors::AppError;

#[async_trait]
trait AnyPipelineRunner: Send + Sync {
  /// `ctx_obj` is expected to hold a `ContextData<TData>` for the wrapped pipeline.
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, AppError>;
}

struct PipelineWrapper<TData: 'static + Send + Sync> {
  pipeline: Pipeline<TData>,
}

#[async_trait]
impl<TData: 'static + Send + Sync> AnyPipelineRunner for PipelineWrapper<TData> {
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, AppError> {
    let typed_ctx_data = match ctx_obj.downcast::<ContextData<TData>>() {
      Ok(boxed) => *boxed,
      Err(_) => {
        let expected_type = std::any::type_name::<ContextData<TData>>().to_string();
        event!(Level::ERROR, %expected_type, "Context object type mismatch.");
        return Err(WorkflowError::TypeMismatch { expected_type }.into());
      }
    };
    self.pipeline.run(typed_ctx_data).await
  }
}

#[derive(Default)]
pub struct Workflows {
  registry: RwLock<HashMap<TypeId, Arc<dyn AnyPipelineRunner>>>,
}

impl Workflows {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers `pipeline` as the one to run for `ContextData<TData>`.
  /// A later registration for the same type replaces the earlier one.
  pub fn register_pipeline<TData: 'static + Send + Sync>(&self, pipeline: Pipeline<TData>) {
    event!(Level::DEBUG, context_type = %std::any::type_name::<TData>(), steps = ?pipeline.step_names(), "Registering pipeline.");
    self
      .registry
      .write()
      .insert(TypeId::of::<TData>(), Arc::new(PipelineWrapper { pipeline }));
  }

  pub fn is_registered<TData: 'static + Send + Sync>(&self) -> bool {
    self.registry.read().contains_key(&TypeId::of::<TData>())
  }

  pub async fn run<TData: 'static + Send + Sync>(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, AppError> {
    let runner = self.registry.read().get(&TypeId::of::<TData>()).cloned();
    let runner = runner.ok_or_else(|| {
      let type_name = std::any::type_name::<TData>().to_string();
      event!(Level::ERROR, %type_name, "No pipeline registered.");
      AppError::from(WorkflowError::NotRegistered { type_name })
    })?;

    runner.run_erased(Box::new(ctx_data)).await
  }
}
