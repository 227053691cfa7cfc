// storefront/src/workflow/mod.rs

//! Multi-step request workflows (checkout, sign-up, sign-in, add-to-cart).
//!
//!  1. Define a context struct for the process.
//!  2. Build a `Pipeline<Ctx>` from named steps and attach async handlers
//!     with `.on_root()`, `.before_root()` or `.after_root()`.
//!  3. Register it on `Workflows`; run it with `workflows.run(ContextData::new(ctx))`.

pub mod context_data;
pub mod control;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use error::WorkflowError;
pub use pipeline::{Handler, Pipeline, StepDef};
pub use registry::Workflows;
