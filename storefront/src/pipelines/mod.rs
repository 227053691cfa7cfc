// storefront/src/pipelines/mod.rs

//! Defines and registers the multi-step workflows: sign-up, sign-in,
//! add-to-cart and checkout.

use crate::workflow::Workflows;

pub mod common_steps;
pub mod contexts;

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod signin_pipeline;
pub mod signup_pipeline;

/// Registers every pipeline. Called once when the application state is built.
pub fn register_all_pipelines(workflows: &Workflows) {
  tracing::info!("Registering pipelines...");

  signup_pipeline::register_signup_pipeline(workflows);
  signin_pipeline::register_signin_pipeline(workflows);
  cart_pipeline::register_add_to_cart_pipeline(workflows);
  checkout_pipeline::register_checkout_pipeline(workflows);

  tracing::info!("All application pipelines registered.");
}
