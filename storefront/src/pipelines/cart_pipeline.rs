// storefront/src/pipelines/cart_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::AddToCartCtxData;
use crate::workflow::{ContextData, Pipeline, PipelineControl, Workflows};
use tracing::{info, warn};

pub fn register_add_to_cart_pipeline(workflows: &Workflows) {
  let mut p = Pipeline::<AddToCartCtxData>::new(&[
    ("validate_cart_input", false),
    ("ensure_plant_exists", false),
    ("merge_into_cart", false),
  ]);

  p.on_root("validate_cart_input", |ctx_data: ContextData<AddToCartCtxData>| async move {
    let quantity = ctx_data.read().quantity;
    if quantity < 1 {
      warn!(quantity, "Add to cart rejected: quantity must be positive.");
      return Err(AppError::Validation("Quantity must be at least 1.".to_string()));
    }
    Ok(PipelineControl::Continue)
  });

  p.on_root("ensure_plant_exists", |ctx_data: ContextData<AddToCartCtxData>| async move {
    let (store, plant_id) = {
      let guard = ctx_data.read();
      (guard.app_state.store.clone(), guard.plant_id)
    };
    if store.get_plant(plant_id).await?.is_none() {
      return Err(AppError::NotFound("Plant not found".to_string()));
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  // Re-adding a plant already in the cart adds to its quantity.
  p.on_root("merge_into_cart", |ctx_data: ContextData<AddToCartCtxData>| async move {
    let (store, user_id, plant_id, quantity) = {
      let guard = ctx_data.read();
      (guard.app_state.store.clone(), guard.user_id, guard.plant_id, guard.quantity)
    };
    let entry = store.add_to_cart(user_id, plant_id, quantity).await?;
    info!(user_id, plant_id, quantity = entry.quantity, "Cart line updated.");
    ctx_data.write().updated_entry = Some(entry);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  workflows.register_pipeline(p);
}
