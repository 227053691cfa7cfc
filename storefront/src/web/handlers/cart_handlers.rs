// storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::pipelines::contexts::{default_quantity, AddToCartCtxData};
use crate::services::pricing;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::workflow::{ContextData, PipelineResult};

#[derive(Deserialize, Debug)]
pub struct AddToCartPayload {
  pub plant_id: i64,
  #[serde(default = "default_quantity")]
  pub quantity: i32,
}

#[derive(Deserialize, Debug)]
pub struct UpdateQuantityPayload {
  pub quantity: i32,
}

#[instrument(name = "handler::get_cart", skip(app_state, auth_user), fields(user_id = auth_user.id()))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let items = app_state.store.cart_lines(auth_user.id()).await?;
  let total = pricing::cart_total(items.iter().map(|line| (line.price, line.quantity)))?;
  Ok(HttpResponse::Ok().json(json!({ "items": items, "total": total })))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, body, auth_user),
  fields(user_id = auth_user.id(), plant_id = body.plant_id, quantity = body.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  body: web::Json<AddToCartPayload>,
) -> Result<HttpResponse, AppError> {
  let ctx_data = ContextData::new(AddToCartCtxData {
    app_state: app_state.get_ref().clone(),
    user_id: auth_user.id(),
    plant_id: body.plant_id,
    quantity: body.quantity,
    updated_entry: None,
  });

  match app_state.workflows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let entry = ctx_data.read().updated_entry.clone();
      let entry = entry.ok_or_else(|| AppError::Internal("Cart update produced no entry".to_string()))?;
      Ok(HttpResponse::Created().json(entry))
    }
    PipelineResult::Stopped => {
      warn!("Add-to-cart pipeline stopped unexpectedly.");
      Err(AppError::Internal("Add to cart was halted".to_string()))
    }
  }
}

#[instrument(name = "handler::update_cart_item", skip(app_state, auth_user, body), fields(user_id = auth_user.id()))]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<i64>,
  body: web::Json<UpdateQuantityPayload>,
) -> Result<HttpResponse, AppError> {
  if body.quantity < 1 {
    return Err(AppError::Validation("Quantity must be at least 1.".to_string()));
  }
  let item_id = path.into_inner();
  let entry = app_state
    .store
    .set_cart_quantity(auth_user.id(), item_id, body.quantity)
    .await?
    .ok_or_else(|| AppError::NotFound("Cart item not found".to_string()))?;
  Ok(HttpResponse::Ok().json(entry))
}

#[instrument(name = "handler::remove_cart_item", skip(app_state, auth_user), fields(user_id = auth_user.id()))]
pub async fn remove_cart_item_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let item_id = path.into_inner();
  if !app_state.store.remove_cart_item(auth_user.id(), item_id).await? {
    return Err(AppError::NotFound("Cart item not found".to_string()));
  }
  Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[instrument(name = "handler::clear_cart", skip(app_state, auth_user), fields(user_id = auth_user.id()))]
pub async fn clear_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  app_state.store.clear_cart(auth_user.id()).await?;
  info!("Cart cleared.");
  Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
