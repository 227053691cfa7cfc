// storefront/src/web/handlers/plant_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::{Category, PlantDraft};
use crate::state::AppState;
use crate::web::extractors::AdminAccess;

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
  pub category: Option<Category>,
}

#[instrument(name = "handler::list_plants", skip(app_state))]
pub async fn list_plants_handler(
  app_state: web::Data<AppState>,
  query: web::Query<CatalogQuery>,
) -> Result<HttpResponse, AppError> {
  let plants = app_state.store.list_plants(query.category).await?;
  Ok(HttpResponse::Ok().json(plants))
}

#[instrument(name = "handler::get_plant", skip(app_state))]
pub async fn get_plant_handler(app_state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
  let plant_id = path.into_inner();
  let plant = app_state
    .store
    .get_plant(plant_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Plant not found".to_string()))?;
  Ok(HttpResponse::Ok().json(plant))
}

#[instrument(name = "handler::create_plant", skip(app_state, _admin, body))]
pub async fn create_plant_handler(
  app_state: web::Data<AppState>,
  _admin: AdminAccess,
  body: web::Json<PlantDraft>,
) -> Result<HttpResponse, AppError> {
  let draft = body.into_inner();
  draft.validate()?;
  let plant = app_state.store.create_plant(draft).await?;
  info!(plant_id = plant.id, "Plant created.");
  Ok(HttpResponse::Created().json(plant))
}

#[instrument(name = "handler::update_plant", skip(app_state, _admin, body))]
pub async fn update_plant_handler(
  app_state: web::Data<AppState>,
  _admin: AdminAccess,
  path: web::Path<i64>,
  body: web::Json<PlantDraft>,
) -> Result<HttpResponse, AppError> {
  let plant_id = path.into_inner();
  let draft = body.into_inner();
  draft.validate()?;
  let plant = app_state
    .store
    .update_plant(plant_id, draft)
    .await?
    .ok_or_else(|| AppError::NotFound("Plant not found".to_string()))?;
  Ok(HttpResponse::Ok().json(plant))
}

#[instrument(name = "handler::delete_plant", skip(app_state, _admin))]
pub async fn delete_plant_handler(
  app_state: web::Data<AppState>,
  _admin: AdminAccess,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let plant_id = path.into_inner();
  if !app_state.store.delete_plant(plant_id).await? {
    return Err(AppError::NotFound("Plant not found".to_string()));
  }
  info!(plant_id, "Plant deleted.");
  Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
