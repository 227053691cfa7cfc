// storefront/src/web/handlers/favorite_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::list_favorites", skip(app_state, auth_user), fields(user_id = auth_user.id()))]
pub async fn list_favorites_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let plants = app_state.store.favorite_plants(auth_user.id()).await?;
  Ok(HttpResponse::Ok().json(plants))
}

#[instrument(name = "handler::toggle_favorite", skip(app_state, auth_user), fields(user_id = auth_user.id()))]
pub async fn toggle_favorite_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let plant_id = path.into_inner();
  if app_state.store.get_plant(plant_id).await?.is_none() {
    return Err(AppError::NotFound("Plant not found".to_string()));
  }
  let favorite = app_state.store.toggle_favorite(auth_user.id(), plant_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "plant_id": plant_id, "favorite": favorite })))
}
