// storefront/src/web/handlers/settings_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::SettingsPatch;
use crate::state::AppState;
use crate::web::extractors::AdminAccess;

#[derive(Deserialize)]
pub struct AdminLoginPayload {
  #[serde(default)]
  pub password: String,
}

#[instrument(name = "handler::get_settings", skip(app_state))]
pub async fn get_settings_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let settings = app_state.store.settings().await?;
  Ok(HttpResponse::Ok().json(settings))
}

/// Admin panel sign-in. Answers `{authenticated}` either way; a wrong password is a 401.
#[instrument(name = "handler::admin_login", skip(app_state, body))]
pub async fn admin_login_handler(
  app_state: web::Data<AppState>,
  body: web::Json<AdminLoginPayload>,
) -> Result<HttpResponse, AppError> {
  if app_state.is_admin_password(&body.password).await? {
    info!("Admin panel unlocked.");
    Ok(HttpResponse::Ok().json(json!({ "authenticated": true })))
  } else {
    warn!("Admin panel login with wrong password.");
    Ok(HttpResponse::Unauthorized().json(json!({ "authenticated": false })))
  }
}

/// Upserts every supplied key. `admin_password` in the body is ignored.
#[instrument(name = "handler::update_settings", skip(app_state, _admin, body))]
pub async fn update_settings_handler(
  app_state: web::Data<AppState>,
  _admin: AdminAccess,
  body: web::Json<SettingsPatch>,
) -> Result<HttpResponse, AppError> {
  let pairs = body.into_inner().into_pairs();
  info!(keys = pairs.len(), "Updating settings.");
  app_state.store.upsert_settings(pairs).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
