// storefront/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::pipelines::contexts::{SigninCtxData, SignupCtxData};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::workflow::{ContextData, PipelineResult};

#[derive(Deserialize)]
pub struct RegisterPayload {
  pub email: String,
  pub password: String,
  pub full_name: String,
  #[serde(default)]
  pub phone: String,
}

#[derive(Deserialize)]
pub struct LoginPayload {
  pub email: String,
  pub password: String,
}

#[instrument(name = "handler::register", skip(app_state, body), fields(email = %body.email))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  body: web::Json<RegisterPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = body.into_inner();
  let ctx_data = ContextData::new(SignupCtxData {
    app_state: app_state.get_ref().clone(),
    email: payload.email,
    password: payload.password,
    full_name: payload.full_name,
    phone: payload.phone,
    created_user: None,
    session_token: None,
    expires_at: None,
  });

  match app_state.workflows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let guard = ctx_data.read();
      match (&guard.created_user, &guard.session_token, &guard.expires_at) {
        (Some(user), Some(token), Some(expires_at)) => {
          info!(user_id = user.id, "Registration completed.");
          Ok(HttpResponse::Created().json(json!({ "user": user, "token": token, "expires_at": expires_at })))
        }
        _ => Err(AppError::Internal("Registration finished without a session".to_string())),
      }
    }
    PipelineResult::Stopped => {
      warn!("Signup pipeline stopped unexpectedly.");
      Err(AppError::Internal("Registration was halted".to_string()))
    }
  }
}

#[instrument(name = "handler::login", skip(app_state, body), fields(email = %body.email))]
pub async fn login_handler(app_state: web::Data<AppState>, body: web::Json<LoginPayload>) -> Result<HttpResponse, AppError> {
  let payload = body.into_inner();
  let ctx_data = ContextData::new(SigninCtxData {
    app_state: app_state.get_ref().clone(),
    email: payload.email,
    password: payload.password,
    user: None,
    session_token: None,
    expires_at: None,
  });

  match app_state.workflows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let guard = ctx_data.read();
      match (&guard.user, &guard.session_token, &guard.expires_at) {
        (Some(user), Some(token), Some(expires_at)) => {
          Ok(HttpResponse::Ok().json(json!({ "user": user, "token": token, "expires_at": expires_at })))
        }
        _ => Err(AppError::Internal("Sign-in finished without a session".to_string())),
      }
    }
    PipelineResult::Stopped => Err(AppError::Internal("Sign-in was halted".to_string())),
  }
}

#[instrument(name = "handler::me", skip(auth_user), fields(user_id = auth_user.id()))]
pub async fn me_handler(auth_user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(auth_user.user))
}

#[instrument(name = "handler::logout", skip(app_state, auth_user), fields(user_id = auth_user.id()))]
pub async fn logout_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  app_state.store.delete_session(&auth_user.token).await?;
  info!("Session closed.");
  Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
