// storefront/src/pipelines/signup_pipeline.rs

use crate::errors::AppError;
use crate::models::NewUser;
use crate::pipelines::common_steps;
use crate::pipelines::contexts::SignupCtxData;
use crate::services::auth_service;
use crate::workflow::{ContextData, Pipeline, PipelineControl, Workflows};
use tracing::{event, info, warn, Level};

/// Registers the account registration pipeline.
pub fn register_signup_pipeline(workflows: &Workflows) {
  let mut signup_p = Pipeline::<SignupCtxData>::new(&[
    ("validate_signup_input", false),
    ("create_user", false),
    ("issue_session", false),
  ]);

  signup_p.on_root("validate_signup_input", |ctx_data: ContextData<SignupCtxData>| async move {
    let mut guard = ctx_data.write();
    guard.email = auth_service::normalize_email(&guard.email);
    guard.full_name = guard.full_name.trim().to_string();
    guard.phone = guard.phone.trim().to_string();

    event!(Level::DEBUG, email = %guard.email, "Validating signup input.");
    if !auth_service::looks_like_email(&guard.email) {
      warn!("Invalid email format provided for signup.");
      return Err(AppError::Validation("Valid email is required.".to_string()));
    }
    if guard.password.is_empty() {
      return Err(AppError::Validation("Password is required.".to_string()));
    }
    if guard.full_name.is_empty() {
      return Err(AppError::Validation("Full name is required.".to_string()));
    }
    Ok(PipelineControl::Continue)
  });

  // Duplicate emails surface here as `Conflict` from the store.
  signup_p.on_root("create_user", |ctx_data: ContextData<SignupCtxData>| async move {
    let (store, new_user) = {
      let guard = ctx_data.read();
      let password_hash = auth_service::hash_password(&guard.password)?;
      let new_user = NewUser {
        email: guard.email.clone(),
        full_name: guard.full_name.clone(),
        phone: guard.phone.clone(),
        password_hash,
      };
      (guard.app_state.store.clone(), new_user)
    };

    let user = store.create_user(new_user).await?;
    info!(user_id = user.id, "User registered.");
    ctx_data.write().created_user = Some(user);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  signup_p.on_root("issue_session", |ctx_data: ContextData<SignupCtxData>| async move {
    let (app_state, user_id) = {
      let guard = ctx_data.read();
      (guard.app_state.clone(), guard.created_user.as_ref().map(|u| u.id))
    };
    let user_id = user_id.ok_or_else(|| AppError::Internal("User missing after creation".to_string()))?;

    let session = common_steps::open_session(&app_state, user_id).await?;
    let mut guard = ctx_data.write();
    guard.session_token = Some(session.token);
    guard.expires_at = Some(session.expires_at);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  workflows.register_pipeline(signup_p);
}
