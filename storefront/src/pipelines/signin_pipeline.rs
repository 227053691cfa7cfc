// storefront/src/pipelines/signin_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::common_steps;
use crate::pipelines::contexts::SigninCtxData;
use crate::services::auth_service;
use crate::workflow::{ContextData, Pipeline, PipelineControl, Workflows};
use tracing::{event, warn, Level};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Registers the sign-in pipeline.
pub fn register_signin_pipeline(workflows: &Workflows) {
  let mut signin_p = Pipeline::<SigninCtxData>::new(&[
    ("validate_signin_input", false),
    ("verify_credentials", false),
    ("issue_session", false),
  ]);

  signin_p.on_root("validate_signin_input", |ctx_data: ContextData<SigninCtxData>| async move {
    let mut guard = ctx_data.write();
    guard.email = auth_service::normalize_email(&guard.email);
    if guard.email.is_empty() || guard.password.is_empty() {
      warn!("Sign-in attempted without email or password.");
      return Err(AppError::Validation("Email and password are required.".to_string()));
    }
    Ok(PipelineControl::Continue)
  });

  // Unknown email and wrong password are indistinguishable to the caller.
  signin_p.on_root("verify_credentials", |ctx_data: ContextData<SigninCtxData>| async move {
    let (store, email, password) = {
      let guard = ctx_data.read();
      (guard.app_state.store.clone(), guard.email.clone(), guard.password.clone())
    };

    let creds = match store.find_credentials(&email).await? {
      Some(creds) => creds,
      None => {
        event!(Level::INFO, email = %email, "Sign-in for unknown email.");
        return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
      }
    };
    if !auth_service::verify_password(&creds.password_hash, &password)? {
      event!(Level::INFO, user_id = creds.id, "Password mismatch on sign-in.");
      return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
    }

    let user = store
      .get_user(creds.id)
      .await?
      .ok_or_else(|| AppError::Auth(INVALID_CREDENTIALS.to_string()))?;
    ctx_data.write().user = Some(user);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  signin_p.on_root("issue_session", |ctx_data: ContextData<SigninCtxData>| async move {
    let (app_state, user_id) = {
      let guard = ctx_data.read();
      (guard.app_state.clone(), guard.user.as_ref().map(|u| u.id))
    };
    let user_id = user_id.ok_or_else(|| AppError::Internal("User missing after verification".to_string()))?;

    let session = common_steps::open_session(&app_state, user_id).await?;
    let mut guard = ctx_data.write();
    guard.session_token = Some(session.token);
    guard.expires_at = Some(session.expires_at);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  workflows.register_pipeline(signin_p);
}
