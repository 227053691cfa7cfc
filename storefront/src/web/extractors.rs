// storefront/src/web/extractors.rs

//! Request extractors for the two kinds of caller identity: a buyer session
//! (`X-Auth-Token`) and the admin password (`X-Admin-Password`).

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::Utc;
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::User;
use crate::state::AppState;

pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
pub const ADMIN_PASSWORD_HEADER: &str = "X-Admin-Password";

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
  req
    .headers()
    .get(name)
    .and_then(|v| v.to_str().ok())
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
}

fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, AppError> {
  req
    .app_data::<web::Data<AppState>>()
    .cloned()
    .ok_or_else(|| AppError::Internal("Application state is not configured".to_string()))
}

/// The signed-in buyer behind a valid, unexpired session token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub user: User,
  pub token: String,
}

impl AuthenticatedUser {
  pub fn id(&self) -> i64 {
    self.user.id
  }

  async fn resolve(state: web::Data<AppState>, token: String) -> Result<Self, AppError> {
    let session = state
      .store
      .find_session(&token)
      .await?
      .ok_or_else(|| AppError::Auth("Invalid session".to_string()))?;

    if session.is_expired(Utc::now()) {
      debug!(user_id = session.user_id, "Dropping expired session.");
      state.store.delete_session(&token).await?;
      return Err(AppError::Auth("Session expired".to_string()));
    }

    let user = state
      .store
      .get_user(session.user_id)
      .await?
      .ok_or_else(|| AppError::Auth("Invalid session".to_string()))?;
    Ok(AuthenticatedUser { user, token })
  }
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = app_state(req);
    let token = header_value(req, AUTH_TOKEN_HEADER);
    Box::pin(async move {
      let state = state?;
      let token = token.ok_or_else(|| {
        warn!("Request without session token.");
        AppError::Auth("Authentication required".to_string())
      })?;
      AuthenticatedUser::resolve(state, token).await
    })
  }
}

/// A session if one is presented and still valid; otherwise the caller is a guest.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<AuthenticatedUser>);

impl FromRequest for OptionalUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = app_state(req);
    let token = header_value(req, AUTH_TOKEN_HEADER);
    Box::pin(async move {
      let state = state?;
      let token = match token {
        Some(token) => token,
        None => return Ok(OptionalUser(None)),
      };
      match AuthenticatedUser::resolve(state, token).await {
        Ok(user) => Ok(OptionalUser(Some(user))),
        Err(AppError::Auth(reason)) => {
          debug!(%reason, "Ignoring unusable session token; continuing as guest.");
          Ok(OptionalUser(None))
        }
        Err(other) => Err(other),
      }
    })
  }
}

/// Proof that the request carried the current admin password.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

impl FromRequest for AdminAccess {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = app_state(req);
    let candidate = header_value(req, ADMIN_PASSWORD_HEADER);
    Box::pin(async move {
      let state = state?;
      let allowed = match candidate {
        Some(candidate) => state.is_admin_password(&candidate).await?,
        None => false,
      };
      if !allowed {
        warn!("Admin request rejected.");
        return Err(AppError::Auth("Unauthorized".to_string()));
      }
      Ok(AdminAccess)
    })
  }
}
