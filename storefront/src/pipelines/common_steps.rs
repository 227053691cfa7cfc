// storefront/src/pipelines/common_steps.rs

//! Pieces shared by more than one pipeline.

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::errors::{AppError, Result as AppResult};
use crate::models::Session;
use crate::services::auth_service;
use crate::state::AppState;

/// `now + ttl_hours`, or a config error when that is not a representable time.
pub fn session_expiry(now: DateTime<Utc>, ttl_hours: i64) -> AppResult<DateTime<Utc>> {
  Duration::try_hours(ttl_hours)
    .and_then(|ttl| now.checked_add_signed(ttl))
    .ok_or_else(|| AppError::Config(format!("Session TTL of {} hours is out of range", ttl_hours)))
}

/// Creates and stores a session for `user_id` that expires after the
/// configured TTL.
pub async fn open_session(app_state: &AppState, user_id: i64) -> AppResult<Session> {
  let session = Session {
    token: auth_service::generate_session_token(),
    user_id,
    expires_at: session_expiry(Utc::now(), app_state.config.session_ttl_hours)?,
  };
  app_state.store.create_session(session.clone()).await?;
  info!(user_id, expires_at = %session.expires_at, "Session opened.");
  Ok(session)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn expiry_is_now_plus_ttl() {
    let now = Utc::now();
    assert_eq!(session_expiry(now, 24).unwrap(), now + Duration::hours(24));
  }

  #[test]
  fn unrepresentable_expiry_is_an_error_not_a_panic() {
    let now = Utc::now();
    assert!(matches!(session_expiry(now, 10_000_000_000), Err(AppError::Config(_))));
    assert!(matches!(session_expiry(now, i64::MAX), Err(AppError::Config(_))));
  }
}
