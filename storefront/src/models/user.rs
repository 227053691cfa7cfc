// storefront/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct User {
  pub id: i64,
  pub email: String,
  pub full_name: String,
  pub phone: String,
  pub balance: i64,
  pub cashback: i64,
  pub created_at: DateTime<Utc>,
}

/// Sign-in lookup row; never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
  pub id: i64,
  pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
  pub email: String,
  pub full_name: String,
  pub phone: String,
  pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Session {
  pub token: String,
  pub user_id: i64,
  pub expires_at: DateTime<Utc>,
}

impl Session {
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
    self.expires_at <= now
  }
}
