// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Upper bound for `SESSION_TTL_HOURS`: one hundred years.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 100;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// When absent the server runs on the in-process memory store.
  pub database_url: Option<String>,
  pub apply_schema: bool,

  /// Fallback admin password used while the settings table has none.
  pub admin_password: String,
  /// Share of an authenticated buyer's order total credited back as cashback.
  pub cashback_percent: u8,
  pub session_ttl_hours: i64,

  /// Seed the demo catalog and default contact settings into an empty store.
  pub seed_db: bool,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      database_url: None,
      apply_schema: true,
      admin_password: "admin123".to_string(),
      cashback_percent: 5,
      session_ttl_hours: 24 * 30,
      seed_db: true,
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let defaults = Self::default();

    let server_host = env::var("SERVER_HOST").unwrap_or(defaults.server_host);
    let server_port = parse_var("SERVER_PORT", defaults.server_port)?;
    let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());
    let apply_schema = parse_var("APPLY_SCHEMA", defaults.apply_schema)?;
    let admin_password = env::var("ADMIN_PASSWORD").unwrap_or(defaults.admin_password);
    if admin_password.is_empty() {
      return Err(AppError::Config("ADMIN_PASSWORD must not be empty".to_string()));
    }

    let cashback_percent = parse_var("CASHBACK_PERCENT", defaults.cashback_percent)?;
    if cashback_percent > 100 {
      return Err(AppError::Config(format!(
        "CASHBACK_PERCENT must be within 0..=100, got {}",
        cashback_percent
      )));
    }

    let session_ttl_hours = parse_var("SESSION_TTL_HOURS", defaults.session_ttl_hours)?;
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&session_ttl_hours) {
      return Err(AppError::Config(format!(
        "SESSION_TTL_HOURS must be within 1..={}, got {}",
        MAX_SESSION_TTL_HOURS, session_ttl_hours
      )));
    }

    let seed_db = parse_var("SEED_DB", defaults.seed_db)?;

    tracing::info!(
      host = %server_host,
      port = server_port,
      database = database_url.is_some(),
      cashback_percent,
      "Application configuration loaded successfully."
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      apply_schema,
      admin_password,
      cashback_percent,
      session_ttl_hours,
      seed_db,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_var<T>(var_name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match env::var(var_name) {
    Ok(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, raw, e))),
    Err(_) => Ok(default),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  const VARS: &[&str] = &[
    "SERVER_HOST",
    "SERVER_PORT",
    "DATABASE_URL",
    "APPLY_SCHEMA",
    "ADMIN_PASSWORD",
    "CASHBACK_PERCENT",
    "SESSION_TTL_HOURS",
    "SEED_DB",
  ];

  fn clear_env() {
    for var in VARS {
      env::remove_var(var);
    }
  }

  #[test]
  #[serial]
  fn defaults_apply_when_nothing_is_set() {
    clear_env();
    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg.server_port, 8080);
    assert_eq!(cfg.admin_password, "admin123");
    assert_eq!(cfg.cashback_percent, 5);
    assert!(cfg.database_url.is_none());
    assert_eq!(cfg.bind_address(), "127.0.0.1:8080");
  }

  #[test]
  #[serial]
  fn overrides_are_parsed() {
    clear_env();
    env::set_var("SERVER_PORT", "9090");
    env::set_var("CASHBACK_PERCENT", "10");
    env::set_var("DATABASE_URL", "postgres://shop@localhost/shop");
    env::set_var("SEED_DB", "false");
    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg.server_port, 9090);
    assert_eq!(cfg.cashback_percent, 10);
    assert_eq!(cfg.database_url.as_deref(), Some("postgres://shop@localhost/shop"));
    assert!(!cfg.seed_db);
    clear_env();
  }

  #[test]
  #[serial]
  fn out_of_range_cashback_is_rejected() {
    clear_env();
    env::set_var("CASHBACK_PERCENT", "150");
    assert!(matches!(AppConfig::from_env(), Err(AppError::Config(_))));
    clear_env();
  }

  #[test]
  #[serial]
  fn session_ttl_must_be_bounded() {
    clear_env();
    env::set_var("SESSION_TTL_HOURS", "10000000000");
    assert!(matches!(AppConfig::from_env(), Err(AppError::Config(_))));
    env::set_var("SESSION_TTL_HOURS", "0");
    assert!(matches!(AppConfig::from_env(), Err(AppError::Config(_))));
    env::set_var("SESSION_TTL_HOURS", MAX_SESSION_TTL_HOURS.to_string());
    assert_eq!(AppConfig::from_env().unwrap().session_ttl_hours, MAX_SESSION_TTL_HOURS);
    clear_env();
  }

  #[test]
  #[serial]
  fn garbage_port_is_rejected() {
    clear_env();
    env::set_var("SERVER_PORT", "eighty");
    assert!(matches!(AppConfig::from_env(), Err(AppError::Config(_))));
    clear_env();
  }
}
