// storefront/src/state.rs

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::ADMIN_PASSWORD_KEY;
use crate::pipelines;
use crate::store::Store;
use crate::workflow::Workflows;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub workflows: Arc<Workflows>,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  /// Builds the shared state and registers every pipeline.
  pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
    let state = AppState {
      store,
      workflows: Arc::new(Workflows::new()),
      config: Arc::new(config),
    };
    pipelines::register_all_pipelines(&state.workflows);
    state
  }

  /// The admin password in force: the stored `admin_password` setting, or the
  /// configured fallback while none is stored.
  pub async fn admin_password(&self) -> Result<String> {
    let stored = self.store.admin_password().await?;
    Ok(stored.unwrap_or_else(|| self.config.admin_password.clone()))
  }

  pub async fn is_admin_password(&self, candidate: &str) -> Result<bool> {
    Ok(!candidate.is_empty() && self.admin_password().await? == candidate)
  }
}
