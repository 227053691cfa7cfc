// storefront/tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::Level;

use plant_storefront::config::AppConfig;
use plant_storefront::models::{NewUser, User};
use plant_storefront::pipelines::common_steps::open_session;
use plant_storefront::state::AppState;
use plant_storefront::store::{self, MemoryStore};
use plant_storefront::workflow::{ContextData, PipelineControl};
use plant_storefront::errors::AppError;

pub const ADMIN_PASSWORD: &str = "admin123";

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Fresh in-memory state with the demo catalog (plant ids 1..=3) and default settings.
pub async fn seeded_state() -> AppState {
  setup_tracing();
  let state = AppState::new(Arc::new(MemoryStore::new()), AppConfig::default());
  store::seed_demo_data(state.store.as_ref())
    .await
    .expect("seeding the memory store never fails");
  state
}

/// Creates an account straight in the store and opens a session for it,
/// skipping the password hash the HTTP sign-up would compute.
pub async fn signed_in_buyer(state: &AppState, email: &str, balance: i64) -> (User, String) {
  let user = state
    .store
    .create_user(NewUser {
      email: email.to_string(),
      full_name: "Test Buyer".to_string(),
      phone: "+7 900 000-00-00".to_string(),
      password_hash: "not-a-real-hash".to_string(),
    })
    .await
    .expect("create user");
  let user = if balance > 0 {
    state
      .store
      .set_user_funds(user.id, balance, 0)
      .await
      .expect("set funds")
      .expect("user exists")
  } else {
    user
  };
  let session = open_session(state, user.id).await.expect("open session");
  (user, session.token)
}

pub fn checkout_body(email: &str, items: serde_json::Value, payment_method: &str) -> serde_json::Value {
  serde_json::json!({
    "full_name": "Анна Петрова",
    "email": email,
    "phone": "+7 912 345-67-89",
    "delivery_address": "Санкт-Петербург, Невский пр., 10",
    "comment": "Позвонить за час",
    "items": items,
    "payment_method": payment_method,
  })
}

// Handler builders for pipeline tests.

pub fn create_simple_handler<T: Send + Sync + 'static>(
  log: Arc<parking_lot::Mutex<Vec<String>>>,
  label: &'static str,
  control: PipelineControl,
) -> impl Fn(ContextData<T>) -> futures_util::future::BoxFuture<'static, Result<PipelineControl, AppError>>
       + Send
       + Sync
       + 'static {
  move |_ctx: ContextData<T>| {
    let log = log.clone();
    Box::pin(async move {
      log.lock().push(label.to_string());
      Ok(control)
    })
  }
}

pub fn create_failing_handler<T: Send + Sync + 'static>(
  message: &'static str,
) -> impl Fn(ContextData<T>) -> futures_util::future::BoxFuture<'static, Result<PipelineControl, AppError>>
       + Send
       + Sync
       + 'static {
  move |_ctx: ContextData<T>| Box::pin(async move { Err(AppError::Validation(message.to_string())) })
}
