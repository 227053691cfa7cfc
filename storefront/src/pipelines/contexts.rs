// storefront/src/pipelines/contexts.rs

//! Data carried through each pipeline run. Handlers receive these wrapped in
//! `ContextData`.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{CartEntry, NewOrderItem, PaymentMethod, PlacedOrder, User};
use crate::state::AppState;

#[derive(Clone)]
pub struct SignupCtxData {
  pub app_state: AppState,
  pub email: String,
  pub password: String,
  pub full_name: String,
  pub phone: String,
  pub created_user: Option<User>,
  pub session_token: Option<String>,
  pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct SigninCtxData {
  pub app_state: AppState,
  pub email: String,
  pub password: String,
  pub user: Option<User>,
  pub session_token: Option<String>,
  pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct AddToCartCtxData {
  pub app_state: AppState,
  pub user_id: i64,
  pub plant_id: i64,
  pub quantity: i32,
  pub updated_entry: Option<CartEntry>,
}

/// One requested line of a checkout body. Prices are never taken from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutLine {
  pub plant_id: i64,
  #[serde(default = "default_quantity")]
  pub quantity: i32,
}

pub(crate) fn default_quantity() -> i32 {
  1
}

#[derive(Clone)]
pub struct CheckoutCtxData {
  pub app_state: AppState,
  /// Present when the request carried a valid session.
  pub user_id: Option<i64>,

  pub full_name: String,
  pub email: String,
  pub phone: String,
  pub delivery_address: String,
  pub comment: String,
  pub requested: Vec<CheckoutLine>,
  pub payment_method: PaymentMethod,

  pub items: Vec<NewOrderItem>,
  /// Cart lines the items were taken from; empty for explicit items.
  pub cart_item_ids: Vec<i64>,
  pub total_amount: i64,
  pub payment_reference: Option<String>,
  pub placed: Option<PlacedOrder>,
  pub confirmation_sent: bool,
}

impl CheckoutCtxData {
  pub fn new(app_state: AppState, user_id: Option<i64>) -> Self {
    Self {
      app_state,
      user_id,
      full_name: String::new(),
      email: String::new(),
      phone: String::new(),
      delivery_address: String::new(),
      comment: String::new(),
      requested: Vec::new(),
      payment_method: PaymentMethod::Card,
      items: Vec::new(),
      cart_item_ids: Vec::new(),
      total_amount: 0,
      payment_reference: None,
      placed: None,
      confirmation_sent: false,
    }
  }
}
