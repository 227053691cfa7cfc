// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::{Order, PaymentMethod};
use crate::pipelines::contexts::{CheckoutCtxData, CheckoutLine};
use crate::state::AppState;
use crate::web::extractors::OptionalUser;
use crate::workflow::{ContextData, PipelineResult};

#[derive(Deserialize, Debug)]
pub struct CheckoutPayload {
  #[serde(default)]
  pub full_name: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub phone: String,
  #[serde(default)]
  pub delivery_address: String,
  #[serde(default)]
  pub comment: Option<String>,
  #[serde(default)]
  pub items: Vec<CheckoutLine>,
  #[serde(default)]
  pub payment_method: PaymentMethod,
}

#[derive(Deserialize, Debug)]
pub struct HistoryQuery {
  pub email: Option<String>,
  pub user_id: Option<i64>,
}

#[instrument(
  name = "handler::create_order",
  skip(app_state, buyer, body),
  fields(payment_method = ?body.payment_method, authenticated = buyer.0.is_some())
)]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  buyer: OptionalUser,
  body: web::Json<CheckoutPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = body.into_inner();
  let mut checkout = CheckoutCtxData::new(app_state.get_ref().clone(), buyer.0.as_ref().map(|u| u.id()));
  checkout.full_name = payload.full_name;
  checkout.email = payload.email;
  checkout.phone = payload.phone;
  checkout.delivery_address = payload.delivery_address;
  checkout.comment = payload.comment.unwrap_or_default();
  checkout.requested = payload.items;
  checkout.payment_method = payload.payment_method;
  let ctx_data = ContextData::new(checkout);

  match app_state.workflows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let guard = ctx_data.read();
      let placed = guard
        .placed
        .as_ref()
        .ok_or_else(|| AppError::Internal("Checkout completed without an order".to_string()))?;
      let order = &placed.order;
      info!(
        order_id = order.id,
        confirmation_sent = guard.confirmation_sent,
        "Checkout completed."
      );

      let mut body = json!({
        "order_id": order.id,
        "total_amount": order.total_amount,
        "status": order.status,
        "status_label": order.status.label(),
        "payment_method": order.payment_method,
        "cashback_earned": order.cashback_earned,
      });
      if let Some(balance) = placed.balance_after {
        body["balance"] = json!(balance);
      }
      Ok(HttpResponse::Created().json(body))
    }
    PipelineResult::Stopped => {
      warn!("Checkout pipeline stopped before placing the order.");
      Err(AppError::Internal("Checkout was halted".to_string()))
    }
  }
}

/// Order history for one buyer, by contact email or by account id.
#[instrument(name = "handler::order_history", skip(app_state))]
pub async fn order_history_handler(
  app_state: web::Data<AppState>,
  query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, AppError> {
  let HistoryQuery { email, user_id } = query.into_inner();
  let email = email.filter(|e| !e.trim().is_empty());

  let orders = match (email, user_id) {
    (Some(email), _) => app_state.store.orders_by_email(&email).await?,
    (None, Some(user_id)) => app_state.store.orders_by_user(user_id).await?,
    (None, None) => return Err(AppError::Validation("Missing required parameters".to_string())),
  };
  let body: Vec<_> = orders.iter().map(Order::view).collect();
  Ok(HttpResponse::Ok().json(body))
}

#[instrument(name = "handler::get_order", skip(app_state))]
pub async fn get_order_handler(app_state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let order = app_state
    .store
    .get_order(order_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
  Ok(HttpResponse::Ok().json(order.view()))
}
