// storefront/src/web/handlers/admin_handlers.rs

//! Back-office: every route here requires `AdminAccess`.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::OrderStatus;
use crate::state::AppState;
use crate::web::extractors::AdminAccess;

#[derive(Deserialize, Debug)]
pub struct StatusFilter {
  pub status: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct StatusUpdatePayload {
  pub status: String,
}

#[derive(Deserialize, Debug)]
pub struct UserSearch {
  pub search: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct FundsPayload {
  pub balance: i64,
  pub cashback: i64,
}

#[instrument(name = "handler::admin_list_orders", skip(app_state, _admin))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  _admin: AdminAccess,
  query: web::Query<StatusFilter>,
) -> Result<HttpResponse, AppError> {
  let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
    Some(raw) => Some(raw.parse::<OrderStatus>()?),
    None => None,
  };
  let orders = app_state.store.list_orders(status).await?;
  let body: Vec<_> = orders.iter().map(|order| order.view()).collect();
  Ok(HttpResponse::Ok().json(body))
}

/// Any status may be set from any other.
#[instrument(name = "handler::update_order_status", skip(app_state, _admin))]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  _admin: AdminAccess,
  path: web::Path<i64>,
  body: web::Json<StatusUpdatePayload>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let status: OrderStatus = body.status.parse()?;
  if !app_state.store.set_order_status(order_id, status).await? {
    return Err(AppError::NotFound("Order not found".to_string()));
  }
  info!(order_id, status = status.as_str(), "Order status updated.");
  Ok(HttpResponse::Ok().json(json!({
    "id": order_id,
    "status": status,
    "status_label": status.label(),
  })))
}

#[instrument(name = "handler::admin_list_users", skip(app_state, _admin))]
pub async fn list_users_handler(
  app_state: web::Data<AppState>,
  _admin: AdminAccess,
  query: web::Query<UserSearch>,
) -> Result<HttpResponse, AppError> {
  let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
  let users = app_state.store.list_users(search).await?;
  Ok(HttpResponse::Ok().json(users))
}

#[instrument(name = "handler::update_user_funds", skip(app_state, _admin))]
pub async fn update_user_funds_handler(
  app_state: web::Data<AppState>,
  _admin: AdminAccess,
  path: web::Path<i64>,
  body: web::Json<FundsPayload>,
) -> Result<HttpResponse, AppError> {
  if body.balance < 0 || body.cashback < 0 {
    return Err(AppError::Validation("Balance and cashback must not be negative.".to_string()));
  }
  let user_id = path.into_inner();
  let user = app_state
    .store
    .set_user_funds(user_id, body.balance, body.cashback)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
  info!(user_id, balance = user.balance, cashback = user.cashback, "User funds updated.");
  Ok(HttpResponse::Ok().json(user))
}
