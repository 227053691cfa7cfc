// storefront/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use std::str::FromStr;

use super::order_item::{NewOrderItem, OrderItem};
use crate::errors::AppError;

/// Order lifecycle labels. Any state may be set from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 5] = [
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
  ];

  pub fn label(self) -> &'static str {
    match self {
      OrderStatus::Pending => "Awaiting processing",
      OrderStatus::Processing => "In progress",
      OrderStatus::Shipped => "Shipped",
      OrderStatus::Delivered => "Delivered",
      OrderStatus::Cancelled => "Cancelled",
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Processing => "processing",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }
}

impl FromStr for OrderStatus {
  type Err = AppError;

  fn from_str(raw: &str) -> Result<Self, Self::Err> {
    let wanted = raw.trim();
    OrderStatus::ALL
      .into_iter()
      .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
      .ok_or_else(|| AppError::Validation(format!("Invalid status: {}", raw)))
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "payment_method_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
  #[default]
  Card,
  Balance,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: i64,
  pub user_id: Option<i64>,
  pub full_name: String,
  pub email: String,
  pub phone: String,
  pub delivery_address: String,
  pub comment: String,
  pub total_amount: i64,
  pub status: OrderStatus,
  pub payment_method: PaymentMethod,
  pub payment_reference: Option<String>,
  pub cashback_earned: i64,
  pub created_at: DateTime<Utc>,
  #[sqlx(skip)]
  pub items: Vec<OrderItem>,
}

/// JSON shape served to clients: the order plus its human readable status.
#[derive(Debug, Serialize)]
pub struct OrderView<'a> {
  #[serde(flatten)]
  pub order: &'a Order,
  pub status_label: &'static str,
}

impl Order {
  pub fn view(&self) -> OrderView<'_> {
    OrderView {
      order: self,
      status_label: self.status.label(),
    }
  }
}

/// Everything needed to persist a settled checkout in one go.
#[derive(Debug, Clone)]
pub struct NewOrder {
  pub user_id: Option<i64>,
  pub full_name: String,
  pub email: String,
  pub phone: String,
  pub delivery_address: String,
  pub comment: String,
  pub payment_method: PaymentMethod,
  pub payment_reference: Option<String>,
  pub items: Vec<NewOrderItem>,
  pub total_amount: i64,
  /// Credited to `user_id` together with the insert; zero for guests.
  pub cashback: i64,
  /// Cart lines the order was built from; exactly these are removed in the
  /// same write. Lines added to the cart meanwhile stay.
  pub cart_item_ids: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct PlacedOrder {
  pub order: Order,
  /// Buyer's balance after debit/cashback, when the order belongs to a user.
  pub balance_after: Option<i64>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_status_has_a_label_and_lowercase_wire_name() {
    for status in OrderStatus::ALL {
      assert!(!status.label().is_empty());
      let wire = serde_json::to_string(&status).unwrap();
      assert_eq!(wire, wire.to_lowercase());
    }
    let parsed: OrderStatus = serde_json::from_str("\"shipped\"").unwrap();
    assert_eq!(parsed, OrderStatus::Shipped);
  }

  #[test]
  fn unknown_status_is_rejected() {
    assert!(serde_json::from_str::<OrderStatus>("\"lost\"").is_err());
    assert!(matches!("lost".parse::<OrderStatus>(), Err(AppError::Validation(_))));
  }

  #[test]
  fn status_parses_from_its_wire_name() {
    for status in OrderStatus::ALL {
      assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
    }
    assert_eq!(" Shipped ".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
  }

  #[test]
  fn payment_method_defaults_to_card() {
    assert_eq!(PaymentMethod::default(), PaymentMethod::Card);
  }

  #[test]
  fn view_flattens_order_and_adds_label() {
    let order = Order {
      id: 3,
      user_id: None,
      full_name: "Ivan Petrov".to_string(),
      email: "ivan@example.com".to_string(),
      phone: "+7 900 000-00-00".to_string(),
      delivery_address: "Lenina 1".to_string(),
      comment: String::new(),
      total_amount: 4000,
      status: OrderStatus::Delivered,
      payment_method: PaymentMethod::Card,
      payment_reference: None,
      cashback_earned: 0,
      created_at: Utc::now(),
      items: Vec::new(),
    };
    let json = serde_json::to_value(order.view()).unwrap();
    assert_eq!(json["id"], 3);
    assert_eq!(json["status"], "delivered");
    assert_eq!(json["status_label"], "Delivered");
  }
}
