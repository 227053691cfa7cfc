// storefront/src/models/order_item.rs

use serde::Serialize;
use sqlx::FromRow;

/// A purchased line. Name and price are snapshots taken at checkout; `plant_id`
/// is cleared if the plant is later removed from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct OrderItem {
  #[serde(skip)]
  pub order_id: i64,
  pub plant_id: Option<i64>,
  pub name: String,
  pub price: i64,
  pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
  pub plant_id: i64,
  pub name: String,
  pub price: i64,
  pub quantity: i32,
}

impl NewOrderItem {
  pub fn into_order_item(self, order_id: i64) -> OrderItem {
    OrderItem {
      order_id,
      plant_id: Some(self.plant_id),
      name: self.name,
      price: self.price,
      quantity: self.quantity,
    }
  }
}
