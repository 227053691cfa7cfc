// storefront/src/models/cart_item.rs

use serde::Serialize;
use sqlx::FromRow;

use super::plant::Category;

/// A cart row joined with its plant, as listed to the buyer.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CartLine {
  pub id: i64,
  pub plant_id: i64,
  pub name: String,
  pub price: i64,
  pub image: String,
  pub category: Category,
  pub quantity: i32,
}

/// The bare cart row returned after add/update.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CartEntry {
  pub id: i64,
  pub plant_id: i64,
  pub quantity: i32,
}
