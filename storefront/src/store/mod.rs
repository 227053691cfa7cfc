// storefront/src/store/mod.rs

//! Persistence boundary. Handlers and pipelines only see `dyn Store`; the
//! server picks `PgStore` when a database is configured and `MemoryStore`
//! otherwise.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::errors::Result;
use crate::models::{
  CartEntry, CartLine, Category, NewOrder, NewUser, Order, OrderStatus, PlacedOrder, Plant, PlantDraft, Session,
  Settings, User, UserCredentials,
};
use crate::services::catalog;

#[async_trait]
pub trait Store: Send + Sync {
  // --- Catalog ---
  async fn list_plants(&self, category: Option<Category>) -> Result<Vec<Plant>>;
  async fn get_plant(&self, id: i64) -> Result<Option<Plant>>;
  async fn create_plant(&self, draft: PlantDraft) -> Result<Plant>;
  async fn update_plant(&self, id: i64, draft: PlantDraft) -> Result<Option<Plant>>;
  /// Removes the plant from every cart and favorite list; order items keep their snapshot.
  async fn delete_plant(&self, id: i64) -> Result<bool>;

  // --- Settings ---
  /// Every stored key except the admin password.
  async fn settings(&self) -> Result<Settings>;
  /// The stored admin password, if the settings table carries one.
  async fn admin_password(&self) -> Result<Option<String>>;
  async fn upsert_settings(&self, pairs: Vec<(String, String)>) -> Result<()>;

  // --- Users and sessions ---
  /// Fails with `Conflict` when the email is taken.
  async fn create_user(&self, new_user: NewUser) -> Result<User>;
  async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>>;
  async fn get_user(&self, id: i64) -> Result<Option<User>>;
  /// Users whose email contains `search`, case-insensitively; all users when `None`.
  async fn list_users(&self, search: Option<&str>) -> Result<Vec<User>>;
  async fn set_user_funds(&self, id: i64, balance: i64, cashback: i64) -> Result<Option<User>>;
  async fn create_session(&self, session: Session) -> Result<()>;
  async fn find_session(&self, token: &str) -> Result<Option<Session>>;
  async fn delete_session(&self, token: &str) -> Result<()>;

  // --- Cart ---
  async fn cart_lines(&self, user_id: i64) -> Result<Vec<CartLine>>;
  /// Adds `quantity` of a plant, merging with an existing line for the same plant.
  async fn add_to_cart(&self, user_id: i64, plant_id: i64, quantity: i32) -> Result<CartEntry>;
  async fn set_cart_quantity(&self, user_id: i64, item_id: i64, quantity: i32) -> Result<Option<CartEntry>>;
  async fn remove_cart_item(&self, user_id: i64, item_id: i64) -> Result<bool>;
  async fn clear_cart(&self, user_id: i64) -> Result<()>;

  // --- Favorites ---
  async fn favorite_plants(&self, user_id: i64) -> Result<Vec<Plant>>;
  /// Flips membership and returns whether the plant is now a favorite.
  async fn toggle_favorite(&self, user_id: i64, plant_id: i64) -> Result<bool>;

  // --- Orders ---
  /// Persists a settled checkout atomically: the order and its items, the
  /// balance debit (re-checked, `Payment` error when short), the cashback
  /// credit and the optional cart clear either all happen or none do.
  async fn place_order(&self, new_order: NewOrder) -> Result<PlacedOrder>;
  async fn get_order(&self, id: i64) -> Result<Option<Order>>;
  /// Newest first.
  async fn orders_by_email(&self, email: &str) -> Result<Vec<Order>>;
  /// Newest first.
  async fn orders_by_user(&self, user_id: i64) -> Result<Vec<Order>>;
  /// Newest first, optionally narrowed to one status.
  async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>>;
  async fn set_order_status(&self, id: i64, status: OrderStatus) -> Result<bool>;
}

/// Fills an empty catalog with the demo plants and default contact settings.
/// A catalog that already has plants is left alone.
#[instrument(skip_all)]
pub async fn seed_demo_data(store: &dyn Store) -> Result<()> {
  if !store.list_plants(None).await?.is_empty() {
    info!("Catalog already populated, skipping seed.");
    return Ok(());
  }

  for draft in catalog::demo_plants() {
    store.create_plant(draft).await?;
  }
  store.upsert_settings(catalog::default_settings()).await?;
  info!("Seeded demo catalog and default settings.");
  Ok(())
}
