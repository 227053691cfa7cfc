// storefront/src/store/postgres.rs

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};

use super::Store;
use crate::errors::{AppError, Result};
use crate::models::{
  CartEntry, CartLine, Category, NewOrder, NewUser, Order, OrderItem, OrderStatus, PaymentMethod, PlacedOrder, Plant,
  PlantDraft, Session, Settings, User, UserCredentials, ADMIN_PASSWORD_KEY,
};

const SCHEMA_SQL: &str = include_str!("../../migrations/schema.sql");

const PLANT_COLUMNS: &str = "id, name, price, category, image, description";
const USER_COLUMNS: &str = "id, email, full_name, phone, balance, cashback, created_at";
const ORDER_COLUMNS: &str = "id, user_id, full_name, email, phone, delivery_address, comment, total_amount, \
   status, payment_method, payment_reference, cashback_earned, created_at";

/// SQLSTATE `numeric_value_out_of_range`.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Maps constraint violations to client errors; everything else stays a database error.
fn classify(err: sqlx::Error, conflict: &str, missing: &str) -> AppError {
  if let sqlx::Error::Database(db_err) = &err {
    if db_err.is_unique_violation() {
      return AppError::Conflict(conflict.to_string());
    }
    if db_err.is_foreign_key_violation() {
      return AppError::NotFound(missing.to_string());
    }
  }
  AppError::Sqlx(err)
}

/// Arithmetic overflow in an `UPDATE ... SET x = x + $n` becomes a validation error.
fn out_of_range(err: sqlx::Error, message: &str) -> AppError {
  if let sqlx::Error::Database(db_err) = &err {
    if db_err.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE) {
      return AppError::Validation(message.to_string());
    }
  }
  AppError::Sqlx(err)
}

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub async fn connect(database_url: &str) -> Result<Self> {
    let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
    info!("Successfully connected to the database.");
    Ok(Self { pool })
  }

  /// Applies `migrations/schema.sql`. Every statement is idempotent.
  #[instrument(skip(self))]
  pub async fn ensure_schema(&self) -> Result<()> {
    sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
    info!("Database schema is up to date.");
    Ok(())
  }

  async fn attach_items(&self, mut orders: Vec<Order>) -> Result<Vec<Order>> {
    if orders.is_empty() {
      return Ok(orders);
    }
    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let items = sqlx::query_as::<_, OrderItem>(
      "SELECT order_id, plant_id, name, price, quantity FROM order_items WHERE order_id = ANY($1) ORDER BY id",
    )
    .bind(&ids)
    .fetch_all(&self.pool)
    .await?;

    for item in items {
      if let Some(order) = orders.iter_mut().find(|o| o.id == item.order_id) {
        order.items.push(item);
      }
    }
    Ok(orders)
  }
}

#[async_trait]
impl Store for PgStore {
  async fn list_plants(&self, category: Option<Category>) -> Result<Vec<Plant>> {
    let plants = match category {
      Some(category) => {
        sqlx::query_as::<_, Plant>(&format!(
          "SELECT {} FROM plants WHERE category = $1 ORDER BY id",
          PLANT_COLUMNS
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await?
      }
      None => {
        sqlx::query_as::<_, Plant>(&format!("SELECT {} FROM plants ORDER BY id", PLANT_COLUMNS))
          .fetch_all(&self.pool)
          .await?
      }
    };
    Ok(plants)
  }

  async fn get_plant(&self, id: i64) -> Result<Option<Plant>> {
    let plant = sqlx::query_as::<_, Plant>(&format!("SELECT {} FROM plants WHERE id = $1", PLANT_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(plant)
  }

  async fn create_plant(&self, draft: PlantDraft) -> Result<Plant> {
    let plant = sqlx::query_as::<_, Plant>(&format!(
      "INSERT INTO plants (name, price, category, image, description) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
      PLANT_COLUMNS
    ))
    .bind(draft.name.trim())
    .bind(draft.price)
    .bind(draft.category)
    .bind(&draft.image)
    .bind(&draft.description)
    .fetch_one(&self.pool)
    .await?;
    Ok(plant)
  }

  async fn update_plant(&self, id: i64, draft: PlantDraft) -> Result<Option<Plant>> {
    let plant = sqlx::query_as::<_, Plant>(&format!(
      "UPDATE plants SET name = $1, price = $2, category = $3, image = $4, description = $5 WHERE id = $6 RETURNING {}",
      PLANT_COLUMNS
    ))
    .bind(draft.name.trim())
    .bind(draft.price)
    .bind(draft.category)
    .bind(&draft.image)
    .bind(&draft.description)
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(plant)
  }

  async fn delete_plant(&self, id: i64) -> Result<bool> {
    // Cart lines and favorites cascade; order items are set to NULL.
    let result = sqlx::query("DELETE FROM plants WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  async fn settings(&self) -> Result<Settings> {
    let rows = sqlx::query_as::<_, (String, String)>("SELECT key, value FROM site_settings WHERE key <> $1")
      .bind(ADMIN_PASSWORD_KEY)
      .fetch_all(&self.pool)
      .await?;
    Ok(Settings::from_pairs(rows))
  }

  async fn admin_password(&self) -> Result<Option<String>> {
    let value = sqlx::query_scalar::<_, String>("SELECT value FROM site_settings WHERE key = $1")
      .bind(ADMIN_PASSWORD_KEY)
      .fetch_optional(&self.pool)
      .await?;
    Ok(value)
  }

  async fn upsert_settings(&self, pairs: Vec<(String, String)>) -> Result<()> {
    let mut tx = self.pool.begin().await?;
    for (key, value) in pairs {
      sqlx::query(
        "INSERT INTO site_settings (key, value, updated_at) VALUES ($1, $2, now()) \
         ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()",
      )
      .bind(key)
      .bind(value)
      .execute(&mut *tx)
      .await?;
    }
    tx.commit().await?;
    Ok(())
  }

  async fn create_user(&self, new_user: NewUser) -> Result<User> {
    sqlx::query_as::<_, User>(&format!(
      "INSERT INTO users (email, password_hash, full_name, phone) VALUES ($1, $2, $3, $4) RETURNING {}",
      USER_COLUMNS
    ))
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .bind(&new_user.full_name)
    .bind(&new_user.phone)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| classify(e, "Email already registered", "User not found"))
  }

  async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>> {
    let creds = sqlx::query_as::<_, UserCredentials>("SELECT id, password_hash FROM users WHERE email = $1")
      .bind(email)
      .fetch_optional(&self.pool)
      .await?;
    Ok(creds)
  }

  async fn get_user(&self, id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn list_users(&self, search: Option<&str>) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
      "SELECT {} FROM users WHERE $1::text IS NULL OR strpos(lower(email), lower($1)) > 0 ORDER BY id",
      USER_COLUMNS
    ))
    .bind(search)
    .fetch_all(&self.pool)
    .await?;
    Ok(users)
  }

  async fn set_user_funds(&self, id: i64, balance: i64, cashback: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
      "UPDATE users SET balance = $1, cashback = $2 WHERE id = $3 RETURNING {}",
      USER_COLUMNS
    ))
    .bind(balance)
    .bind(cashback)
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(user)
  }

  /// Also drops every session that has already expired.
  async fn create_session(&self, session: Session) -> Result<()> {
    let pruned = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
      .execute(&self.pool)
      .await?;
    if pruned.rows_affected() > 0 {
      debug!(pruned = pruned.rows_affected(), "Expired sessions removed.");
    }
    sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
      .bind(&session.token)
      .bind(session.user_id)
      .bind(session.expires_at)
      .execute(&self.pool)
      .await
      .map_err(|e| classify(e, "Session token collision", "User not found"))?;
    Ok(())
  }

  async fn find_session(&self, token: &str) -> Result<Option<Session>> {
    let session = sqlx::query_as::<_, Session>("SELECT token, user_id, expires_at FROM sessions WHERE token = $1")
      .bind(token)
      .fetch_optional(&self.pool)
      .await?;
    Ok(session)
  }

  async fn delete_session(&self, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
      .bind(token)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn cart_lines(&self, user_id: i64) -> Result<Vec<CartLine>> {
    let lines = sqlx::query_as::<_, CartLine>(
      "SELECT c.id, c.plant_id, p.name, p.price, p.image, p.category, c.quantity \
       FROM cart_items c JOIN plants p ON p.id = c.plant_id \
       WHERE c.user_id = $1 ORDER BY c.id",
    )
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(lines)
  }

  async fn add_to_cart(&self, user_id: i64, plant_id: i64, quantity: i32) -> Result<CartEntry> {
    sqlx::query_as::<_, CartEntry>(
      "INSERT INTO cart_items (user_id, plant_id, quantity) VALUES ($1, $2, $3) \
       ON CONFLICT (user_id, plant_id) DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity \
       RETURNING id, plant_id, quantity",
    )
    .bind(user_id)
    .bind(plant_id)
    .bind(quantity)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| match out_of_range(e, "Quantity is out of range.") {
      AppError::Sqlx(e) => classify(e, "Cart item already exists", "Plant not found"),
      mapped => mapped,
    })
  }

  async fn set_cart_quantity(&self, user_id: i64, item_id: i64, quantity: i32) -> Result<Option<CartEntry>> {
    let entry = sqlx::query_as::<_, CartEntry>(
      "UPDATE cart_items SET quantity = $1 WHERE id = $2 AND user_id = $3 RETURNING id, plant_id, quantity",
    )
    .bind(quantity)
    .bind(item_id)
    .bind(user_id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(entry)
  }

  async fn remove_cart_item(&self, user_id: i64, item_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
      .bind(item_id)
      .bind(user_id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  async fn clear_cart(&self, user_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
      .bind(user_id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn favorite_plants(&self, user_id: i64) -> Result<Vec<Plant>> {
    let plants = sqlx::query_as::<_, Plant>(
      "SELECT p.id, p.name, p.price, p.category, p.image, p.description \
       FROM favorites f JOIN plants p ON p.id = f.plant_id \
       WHERE f.user_id = $1 ORDER BY f.created_at",
    )
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(plants)
  }

  async fn toggle_favorite(&self, user_id: i64, plant_id: i64) -> Result<bool> {
    let removed = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND plant_id = $2")
      .bind(user_id)
      .bind(plant_id)
      .execute(&self.pool)
      .await?;
    if removed.rows_affected() > 0 {
      return Ok(false);
    }
    sqlx::query("INSERT INTO favorites (user_id, plant_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
      .bind(user_id)
      .bind(plant_id)
      .execute(&self.pool)
      .await
      .map_err(|e| classify(e, "Already a favorite", "Plant not found"))?;
    Ok(true)
  }

  #[instrument(skip(self, new_order), fields(user_id = ?new_order.user_id, total = new_order.total_amount))]
  async fn place_order(&self, new_order: NewOrder) -> Result<PlacedOrder> {
    let mut tx = self.pool.begin().await?;

    if new_order.payment_method == PaymentMethod::Balance {
      let user_id = new_order
        .user_id
        .ok_or_else(|| AppError::Auth("Sign in to pay with balance".to_string()))?;
      // Sufficiency is re-checked inside the debit itself.
      let debited = sqlx::query("UPDATE users SET balance = balance - $1 WHERE id = $2 AND balance >= $1")
        .bind(new_order.total_amount)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
      if debited.rows_affected() == 0 {
        warn!(user_id, "Balance debit refused.");
        return Err(AppError::Payment("Insufficient balance".to_string()));
      }
    }

    let mut order = sqlx::query_as::<_, Order>(&format!(
      "INSERT INTO orders (user_id, full_name, email, phone, delivery_address, comment, total_amount, \
         status, payment_method, payment_reference, cashback_earned) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(new_order.user_id)
    .bind(&new_order.full_name)
    .bind(&new_order.email)
    .bind(&new_order.phone)
    .bind(&new_order.delivery_address)
    .bind(&new_order.comment)
    .bind(new_order.total_amount)
    .bind(OrderStatus::Pending)
    .bind(new_order.payment_method)
    .bind(&new_order.payment_reference)
    .bind(new_order.cashback)
    .fetch_one(&mut *tx)
    .await?;

    for item in new_order.items {
      let stored = sqlx::query_as::<_, OrderItem>(
        "INSERT INTO order_items (order_id, plant_id, name, price, quantity) VALUES ($1, $2, $3, $4, $5) \
         RETURNING order_id, plant_id, name, price, quantity",
      )
      .bind(order.id)
      .bind(item.plant_id)
      .bind(&item.name)
      .bind(item.price)
      .bind(item.quantity)
      .fetch_one(&mut *tx)
      .await
      .map_err(|e| classify(e, "Duplicate order item", "Plant not found"))?;
      order.items.push(stored);
    }

    let balance_after = match new_order.user_id {
      Some(user_id) => {
        if !new_order.cart_item_ids.is_empty() {
          sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND id = ANY($2)")
            .bind(user_id)
            .bind(&new_order.cart_item_ids)
            .execute(&mut *tx)
            .await?;
        }
        let balance = sqlx::query_scalar::<_, i64>(
          "UPDATE users SET cashback = cashback + $1 WHERE id = $2 RETURNING balance",
        )
        .bind(new_order.cashback)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| out_of_range(e, "Cashback total is out of range."))?;
        Some(balance.ok_or_else(|| AppError::NotFound("User not found".to_string()))?)
      }
      None => None,
    };

    tx.commit().await?;
    info!(order_id = order.id, "Order persisted.");
    Ok(PlacedOrder { order, balance_after })
  }

  async fn get_order(&self, id: i64) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    match order {
      Some(order) => Ok(self.attach_items(vec![order]).await?.pop()),
      None => Ok(None),
    }
  }

  async fn orders_by_email(&self, email: &str) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
      "SELECT {} FROM orders WHERE lower(email) = lower($1) ORDER BY created_at DESC, id DESC",
      ORDER_COLUMNS
    ))
    .bind(email.trim())
    .fetch_all(&self.pool)
    .await?;
    self.attach_items(orders).await
  }

  async fn orders_by_user(&self, user_id: i64) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
      "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
      ORDER_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    self.attach_items(orders).await
  }

  async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
    let orders = match status {
      Some(status) => {
        sqlx::query_as::<_, Order>(&format!(
          "SELECT {} FROM orders WHERE status = $1 ORDER BY created_at DESC, id DESC",
          ORDER_COLUMNS
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?
      }
      None => {
        sqlx::query_as::<_, Order>(&format!(
          "SELECT {} FROM orders ORDER BY created_at DESC, id DESC",
          ORDER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?
      }
    };
    self.attach_items(orders).await
  }

  async fn set_order_status(&self, id: i64, status: OrderStatus) -> Result<bool> {
    let result = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
      .bind(status)
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }
}
