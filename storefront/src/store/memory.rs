// storefront/src/store/memory.rs

//! In-process store. One `RwLock` guards every table so multi-table writes
//! (checkout, plant removal) are a single critical section.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::Store;
use crate::errors::{AppError, Result};
use crate::models::{
  CartEntry, CartLine, Category, NewOrder, NewUser, Order, OrderStatus, PaymentMethod, PlacedOrder, Plant,
  PlantDraft, Session, Settings, User, UserCredentials, ADMIN_PASSWORD_KEY,
};
use crate::services::{catalog, pricing};

#[derive(Debug, Clone)]
struct UserRow {
  user: User,
  password_hash: String,
}

#[derive(Debug, Clone, Copy)]
struct CartRow {
  id: i64,
  user_id: i64,
  plant_id: i64,
  quantity: i32,
}

impl CartRow {
  fn entry(&self) -> CartEntry {
    CartEntry {
      id: self.id,
      plant_id: self.plant_id,
      quantity: self.quantity,
    }
  }
}

#[derive(Debug, Default)]
struct Tables {
  plants: BTreeMap<i64, Plant>,
  settings: BTreeMap<String, String>,
  users: BTreeMap<i64, UserRow>,
  sessions: HashMap<String, Session>,
  cart: BTreeMap<i64, CartRow>,
  /// `(user_id, plant_id)` in insertion order.
  favorites: Vec<(i64, i64)>,
  orders: BTreeMap<i64, Order>,
  next_plant_id: i64,
  next_user_id: i64,
  next_cart_id: i64,
  next_order_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
  *counter += 1;
  *counter
}

fn newest_first<'a>(orders: impl Iterator<Item = &'a Order>) -> Vec<Order> {
  let mut out: Vec<Order> = orders.cloned().collect();
  out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
  out
}

#[derive(Debug, Default)]
pub struct MemoryStore {
  tables: RwLock<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn list_plants(&self, category: Option<Category>) -> Result<Vec<Plant>> {
    let plants = self.tables.read().plants.values().cloned().collect();
    Ok(catalog::filter_by_category(plants, category))
  }

  async fn get_plant(&self, id: i64) -> Result<Option<Plant>> {
    Ok(self.tables.read().plants.get(&id).cloned())
  }

  async fn create_plant(&self, draft: PlantDraft) -> Result<Plant> {
    let mut tables = self.tables.write();
    let id = next_id(&mut tables.next_plant_id);
    let plant = draft.into_plant(id);
    tables.plants.insert(id, plant.clone());
    Ok(plant)
  }

  async fn update_plant(&self, id: i64, draft: PlantDraft) -> Result<Option<Plant>> {
    let mut tables = self.tables.write();
    match tables.plants.get_mut(&id) {
      Some(existing) => {
        *existing = draft.into_plant(id);
        Ok(Some(existing.clone()))
      }
      None => Ok(None),
    }
  }

  async fn delete_plant(&self, id: i64) -> Result<bool> {
    let mut tables = self.tables.write();
    if tables.plants.remove(&id).is_none() {
      return Ok(false);
    }
    tables.cart.retain(|_, row| row.plant_id != id);
    tables.favorites.retain(|(_, plant_id)| *plant_id != id);
    for order in tables.orders.values_mut() {
      for item in order.items.iter_mut().filter(|i| i.plant_id == Some(id)) {
        item.plant_id = None;
      }
    }
    Ok(true)
  }

  async fn settings(&self) -> Result<Settings> {
    let tables = self.tables.read();
    Ok(Settings::from_pairs(
      tables.settings.iter().map(|(k, v)| (k.clone(), v.clone())),
    ))
  }

  async fn admin_password(&self) -> Result<Option<String>> {
    Ok(self.tables.read().settings.get(ADMIN_PASSWORD_KEY).cloned())
  }

  async fn upsert_settings(&self, pairs: Vec<(String, String)>) -> Result<()> {
    let mut tables = self.tables.write();
    tables.settings.extend(pairs);
    Ok(())
  }

  async fn create_user(&self, new_user: NewUser) -> Result<User> {
    let mut tables = self.tables.write();
    if tables.users.values().any(|row| row.user.email == new_user.email) {
      return Err(AppError::Conflict("Email already registered".to_string()));
    }
    let id = next_id(&mut tables.next_user_id);
    let user = User {
      id,
      email: new_user.email,
      full_name: new_user.full_name,
      phone: new_user.phone,
      balance: 0,
      cashback: 0,
      created_at: Utc::now(),
    };
    tables.users.insert(
      id,
      UserRow {
        user: user.clone(),
        password_hash: new_user.password_hash,
      },
    );
    Ok(user)
  }

  async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>> {
    let tables = self.tables.read();
    Ok(tables.users.values().find(|row| row.user.email == email).map(|row| UserCredentials {
      id: row.user.id,
      password_hash: row.password_hash.clone(),
    }))
  }

  async fn get_user(&self, id: i64) -> Result<Option<User>> {
    Ok(self.tables.read().users.get(&id).map(|row| row.user.clone()))
  }

  async fn list_users(&self, search: Option<&str>) -> Result<Vec<User>> {
    let needle = search.map(str::to_lowercase);
    let tables = self.tables.read();
    Ok(
      tables
        .users
        .values()
        .filter(|row| {
          needle
            .as_deref()
            .map_or(true, |n| row.user.email.to_lowercase().contains(n))
        })
        .map(|row| row.user.clone())
        .collect(),
    )
  }

  async fn set_user_funds(&self, id: i64, balance: i64, cashback: i64) -> Result<Option<User>> {
    let mut tables = self.tables.write();
    Ok(tables.users.get_mut(&id).map(|row| {
      row.user.balance = balance;
      row.user.cashback = cashback;
      row.user.clone()
    }))
  }

  /// Also drops every session that has already expired.
  async fn create_session(&self, session: Session) -> Result<()> {
    let now = Utc::now();
    let mut tables = self.tables.write();
    tables.sessions.retain(|_, existing| !existing.is_expired(now));
    tables.sessions.insert(session.token.clone(), session);
    Ok(())
  }

  async fn find_session(&self, token: &str) -> Result<Option<Session>> {
    Ok(self.tables.read().sessions.get(token).cloned())
  }

  async fn delete_session(&self, token: &str) -> Result<()> {
    self.tables.write().sessions.remove(token);
    Ok(())
  }

  async fn cart_lines(&self, user_id: i64) -> Result<Vec<CartLine>> {
    let tables = self.tables.read();
    Ok(
      tables
        .cart
        .values()
        .filter(|row| row.user_id == user_id)
        .filter_map(|row| {
          tables.plants.get(&row.plant_id).map(|plant| CartLine {
            id: row.id,
            plant_id: plant.id,
            name: plant.name.clone(),
            price: plant.price,
            image: plant.image.clone(),
            category: plant.category,
            quantity: row.quantity,
          })
        })
        .collect(),
    )
  }

  async fn add_to_cart(&self, user_id: i64, plant_id: i64, quantity: i32) -> Result<CartEntry> {
    let mut tables = self.tables.write();
    if !tables.plants.contains_key(&plant_id) {
      return Err(AppError::NotFound("Plant not found".to_string()));
    }
    if let Some(row) = tables
      .cart
      .values_mut()
      .find(|row| row.user_id == user_id && row.plant_id == plant_id)
    {
      row.quantity = pricing::merge_quantity(row.quantity, quantity)?;
      return Ok(row.entry());
    }
    let id = next_id(&mut tables.next_cart_id);
    let row = CartRow {
      id,
      user_id,
      plant_id,
      quantity,
    };
    tables.cart.insert(id, row);
    Ok(row.entry())
  }

  async fn set_cart_quantity(&self, user_id: i64, item_id: i64, quantity: i32) -> Result<Option<CartEntry>> {
    let mut tables = self.tables.write();
    Ok(
      tables
        .cart
        .get_mut(&item_id)
        .filter(|row| row.user_id == user_id)
        .map(|row| {
          row.quantity = quantity;
          row.entry()
        }),
    )
  }

  async fn remove_cart_item(&self, user_id: i64, item_id: i64) -> Result<bool> {
    let mut tables = self.tables.write();
    let owned = tables.cart.get(&item_id).map_or(false, |row| row.user_id == user_id);
    if owned {
      tables.cart.remove(&item_id);
    }
    Ok(owned)
  }

  async fn clear_cart(&self, user_id: i64) -> Result<()> {
    self.tables.write().cart.retain(|_, row| row.user_id != user_id);
    Ok(())
  }

  async fn favorite_plants(&self, user_id: i64) -> Result<Vec<Plant>> {
    let tables = self.tables.read();
    Ok(
      tables
        .favorites
        .iter()
        .filter(|(uid, _)| *uid == user_id)
        .filter_map(|(_, plant_id)| tables.plants.get(plant_id).cloned())
        .collect(),
    )
  }

  async fn toggle_favorite(&self, user_id: i64, plant_id: i64) -> Result<bool> {
    let mut tables = self.tables.write();
    if !tables.plants.contains_key(&plant_id) {
      return Err(AppError::NotFound("Plant not found".to_string()));
    }
    let key = (user_id, plant_id);
    if let Some(pos) = tables.favorites.iter().position(|f| *f == key) {
      tables.favorites.remove(pos);
      Ok(false)
    } else {
      tables.favorites.push(key);
      Ok(true)
    }
  }

  async fn place_order(&self, new_order: NewOrder) -> Result<PlacedOrder> {
    let mut tables = self.tables.write();

    if let Some(user_id) = new_order.user_id {
      let row = tables
        .users
        .get_mut(&user_id)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
      // Both new amounts are computed before either is written.
      let balance = if new_order.payment_method == PaymentMethod::Balance {
        if !pricing::can_pay_with_balance(row.user.balance, new_order.total_amount) {
          return Err(AppError::Payment("Insufficient balance".to_string()));
        }
        row.user.balance - new_order.total_amount
      } else {
        row.user.balance
      };
      let cashback = pricing::credit_cashback(row.user.cashback, new_order.cashback)?;
      row.user.balance = balance;
      row.user.cashback = cashback;
    } else if new_order.payment_method == PaymentMethod::Balance {
      return Err(AppError::Auth("Sign in to pay with balance".to_string()));
    }

    let id = next_id(&mut tables.next_order_id);
    let order = Order {
      id,
      user_id: new_order.user_id,
      full_name: new_order.full_name,
      email: new_order.email,
      phone: new_order.phone,
      delivery_address: new_order.delivery_address,
      comment: new_order.comment,
      total_amount: new_order.total_amount,
      status: OrderStatus::Pending,
      payment_method: new_order.payment_method,
      payment_reference: new_order.payment_reference,
      cashback_earned: new_order.cashback,
      created_at: Utc::now(),
      items: new_order.items.into_iter().map(|item| item.into_order_item(id)).collect(),
    };
    tables.orders.insert(id, order.clone());

    let balance_after = match order.user_id {
      Some(user_id) => {
        let ordered = &new_order.cart_item_ids;
        tables
          .cart
          .retain(|id, row| row.user_id != user_id || !ordered.contains(id));
        tables.users.get(&user_id).map(|row| row.user.balance)
      }
      None => None,
    };

    Ok(PlacedOrder { order, balance_after })
  }

  async fn get_order(&self, id: i64) -> Result<Option<Order>> {
    Ok(self.tables.read().orders.get(&id).cloned())
  }

  async fn orders_by_email(&self, email: &str) -> Result<Vec<Order>> {
    let wanted = email.trim().to_lowercase();
    let tables = self.tables.read();
    Ok(newest_first(
      tables.orders.values().filter(|o| o.email.to_lowercase() == wanted),
    ))
  }

  async fn orders_by_user(&self, user_id: i64) -> Result<Vec<Order>> {
    let tables = self.tables.read();
    Ok(newest_first(
      tables.orders.values().filter(|o| o.user_id == Some(user_id)),
    ))
  }

  async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
    let tables = self.tables.read();
    Ok(newest_first(
      tables.orders.values().filter(|o| status.map_or(true, |s| o.status == s)),
    ))
  }

  async fn set_order_status(&self, id: i64, status: OrderStatus) -> Result<bool> {
    let mut tables = self.tables.write();
    Ok(match tables.orders.get_mut(&id) {
      Some(order) => {
        order.status = status;
        true
      }
      None => false,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::NewOrderItem;

  fn draft(name: &str, price: i64, category: Category) -> PlantDraft {
    PlantDraft {
      name: name.to_string(),
      price,
      category,
      image: String::new(),
      description: String::new(),
    }
  }

  async fn store_with_user(balance: i64) -> (MemoryStore, i64, Plant) {
    let store = MemoryStore::new();
    let plant = store.create_plant(draft("Monstera", 2500, Category::Decorative)).await.unwrap();
    let user = store
      .create_user(NewUser {
        email: "anna@example.com".to_string(),
        full_name: "Anna".to_string(),
        phone: String::new(),
        password_hash: "x".to_string(),
      })
      .await
      .unwrap();
    store.set_user_funds(user.id, balance, 0).await.unwrap();
    (store, user.id, plant)
  }

  fn balance_order(user_id: i64, plant: &Plant, quantity: i32) -> NewOrder {
    let total = plant.price * i64::from(quantity);
    NewOrder {
      user_id: Some(user_id),
      full_name: "Anna".to_string(),
      email: "anna@example.com".to_string(),
      phone: "1".to_string(),
      delivery_address: "Somewhere".to_string(),
      comment: String::new(),
      payment_method: PaymentMethod::Balance,
      payment_reference: None,
      items: vec![NewOrderItem {
        plant_id: plant.id,
        name: plant.name.clone(),
        price: plant.price,
        quantity,
      }],
      total_amount: total,
      cashback: pricing::cashback_for(total, 5),
      cart_item_ids: Vec::new(),
    }
  }

  #[tokio::test]
  async fn add_to_cart_merges_quantities() {
    let (store, user_id, plant) = store_with_user(0).await;
    let first = store.add_to_cart(user_id, plant.id, 1).await.unwrap();
    let second = store.add_to_cart(user_id, plant.id, 2).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.quantity, 3);
    assert_eq!(store.cart_lines(user_id).await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn balance_order_debits_and_credits_cashback_atomically() {
    let (store, user_id, plant) = store_with_user(6000).await;
    let line = store.add_to_cart(user_id, plant.id, 2).await.unwrap();

    let mut order = balance_order(user_id, &plant, 2);
    order.cart_item_ids = vec![line.id];
    let placed = store.place_order(order).await.unwrap();
    assert_eq!(placed.balance_after, Some(1000));
    assert_eq!(placed.order.cashback_earned, 250);
    assert_eq!(placed.order.status, OrderStatus::Pending);

    let user = store.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.cashback, 250);
    assert!(store.cart_lines(user_id).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn short_balance_leaves_everything_untouched() {
    let (store, user_id, plant) = store_with_user(1000).await;
    let err = store.place_order(balance_order(user_id, &plant, 1)).await.unwrap_err();
    assert!(matches!(err, AppError::Payment(_)));
    assert_eq!(store.get_user(user_id).await.unwrap().unwrap().balance, 1000);
    assert!(store.list_orders(None).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn deleting_a_plant_keeps_order_snapshot() {
    let (store, user_id, plant) = store_with_user(10_000).await;
    store.toggle_favorite(user_id, plant.id).await.unwrap();
    let placed = store.place_order(balance_order(user_id, &plant, 1)).await.unwrap();

    assert!(store.delete_plant(plant.id).await.unwrap());
    assert!(store.favorite_plants(user_id).await.unwrap().is_empty());

    let order = store.get_order(placed.order.id).await.unwrap().unwrap();
    assert_eq!(order.items[0].plant_id, None);
    assert_eq!(order.items[0].name, "Monstera");
    assert_eq!(order.items[0].price, 2500);
  }

  #[tokio::test]
  async fn only_ordered_cart_lines_are_removed() {
    let (store, user_id, plant) = store_with_user(10_000).await;
    let other = store.create_plant(draft("Lemon", 3500, Category::Fruit)).await.unwrap();
    let ordered = store.add_to_cart(user_id, plant.id, 1).await.unwrap();

    // Added after the checkout collected its lines.
    store.add_to_cart(user_id, other.id, 1).await.unwrap();

    let mut order = balance_order(user_id, &plant, 1);
    order.cart_item_ids = vec![ordered.id];
    store.place_order(order).await.unwrap();

    let remaining = store.cart_lines(user_id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].plant_id, other.id);
  }

  #[tokio::test]
  async fn cashback_overflow_is_rejected_without_side_effects() {
    let (store, user_id, plant) = store_with_user(0).await;
    store.set_user_funds(user_id, 10_000, i64::MAX).await.unwrap();

    let err = store.place_order(balance_order(user_id, &plant, 1)).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    let user = store.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.balance, 10_000);
    assert_eq!(user.cashback, i64::MAX);
    assert!(store.list_orders(None).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn merged_quantity_overflow_is_rejected() {
    let (store, user_id, plant) = store_with_user(0).await;
    store.add_to_cart(user_id, plant.id, i32::MAX).await.unwrap();
    let err = store.add_to_cart(user_id, plant.id, 1).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(store.cart_lines(user_id).await.unwrap()[0].quantity, i32::MAX);
  }

  #[tokio::test]
  async fn deleting_a_plant_empties_it_from_carts() {
    let (store, user_id, plant) = store_with_user(0).await;
    store.add_to_cart(user_id, plant.id, 2).await.unwrap();
    assert!(store.delete_plant(plant.id).await.unwrap());
    assert!(store.cart_lines(user_id).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn opening_a_session_prunes_expired_ones() {
    let (store, user_id, _) = store_with_user(0).await;
    let now = Utc::now();
    store
      .create_session(Session {
        token: "stale".to_string(),
        user_id,
        expires_at: now - chrono::Duration::hours(1),
      })
      .await
      .unwrap();
    store
      .create_session(Session {
        token: "fresh".to_string(),
        user_id,
        expires_at: now + chrono::Duration::hours(1),
      })
      .await
      .unwrap();

    assert!(store.find_session("stale").await.unwrap().is_none());
    assert!(store.find_session("fresh").await.unwrap().is_some());
  }

  #[tokio::test]
  async fn duplicate_email_conflicts() {
    let (store, _, _) = store_with_user(0).await;
    let err = store
      .create_user(NewUser {
        email: "anna@example.com".to_string(),
        full_name: "Other".to_string(),
        phone: String::new(),
        password_hash: "y".to_string(),
      })
      .await
      .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
  }
}
