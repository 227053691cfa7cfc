// storefront/src/models/mod.rs

//! Data structures for the storefront's stored entities and their wire shapes.

pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod plant;
pub mod settings;
pub mod user;

pub use cart_item::{CartEntry, CartLine};
pub use order::{NewOrder, Order, OrderStatus, OrderView, PaymentMethod, PlacedOrder};
pub use order_item::{NewOrderItem, OrderItem};
pub use plant::{Category, Plant, PlantDraft};
pub use settings::{Settings, SettingsPatch, ADMIN_PASSWORD_KEY};
pub use user::{NewUser, Session, User, UserCredentials};
