// storefront/src/web/handlers/mod.rs

pub mod admin_handlers;
pub mod auth_handlers;
pub mod cart_handlers;
pub mod favorite_handlers;
pub mod order_handlers;
pub mod plant_handlers;
pub mod settings_handlers;
