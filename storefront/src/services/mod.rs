// storefront/src/services/mod.rs

pub mod auth_service;
pub mod catalog;
pub mod notifier;
pub mod payment_gateway;
pub mod pricing;
