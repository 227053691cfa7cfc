// storefront/src/lib.rs

//! Plant storefront backend: catalog, carts, favorites, checkout with
//! balance/cashback, order history and the admin back-office, served as a
//! JSON API over actix-web.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;
pub mod workflow;
