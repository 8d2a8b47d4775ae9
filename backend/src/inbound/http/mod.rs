//! HTTP inbound adapter exposing the REST API.

pub mod admin_auth;
pub mod api;
pub mod auth;
pub mod banners;
pub mod brands;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod coupons;
pub mod customers;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod offers;
pub mod orders;
pub mod products;
pub mod profile;
pub mod returns;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
pub mod storefront;
#[cfg(test)]
pub mod test_utils;
pub mod user_auth;
pub mod validation;
pub mod wallet;
pub mod wishlist;

pub use error::ApiResult;
