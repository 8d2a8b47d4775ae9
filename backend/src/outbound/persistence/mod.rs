//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports, backed by
//! PostgreSQL through `diesel-async` and a `bb8` connection pool.
//!
//! - **Thin adapters**: repositories translate between Diesel rows and domain
//!   types. Pricing, eligibility and lifecycle rules stay in the domain.
//! - **Internal models**: row structs (`models`) and the schema are private to
//!   this module.
//! - **Atomic side effects**: order placement, payment settlement and item
//!   status changes run inside one transaction with guarded updates.
//!
//! # Example
//!
//! ```ignore
//! use storefront::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/storefront")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_banner_repository;
mod diesel_catalog_repository;
pub(crate) mod diesel_error_mapping;
mod diesel_order_repository;
mod diesel_promotion_repository;
mod diesel_shopping_repository;
mod diesel_wallet_repository;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::{
    DieselAddressRepository, DieselAdminRepository, DieselOtpRepository, DieselUserRepository,
};
pub use diesel_banner_repository::DieselBannerRepository;
pub use diesel_catalog_repository::{
    DieselBrandRepository, DieselCategoryRepository, DieselProductRepository,
};
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_promotion_repository::{DieselCouponRepository, DieselOfferRepository};
pub use diesel_shopping_repository::{DieselCartRepository, DieselWishlistRepository};
pub use diesel_wallet_repository::DieselWalletRepository;
pub use pool::{DbPool, PoolConfig, PoolError, run_migrations};
