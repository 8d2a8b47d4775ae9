//! Domain entities, pricing rules, ports and services.
//!
//! Nothing in here knows about HTTP or SQL. Inbound adapters call the
//! services; outbound adapters implement the traits in [`ports`].
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: the transport-agnostic error payload.
//! - [`TraceId`]: request correlation identifier.
//! - Entity identifiers such as [`ProductId`] and [`OrderId`].
//! - One service per bounded area (auth, account, catalog, promotions,
//!   shopping, orders, wallet, banners, dashboard).

pub mod address;
pub mod banner;
pub mod cart;
pub mod catalog;
pub mod error;
mod ids;
pub mod listing;
pub mod order;
pub mod ports;
pub mod pricing;
pub mod promotion;
pub mod report;
mod trace_id;
pub mod user;
pub mod validation;
pub mod wallet;

mod account_service;
mod auth_service;
mod banner_service;
mod catalog_service;
mod dashboard_service;
mod order_service;
mod promotion_service;
mod shopping_service;
mod wallet_service;

#[cfg(test)]
pub(crate) mod fixtures;

pub use self::account_service::{AccountService, ProfileUpdate};
pub use self::auth_service::{
    AdminSession, AuthPorts, AuthService, GoogleProfile, IssuedTokens, OtpVerification,
    SignUpRequest, UserSession,
};
pub use self::banner_service::BannerService;
pub use self::catalog_service::{CatalogService, ProductPage};
pub use self::dashboard_service::DashboardService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{
    AddressId, AdminId, BannerId, BrandId, CartItemId, CategoryId, CouponId, OfferId, OrderId,
    OrderItemId, ProductId, ReturnId, TransactionId, UserId,
};
pub use self::order_service::{OrderPorts, OrderService, PaymentOutcome, PlacedOrder};
pub use self::promotion_service::{CategoryOfferOutcome, PromotionService};
pub use self::shopping_service::ShoppingService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::wallet_service::{TopUpOutcome, WalletService, WalletStatement};

/// Result alias used by services and handlers.
///
/// # Examples
/// ```
/// use storefront::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<()> {
///     Err(Error::not_found("missing"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
