//! Domain ports: the traits adapters implement at the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod account_repository;
mod banner_repository;
mod catalog_repository;
mod credentials;
mod mailer;
mod order_repository;
mod payment_gateway;
mod persistence_error;
mod promotion_repository;
mod shopping_repository;
mod wallet_repository;

#[cfg(test)]
pub use account_repository::{
    MockAddressRepository, MockAdminRepository, MockOtpRepository, MockUserRepository,
};
pub use account_repository::{AddressRepository, AdminRepository, OtpRepository, UserRepository};
#[cfg(test)]
pub use banner_repository::MockBannerRepository;
pub use banner_repository::BannerRepository;
#[cfg(test)]
pub use catalog_repository::{MockBrandRepository, MockCategoryRepository, MockProductRepository};
pub use catalog_repository::{BrandRepository, CategoryRepository, ProductRepository};
#[cfg(test)]
pub use credentials::{MockPasswordHasher, MockTokenService};
pub use credentials::{
    PasswordHashError, PasswordHasher, TokenClaims, TokenError, TokenKind, TokenService,
    TokenSubject,
};
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{MailMessage, Mailer, MailerError};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::OrderRepository;
#[cfg(test)]
pub use payment_gateway::MockPaymentGateway;
pub use payment_gateway::{GatewayError, GatewayOrder, PaymentGateway, PaymentProof};
pub use persistence_error::PersistenceError;
#[cfg(test)]
pub use promotion_repository::{MockCouponRepository, MockOfferRepository};
pub use promotion_repository::{CouponRepository, OfferRepository, PricedProduct};
#[cfg(test)]
pub use shopping_repository::{MockCartRepository, MockWishlistRepository};
pub use shopping_repository::{CartRepository, WishlistRepository};
#[cfg(test)]
pub use wallet_repository::MockWalletRepository;
pub use wallet_repository::WalletRepository;
