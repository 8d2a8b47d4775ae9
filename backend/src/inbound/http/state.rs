//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only ever talk to domain
//! services, so they can be exercised against test doubles without I/O.

use std::sync::Arc;

use chrono::Duration;
use mockable::Clock;

use crate::domain::ports::{
    AddressRepository, AdminRepository, BannerRepository, BrandRepository, CartRepository,
    CategoryRepository, CouponRepository, Mailer, OfferRepository, OrderRepository, OtpRepository,
    PasswordHasher, PaymentGateway, ProductRepository, TokenService, UserRepository,
    WalletRepository, WishlistRepository,
};
use crate::domain::{
    AccountService, AuthPorts, AuthService, BannerService, CatalogService, DashboardService,
    OrderPorts, OrderService, PromotionService, ShoppingService, WalletService,
};

/// Every port implementation the services are assembled from.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub admins: Arc<dyn AdminRepository>,
    pub otps: Arc<dyn OtpRepository>,
    pub addresses: Arc<dyn AddressRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub brands: Arc<dyn BrandRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub offers: Arc<dyn OfferRepository>,
    pub coupons: Arc<dyn CouponRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub wishlist: Arc<dyn WishlistRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub wallets: Arc<dyn WalletRepository>,
    pub banners: Arc<dyn BannerRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub clock: Arc<dyn Clock>,
    pub otp_ttl: Duration,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: AuthService,
    pub accounts: AccountService,
    pub catalog: CatalogService,
    pub promotions: PromotionService,
    pub shopping: ShoppingService,
    pub orders: OrderService,
    pub wallet: WalletService,
    pub banners: BannerService,
    pub dashboard: DashboardService,
}

impl HttpState {
    /// Assemble the services from their ports.
    pub fn new(ports: HttpStatePorts) -> Self {
        let clock = ports.clock;
        Self {
            auth: AuthService::new(
                AuthPorts {
                    users: ports.users.clone(),
                    admins: ports.admins,
                    otps: ports.otps,
                    mailer: ports.mailer,
                    hasher: ports.hasher.clone(),
                    tokens: ports.tokens,
                },
                clock.clone(),
                ports.otp_ttl,
            ),
            accounts: AccountService::new(
                ports.users.clone(),
                ports.addresses.clone(),
                ports.hasher,
                clock.clone(),
            ),
            catalog: CatalogService::new(
                ports.categories.clone(),
                ports.brands,
                ports.products.clone(),
                ports.offers.clone(),
                clock.clone(),
            ),
            promotions: PromotionService::new(
                ports.offers,
                ports.coupons.clone(),
                ports.categories,
                ports.products.clone(),
                clock.clone(),
            ),
            shopping: ShoppingService::new(
                ports.carts.clone(),
                ports.wishlist,
                ports.products.clone(),
                ports.coupons.clone(),
                clock.clone(),
            ),
            orders: OrderService::new(
                OrderPorts {
                    orders: ports.orders.clone(),
                    carts: ports.carts,
                    products: ports.products.clone(),
                    coupons: ports.coupons,
                    addresses: ports.addresses,
                    wallets: ports.wallets.clone(),
                    gateway: ports.gateway.clone(),
                },
                clock.clone(),
            ),
            wallet: WalletService::new(ports.wallets, ports.gateway, clock.clone()),
            banners: BannerService::new(ports.banners, ports.products.clone(), clock.clone()),
            dashboard: DashboardService::new(ports.orders, ports.users, ports.products, clock),
        }
    }
}
