//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::BoxBody;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, web};
use chrono::Duration;
use mockable::Clock;

use super::api::api_scope;
use super::error::not_found;
use super::session_config::SessionSettings;
use super::state::{HttpState, HttpStatePorts};
use crate::Trace;
use crate::domain::fixtures;
use crate::domain::ports::{
    MockAddressRepository, MockAdminRepository, MockBannerRepository, MockBrandRepository,
    MockCartRepository, MockCategoryRepository, MockCouponRepository, MockMailer,
    MockOfferRepository, MockOrderRepository, MockOtpRepository, MockPasswordHasher,
    MockPaymentGateway, MockProductRepository, MockTokenService, MockUserRepository,
    MockWalletRepository, MockWishlistRepository, TokenClaims, TokenKind,
};
use crate::domain::user::{Admin, Role, User};

/// Access token accepted for the customer set up by [`MockPorts::sign_in_user`].
pub const USER_TOKEN: &str = "user-access-token";
/// Access token accepted for the admin set up by [`MockPorts::sign_in_admin`].
pub const ADMIN_TOKEN: &str = "admin-access-token";

/// `Authorization` header carrying `token`.
pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}

/// Cookie settings for plain HTTP tests.
pub fn test_session_settings() -> SessionSettings {
    SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    }
}

/// The API as the server mounts it, over `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(api_scope(&test_session_settings()))
        .default_service(web::route().to(not_found))
}

/// Cookie session with a fresh key and the `Secure` flag off for plain HTTP
/// tests.
pub fn test_session_middleware(cookie_name: &str) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(cookie_name.to_owned())
        .cookie_secure(false)
        .build()
}

/// Mocks for every port. Tests set expectations on the ones they exercise
/// and convert the rest into state untouched.
pub struct MockPorts {
    pub users: MockUserRepository,
    pub admins: MockAdminRepository,
    pub otps: MockOtpRepository,
    pub addresses: MockAddressRepository,
    pub categories: MockCategoryRepository,
    pub brands: MockBrandRepository,
    pub products: MockProductRepository,
    pub offers: MockOfferRepository,
    pub coupons: MockCouponRepository,
    pub carts: MockCartRepository,
    pub wishlist: MockWishlistRepository,
    pub orders: MockOrderRepository,
    pub wallets: MockWalletRepository,
    pub banners: MockBannerRepository,
    pub mailer: MockMailer,
    pub hasher: MockPasswordHasher,
    pub tokens: MockTokenService,
    pub gateway: MockPaymentGateway,
    pub clock: Arc<dyn Clock>,
}

impl Default for MockPorts {
    fn default() -> Self {
        Self {
            users: MockUserRepository::new(),
            admins: MockAdminRepository::new(),
            otps: MockOtpRepository::new(),
            addresses: MockAddressRepository::new(),
            categories: MockCategoryRepository::new(),
            brands: MockBrandRepository::new(),
            products: MockProductRepository::new(),
            offers: MockOfferRepository::new(),
            coupons: MockCouponRepository::new(),
            carts: MockCartRepository::new(),
            wishlist: MockWishlistRepository::new(),
            orders: MockOrderRepository::new(),
            wallets: MockWalletRepository::new(),
            banners: MockBannerRepository::new(),
            mailer: MockMailer::new(),
            hasher: MockPasswordHasher::new(),
            tokens: MockTokenService::new(),
            gateway: MockPaymentGateway::new(),
            clock: fixtures::clock(),
        }
    }
}

impl MockPorts {
    /// Accept [`USER_TOKEN`] as an access token for `user`.
    pub fn sign_in_user(&mut self, user: &User) {
        let claims = claims(*user.id.as_uuid(), &user.email, Role::User);
        self.tokens
            .expect_verify()
            .withf(|token, kind| token == USER_TOKEN && *kind == TokenKind::Access)
            .returning(move |_, _| Ok(claims.clone()));
        let user = user.clone();
        let id = user.id;
        self.users
            .expect_find_by_id()
            .withf(move |candidate| *candidate == id)
            .returning(move |_| Ok(Some(user.clone())));
    }

    /// Accept [`ADMIN_TOKEN`] as an access token for `admin`.
    pub fn sign_in_admin(&mut self, admin: &Admin) {
        let claims = claims(*admin.id.as_uuid(), &admin.email, Role::Admin);
        self.tokens
            .expect_verify()
            .withf(|token, kind| token == ADMIN_TOKEN && *kind == TokenKind::Access)
            .returning(move |_, _| Ok(claims.clone()));
        let admin = admin.clone();
        let id = admin.id;
        self.admins
            .expect_find_by_id()
            .withf(move |candidate| *candidate == id)
            .returning(move |_| Ok(Some(admin.clone())));
    }

    pub fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            users: Arc::new(self.users),
            admins: Arc::new(self.admins),
            otps: Arc::new(self.otps),
            addresses: Arc::new(self.addresses),
            categories: Arc::new(self.categories),
            brands: Arc::new(self.brands),
            products: Arc::new(self.products),
            offers: Arc::new(self.offers),
            coupons: Arc::new(self.coupons),
            carts: Arc::new(self.carts),
            wishlist: Arc::new(self.wishlist),
            orders: Arc::new(self.orders),
            wallets: Arc::new(self.wallets),
            banners: Arc::new(self.banners),
            mailer: Arc::new(self.mailer),
            hasher: Arc::new(self.hasher),
            tokens: Arc::new(self.tokens),
            gateway: Arc::new(self.gateway),
            clock: self.clock,
            otp_ttl: Duration::seconds(60),
        })
    }
}

fn claims(sub: uuid::Uuid, email: &str, role: Role) -> TokenClaims {
    let issued = fixtures::now().timestamp();
    TokenClaims {
        sub,
        email: email.to_owned(),
        role,
        kind: TokenKind::Access,
        iat: issued,
        exp: issued + 900,
    }
}
