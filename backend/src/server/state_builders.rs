//! Builders wiring outbound adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};
use url::Url;

use storefront::config::StorefrontSettings;
use storefront::domain::ports::{Mailer, PaymentGateway};
use storefront::inbound::http::state::{HttpState, HttpStatePorts};
use storefront::outbound::mail::{HttpMailer, LoggingMailer};
use storefront::outbound::payment::{
    DEFAULT_RAZORPAY_BASE_URL, RazorpayGateway, UnconfiguredGateway,
};
use storefront::outbound::persistence::{
    DbPool, DieselAddressRepository, DieselAdminRepository, DieselBannerRepository,
    DieselBrandRepository, DieselCartRepository, DieselCategoryRepository, DieselCouponRepository,
    DieselOfferRepository, DieselOrderRepository, DieselOtpRepository, DieselProductRepository,
    DieselUserRepository, DieselWalletRepository, DieselWishlistRepository,
};
use storefront::outbound::security::{Argon2PasswordHasher, JwtTokenService};

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

/// Mail adapter: the HTTP API when configured, otherwise a logging stand-in.
fn build_mailer(settings: &StorefrontSettings) -> std::io::Result<Arc<dyn Mailer>> {
    match settings
        .mail_api()
        .map_err(|err| startup_error("mail settings", err))?
    {
        Some(config) => {
            let mailer = HttpMailer::new(config, settings.upstream_timeout())
                .map_err(|err| startup_error("mail client", err))?;
            Ok(Arc::new(mailer))
        }
        None => {
            warn!("mail API not configured; OTP mails are only logged");
            Ok(Arc::new(LoggingMailer))
        }
    }
}

/// Payment adapter: Razorpay when credentials are set, otherwise a gateway
/// that reports itself unavailable.
fn build_gateway(settings: &StorefrontSettings) -> std::io::Result<Arc<dyn PaymentGateway>> {
    let Some(credentials) = settings.razorpay_credentials() else {
        warn!("payment gateway not configured; online payments are unavailable");
        return Ok(Arc::new(UnconfiguredGateway));
    };
    let base_url = match settings
        .razorpay_base_url()
        .map_err(|err| startup_error("gateway settings", err))?
    {
        Some(url) => url,
        None => Url::parse(DEFAULT_RAZORPAY_BASE_URL)
            .map_err(|err| startup_error("gateway base URL", err))?,
    };
    let gateway = RazorpayGateway::new(base_url, credentials, settings.upstream_timeout())
        .map_err(|err| startup_error("gateway client", err))?;
    info!("payment gateway configured");
    Ok(Arc::new(gateway))
}

/// Assemble every port from the pool and the configured adapters.
fn build_http_ports(
    pool: &DbPool,
    settings: &StorefrontSettings,
) -> std::io::Result<HttpStatePorts> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let secrets = settings
        .token_secrets()
        .map_err(|err| startup_error("token settings", err))?;
    let ttls = settings
        .token_ttls()
        .map_err(|err| startup_error("token settings", err))?;
    let otp_ttl = settings
        .otp_ttl()
        .map_err(|err| startup_error("otp settings", err))?;

    Ok(HttpStatePorts {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        admins: Arc::new(DieselAdminRepository::new(pool.clone())),
        otps: Arc::new(DieselOtpRepository::new(pool.clone())),
        addresses: Arc::new(DieselAddressRepository::new(pool.clone())),
        categories: Arc::new(DieselCategoryRepository::new(pool.clone())),
        brands: Arc::new(DieselBrandRepository::new(pool.clone())),
        products: Arc::new(DieselProductRepository::new(pool.clone())),
        offers: Arc::new(DieselOfferRepository::new(pool.clone())),
        coupons: Arc::new(DieselCouponRepository::new(pool.clone())),
        carts: Arc::new(DieselCartRepository::new(pool.clone())),
        wishlist: Arc::new(DieselWishlistRepository::new(pool.clone())),
        orders: Arc::new(DieselOrderRepository::new(pool.clone())),
        wallets: Arc::new(DieselWalletRepository::new(pool.clone())),
        banners: Arc::new(DieselBannerRepository::new(pool.clone())),
        mailer: build_mailer(settings)?,
        hasher: Arc::new(Argon2PasswordHasher::default()),
        tokens: Arc::new(JwtTokenService::new(&secrets, ttls, clock.clone())),
        gateway: build_gateway(settings)?,
        clock,
        otp_ttl,
    })
}

/// Build the shared handler state over `pool`.
///
/// # Errors
/// Returns [`std::io::Error`] when a secret is missing or an adapter client
/// cannot be constructed.
pub fn build_http_state(
    pool: &DbPool,
    settings: &StorefrontSettings,
) -> std::io::Result<web::Data<HttpState>> {
    let ports = build_http_ports(pool, settings)?;
    Ok(web::Data::new(HttpState::new(ports)))
}
