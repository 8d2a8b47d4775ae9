//! Assemble the HTTP app the way the server does, over in-memory stores.

use std::sync::Arc;

use actix_web::body::BoxBody;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use chrono::Duration;
use mockable::{Clock, DefaultClock};
use zeroize::Zeroizing;

use storefront::Trace;
use storefront::inbound::http::api::api_scope;
use storefront::inbound::http::error::not_found;
use storefront::inbound::http::health::{HealthState, live, ready};
use storefront::inbound::http::session_config::SessionSettings;
use storefront::inbound::http::state::{HttpState, HttpStatePorts};
use storefront::outbound::security::{
    Argon2PasswordHasher, JwtTokenService, TokenSecrets, TokenTtls,
};

use super::memory::{
    EmptyStore, MemoryAddresses, MemoryBrands, MemoryCategories, MemoryOtps, OfflineGateway,
    Stores,
};

fn secrets() -> TokenSecrets {
    TokenSecrets {
        access: Zeroizing::new("integration-access-secret".to_owned()),
        refresh: Zeroizing::new("integration-refresh-secret".to_owned()),
        reset: Zeroizing::new("integration-reset-secret".to_owned()),
    }
}

/// Handler state with real hashing and tokens over `stores`.
pub fn http_state(stores: &Stores) -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    HttpState::new(HttpStatePorts {
        users: stores.users.clone(),
        admins: stores.admins.clone(),
        otps: Arc::new(MemoryOtps::default()),
        addresses: Arc::new(MemoryAddresses::default()),
        categories: Arc::new(MemoryCategories::default()),
        brands: Arc::new(MemoryBrands::default()),
        products: Arc::new(EmptyStore),
        offers: Arc::new(EmptyStore),
        coupons: Arc::new(EmptyStore),
        carts: Arc::new(EmptyStore),
        wishlist: Arc::new(EmptyStore),
        orders: Arc::new(EmptyStore),
        wallets: Arc::new(EmptyStore),
        banners: Arc::new(EmptyStore),
        mailer: stores.mailer.clone(),
        hasher: Arc::new(Argon2PasswordHasher::default()),
        tokens: Arc::new(JwtTokenService::new(
            &secrets(),
            TokenTtls::default(),
            clock.clone(),
        )),
        gateway: Arc::new(OfflineGateway),
        clock,
        otp_ttl: Duration::seconds(60),
    })
}

/// API, probes and fallback route as mounted by the server binary.
pub fn storefront_app(
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
    let health = web::Data::new(HealthState::new());
    health.mark_ready();
    let sessions = SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    };
    App::new()
        .app_data(health)
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(api_scope(&sessions))
        .service(ready)
        .service(live)
        .default_service(web::route().to(not_found))
}
