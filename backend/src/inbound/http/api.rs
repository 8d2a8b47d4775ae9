//! Route table for `/api/v1`.
//!
//! Each audience gets its own scope. The two auth scopes carry their
//! refresh-token cookie sessions; everything else authenticates with a
//! bearer access token through the [`CurrentUser`](super::auth::CurrentUser)
//! and [`CurrentAdmin`](super::auth::CurrentAdmin) extractors.
//!
//! Within a scope, fixed segments (`/categories/all`,
//! `/banners/offer-products`) are registered ahead of `{id}` routes.

use actix_web::{Scope, web};

use super::error::extractor_config;
use super::session::{ADMIN_REFRESH_COOKIE, USER_REFRESH_COOKIE, refresh_cookie_middleware};
use super::session_config::SessionSettings;
use super::{
    admin_auth, banners, brands, cart, categories, coupons, customers, dashboard, offers, orders,
    products, profile, returns, storefront, user_auth, wallet, wishlist,
};

pub const API_PREFIX: &str = "/api/v1";
pub const USER_AUTH_PATH: &str = "/api/v1/auth/user";
pub const ADMIN_AUTH_PATH: &str = "/api/v1/auth/admin";

/// Every API route, with extractor error handlers applied.
pub fn api_scope(sessions: &SessionSettings) -> Scope {
    web::scope(API_PREFIX)
        .configure(extractor_config)
        .service(
            web::scope("/auth/user")
                .wrap(refresh_cookie_middleware(
                    sessions,
                    USER_REFRESH_COOKIE,
                    USER_AUTH_PATH,
                ))
                .service(user_auth::sign_up)
                .service(user_auth::resend_otp)
                .service(user_auth::verify_otp)
                .service(user_auth::login)
                .service(user_auth::google_sign_in)
                .service(user_auth::refresh_token)
                .service(user_auth::reset_password)
                .service(user_auth::logout),
        )
        .service(
            web::scope("/auth/admin")
                .wrap(refresh_cookie_middleware(
                    sessions,
                    ADMIN_REFRESH_COOKIE,
                    ADMIN_AUTH_PATH,
                ))
                .service(admin_auth::admin_login)
                .service(admin_auth::admin_refresh_token)
                .service(admin_auth::admin_logout),
        )
        .service(public_scope())
        .service(user_scope())
        .service(admin_scope())
}

fn public_scope() -> Scope {
    web::scope("/public")
        .service(storefront::browse_products)
        .service(storefront::product_details)
        .service(storefront::listed_brands)
        .service(storefront::listed_categories)
        .service(storefront::public_banners)
}

fn user_scope() -> Scope {
    web::scope("/user")
        .service(profile::get_profile)
        .service(profile::update_profile)
        .service(profile::list_addresses)
        .service(profile::create_address)
        .service(profile::get_address)
        .service(profile::update_address)
        .service(profile::make_default_address)
        .service(profile::delete_address)
        .service(cart::get_cart)
        .service(cart::add_to_cart)
        .service(cart::update_cart_item)
        .service(cart::remove_cart_item)
        .service(cart::clear_cart)
        .service(wishlist::get_wishlist)
        .service(wishlist::add_to_wishlist)
        .service(wishlist::move_to_bag)
        .service(wishlist::remove_from_wishlist)
        .service(coupons::available_coupons)
        .service(coupons::apply_coupon)
        .service(coupons::remove_applied_coupon)
        .service(orders::place_order)
        .service(orders::list_orders)
        .service(orders::get_order)
        .service(orders::verify_payment)
        .service(orders::cancel_item)
        .service(orders::request_return)
        .service(wallet::get_wallet)
        .service(wallet::create_wallet)
        .service(wallet::add_money)
        .service(wallet::verify_top_up)
}

fn admin_scope() -> Scope {
    web::scope("/admin")
        .service(categories::create_category)
        .service(categories::list_categories)
        .service(categories::all_categories)
        .service(categories::update_category)
        .service(categories::set_category_active)
        .service(categories::delete_category)
        .service(brands::create_brand)
        .service(brands::list_brands)
        .service(brands::all_brands)
        .service(brands::update_brand)
        .service(brands::set_brand_active)
        .service(brands::delete_brand)
        .service(products::create_product)
        .service(products::list_products)
        .service(products::get_product)
        .service(products::update_product)
        .service(products::set_product_active)
        .service(products::delete_product)
        .service(offers::create_offer)
        .service(offers::list_offers)
        .service(offers::apply_to_product)
        .service(offers::apply_to_category)
        .service(offers::delete_offer)
        .service(coupons::list_coupons)
        .service(coupons::create_coupon)
        .service(coupons::set_coupon_status)
        .service(coupons::delete_coupon)
        .service(orders::admin_list_orders)
        .service(orders::admin_get_order)
        .service(orders::update_item_status)
        .service(returns::list_returns)
        .service(returns::resolve_return)
        .service(banners::create_banner)
        .service(banners::list_banners)
        .service(banners::offer_products)
        .service(banners::update_banner)
        .service(banners::set_banner_active)
        .service(banners::delete_banner)
        .service(customers::list_customers)
        .service(customers::update_customer)
        .service(customers::set_customer_blocked)
        .service(customers::delete_customer)
        .service(dashboard::summary)
        .service(dashboard::bar_graph)
        .service(dashboard::pie_chart)
        .service(dashboard::sales_report)
}
