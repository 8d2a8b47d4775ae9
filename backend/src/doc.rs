//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] gathers every HTTP endpoint from the inbound layer, the domain
//! types they exchange and the bearer token scheme used by the customer and
//! admin routes. The document backs Swagger UI in debug builds and is
//! exported by `cargo run --bin openapi-dump`.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::cart::{CartSummary, CartView, WishlistItemView};
use crate::domain::catalog::{Brand, Category, ProductView};
use crate::domain::order::{CustomerOrder, Order, ReturnRequest, ReturnView};
use crate::domain::promotion::{Coupon, CouponWithUsage, Offer};
use crate::domain::report::{DashboardSummary, SalesReport};
use crate::domain::user::{AdminProfile, UserProfile};
use crate::domain::wallet::{Wallet, WalletTransaction};
use crate::domain::{Error, ErrorCode, PlacedOrder};
use crate::inbound::http::schemas::{AccessTokenResponse, MessageResponse};
use crate::inbound::http::user_auth::ResetTokenResponse;

/// Name of the bearer scheme referenced by protected operations.
pub const BEARER_SCHEME: &str = "bearerAuth";

/// Register the access-token bearer scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let mut scheme = Http::new(HttpAuthScheme::Bearer);
        scheme.bearer_format = Some("JWT".to_owned());
        scheme.description = Some(
            "Access token from a user or admin login. Refresh tokens travel in the \
             jwtUser and jwtAdmin cookies instead."
                .to_owned(),
        );
        components.add_security_scheme(BEARER_SCHEME, SecurityScheme::Http(scheme));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Storefront API",
        description = "Catalog, cart, coupons, offers, orders, wallet and returns for a fashion storefront.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("bearerAuth" = [])),
    paths(
        crate::inbound::http::user_auth::sign_up,
        crate::inbound::http::user_auth::resend_otp,
        crate::inbound::http::user_auth::verify_otp,
        crate::inbound::http::user_auth::login,
        crate::inbound::http::user_auth::google_sign_in,
        crate::inbound::http::user_auth::refresh_token,
        crate::inbound::http::user_auth::reset_password,
        crate::inbound::http::user_auth::logout,
        crate::inbound::http::admin_auth::admin_login,
        crate::inbound::http::admin_auth::admin_refresh_token,
        crate::inbound::http::admin_auth::admin_logout,
        crate::inbound::http::profile::get_profile,
        crate::inbound::http::profile::update_profile,
        crate::inbound::http::profile::list_addresses,
        crate::inbound::http::profile::get_address,
        crate::inbound::http::profile::create_address,
        crate::inbound::http::profile::update_address,
        crate::inbound::http::profile::make_default_address,
        crate::inbound::http::profile::delete_address,
        crate::inbound::http::categories::create_category,
        crate::inbound::http::categories::list_categories,
        crate::inbound::http::categories::all_categories,
        crate::inbound::http::categories::update_category,
        crate::inbound::http::categories::set_category_active,
        crate::inbound::http::categories::delete_category,
        crate::inbound::http::brands::create_brand,
        crate::inbound::http::brands::list_brands,
        crate::inbound::http::brands::all_brands,
        crate::inbound::http::brands::update_brand,
        crate::inbound::http::brands::set_brand_active,
        crate::inbound::http::brands::delete_brand,
        crate::inbound::http::products::create_product,
        crate::inbound::http::products::list_products,
        crate::inbound::http::products::get_product,
        crate::inbound::http::products::update_product,
        crate::inbound::http::products::set_product_active,
        crate::inbound::http::products::delete_product,
        crate::inbound::http::storefront::browse_products,
        crate::inbound::http::storefront::product_details,
        crate::inbound::http::storefront::listed_brands,
        crate::inbound::http::storefront::listed_categories,
        crate::inbound::http::storefront::public_banners,
        crate::inbound::http::offers::create_offer,
        crate::inbound::http::offers::list_offers,
        crate::inbound::http::offers::delete_offer,
        crate::inbound::http::offers::apply_to_product,
        crate::inbound::http::offers::apply_to_category,
        crate::inbound::http::coupons::list_coupons,
        crate::inbound::http::coupons::create_coupon,
        crate::inbound::http::coupons::set_coupon_status,
        crate::inbound::http::coupons::delete_coupon,
        crate::inbound::http::coupons::available_coupons,
        crate::inbound::http::coupons::apply_coupon,
        crate::inbound::http::coupons::remove_applied_coupon,
        crate::inbound::http::cart::get_cart,
        crate::inbound::http::cart::add_to_cart,
        crate::inbound::http::cart::update_cart_item,
        crate::inbound::http::cart::remove_cart_item,
        crate::inbound::http::cart::clear_cart,
        crate::inbound::http::wishlist::get_wishlist,
        crate::inbound::http::wishlist::add_to_wishlist,
        crate::inbound::http::wishlist::remove_from_wishlist,
        crate::inbound::http::wishlist::move_to_bag,
        crate::inbound::http::orders::place_order,
        crate::inbound::http::orders::verify_payment,
        crate::inbound::http::orders::list_orders,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::orders::cancel_item,
        crate::inbound::http::orders::request_return,
        crate::inbound::http::orders::admin_list_orders,
        crate::inbound::http::orders::admin_get_order,
        crate::inbound::http::orders::update_item_status,
        crate::inbound::http::returns::list_returns,
        crate::inbound::http::returns::resolve_return,
        crate::inbound::http::wallet::get_wallet,
        crate::inbound::http::wallet::create_wallet,
        crate::inbound::http::wallet::add_money,
        crate::inbound::http::wallet::verify_top_up,
        crate::inbound::http::banners::create_banner,
        crate::inbound::http::banners::list_banners,
        crate::inbound::http::banners::offer_products,
        crate::inbound::http::banners::update_banner,
        crate::inbound::http::banners::set_banner_active,
        crate::inbound::http::banners::delete_banner,
        crate::inbound::http::customers::list_customers,
        crate::inbound::http::customers::update_customer,
        crate::inbound::http::customers::set_customer_blocked,
        crate::inbound::http::customers::delete_customer,
        crate::inbound::http::dashboard::summary,
        crate::inbound::http::dashboard::bar_graph,
        crate::inbound::http::dashboard::pie_chart,
        crate::inbound::http::dashboard::sales_report,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        MessageResponse,
        AccessTokenResponse,
        ResetTokenResponse,
        UserProfile,
        AdminProfile,
        Category,
        Brand,
        ProductView,
        Offer,
        Coupon,
        CouponWithUsage,
        CartView,
        CartSummary,
        WishlistItemView,
        Order,
        PlacedOrder,
        CustomerOrder,
        ReturnRequest,
        ReturnView,
        Wallet,
        WalletTransaction,
        DashboardSummary,
        SalesReport,
    )),
    tags(
        (name = "auth", description = "Sign-up, login, token refresh and password reset"),
        (name = "profile", description = "Customer profile and address book"),
        (name = "categories", description = "Category administration"),
        (name = "brands", description = "Brand administration"),
        (name = "products", description = "Product administration"),
        (name = "storefront", description = "Public catalog browsing"),
        (name = "offers", description = "Percentage offers on products and categories"),
        (name = "coupons", description = "Coupon administration and redemption"),
        (name = "cart", description = "Shopping cart"),
        (name = "wishlist", description = "Saved products"),
        (name = "orders", description = "Checkout, payment, cancellation and fulfilment"),
        (name = "returns", description = "Return requests"),
        (name = "wallet", description = "Wallet balance, top-ups and history"),
        (name = "banners", description = "Home page banners"),
        (name = "customers", description = "Customer administration"),
        (name = "dashboard", description = "Sales dashboard and reports"),
        (name = "health", description = "Readiness and liveness probes")
    )
)]
pub struct ApiDoc;
