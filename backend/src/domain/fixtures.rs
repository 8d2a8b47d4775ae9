//! Builders shared by domain and service unit tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

use super::address::AddressFields;
use super::catalog::{Product, ProductDetails, StockEntry};
use super::order::{
    ItemStatus, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, new_order_number,
};
use super::promotion::{Coupon, CouponStatus, OfferWindow};
use super::user::{Admin, User};
use super::{
    AdminId, BrandId, CategoryId, CouponId, OfferId, OrderId, OrderItemId, ProductId, UserId,
};

/// Fixed instant used as "now" in tests.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Clock frozen at [`now`].
pub struct FixtureClock(pub DateTime<Utc>);

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Shared handle to a [`FixtureClock`] at [`now`].
pub fn clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock(now()))
}

/// Listed product selling at `sale_price` with the given sizes.
pub fn product(sale_price: i64, stock: &[(&str, i32)]) -> ProductDetails {
    ProductDetails {
        product: Product {
            id: ProductId::random(),
            name: "Trail runner".into(),
            description: "Grippy shoe for wet trails".into(),
            category_id: CategoryId::random(),
            brand_id: BrandId::random(),
            regular_price: sale_price + 500,
            sale_price,
            offer_price: None,
            offer_id: None,
            thumbnail: "https://cdn.example.com/runner.png".into(),
            gallery: Vec::new(),
            stock: stock
                .iter()
                .map(|(size, stock)| StockEntry {
                    size: (*size).to_owned(),
                    stock: *stock,
                })
                .collect(),
            is_active: true,
            deleted_at: None,
            created_at: now(),
            updated_at: now(),
        },
        category_name: "Shoes".into(),
        category_listed: true,
        brand_name: "Stride".into(),
        brand_listed: true,
        offer: None,
    }
}

/// Attach a running offer to `details`.
pub fn with_offer(mut details: ProductDetails, discount: i32, offer_price: i64) -> ProductDetails {
    let window = OfferWindow {
        id: OfferId::random(),
        discount,
        start_date: now() - Duration::days(1),
        end_date: now() + Duration::days(1),
    };
    details.product.offer_id = Some(window.id);
    details.product.offer_price = Some(offer_price);
    details.offer = Some(window);
    details
}

/// Active coupon expiring in a week.
pub fn coupon(code: &str, discount: i32, max: i64, min_purchase: i64) -> Coupon {
    Coupon {
        id: CouponId::random(),
        code: code.to_owned(),
        description: None,
        discount,
        max_discount_amount: max,
        min_purchase_amount: min_purchase,
        expiration_date: now() + Duration::days(7),
        usage_limit_per_user: 1,
        status: CouponStatus::Active,
        created_at: now(),
    }
}

/// Verified customer with a password.
pub fn user(email: &str) -> User {
    User {
        id: UserId::random(),
        first_name: "Asha".into(),
        last_name: "Menon".into(),
        email: email.to_owned(),
        mobile: Some("9876543210".into()),
        password_hash: Some("hashed:Secret@123".into()),
        google_id: None,
        date_of_birth: None,
        photo_url: None,
        is_verified: true,
        is_blocked: false,
        deleted_at: None,
        created_at: now(),
        updated_at: now(),
    }
}

/// Shipping snapshot.
pub fn address_fields() -> AddressFields {
    AddressFields {
        first_name: "Asha".into(),
        last_name: "Menon".into(),
        state: "Kerala".into(),
        district: "Ernakulam".into(),
        city: "Kochi".into(),
        pincode: "682001".into(),
        landmark: None,
        mobile: "9876543210".into(),
        alternate_mobile: None,
    }
}

/// Administrator with a hashed password.
pub fn admin(email: &str) -> Admin {
    Admin {
        id: AdminId::random(),
        email: email.to_owned(),
        password_hash: "hashed:Admin@123".into(),
        created_at: now(),
    }
}

/// Single-unit order line priced at `item_total`.
pub fn order_item(status: ItemStatus, item_total: i64) -> OrderItem {
    OrderItem {
        id: OrderItemId::random(),
        product_id: ProductId::random(),
        product_name: "Trail runner".into(),
        brand_name: "Stride".into(),
        category_name: "Shoes".into(),
        thumbnail: "https://cdn.example.com/runner.png".into(),
        size: "M".into(),
        quantity: 1,
        sale_price: item_total,
        unit_price: item_total,
        applied_offer_amount: 0,
        item_total,
        status,
    }
}

/// Confirmed, unpaid order without offers or coupon.
pub fn confirmed_order(user_id: UserId, method: PaymentMethod, items: Vec<OrderItem>) -> Order {
    let id = OrderId::random();
    let total: i64 = items.iter().map(|item| item.item_total).sum();
    Order {
        id,
        order_number: new_order_number(id),
        user_id,
        shipping_address: address_fields(),
        payment_method: method,
        payment_status: PaymentStatus::Pending,
        status: OrderStatus::Confirmed,
        gateway_order_id: None,
        gateway_payment_id: None,
        total_mrp: total,
        offer_discount: 0,
        coupon_id: None,
        coupon_code: None,
        coupon_amount: 0,
        bill_amount: total,
        refunded_amount: 0,
        items,
        created_at: now(),
        updated_at: now(),
    }
}
