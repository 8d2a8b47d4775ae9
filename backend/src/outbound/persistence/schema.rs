//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. When a migration
//! changes the schema, regenerate with `diesel print-schema` or edit by hand.

diesel::table! {
    /// Customer accounts. Soft-deleted rows keep their email reserved.
    users (id) {
        id -> Uuid,
        first_name -> Varchar,
        last_name -> Varchar,
        email -> Varchar,
        mobile -> Nullable<Varchar>,
        password_hash -> Nullable<Varchar>,
        google_id -> Nullable<Varchar>,
        date_of_birth -> Nullable<Date>,
        photo_url -> Nullable<Varchar>,
        is_verified -> Bool,
        is_blocked -> Bool,
        deleted_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    admins (id) {
        id -> Uuid,
        email -> Varchar,
        password_hash -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Hashed one-time passwords keyed by email.
    otps (id) {
        id -> Uuid,
        email -> Varchar,
        code_hash -> Varchar,
        expires_at -> Timestamptz,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    addresses (id) {
        id -> Uuid,
        user_id -> Uuid,
        first_name -> Varchar,
        last_name -> Varchar,
        state -> Varchar,
        district -> Varchar,
        city -> Varchar,
        pincode -> Varchar,
        landmark -> Nullable<Varchar>,
        mobile -> Varchar,
        alternate_mobile -> Nullable<Varchar>,
        is_default -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Percentage offers. `kind` is `product` or `category`.
    offers (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Varchar,
        discount -> Int4,
        kind -> Varchar,
        start_date -> Timestamptz,
        end_date -> Timestamptz,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    categories (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Varchar,
        is_active -> Bool,
        offer_id -> Nullable<Uuid>,
        deleted_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    brands (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Varchar,
        logo_url -> Varchar,
        is_active -> Bool,
        deleted_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Products. Money columns hold whole rupees.
    products (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Varchar,
        category_id -> Uuid,
        brand_id -> Uuid,
        regular_price -> Int8,
        sale_price -> Int8,
        offer_price -> Nullable<Int8>,
        offer_id -> Nullable<Uuid>,
        thumbnail -> Varchar,
        gallery -> Array<Text>,
        is_active -> Bool,
        deleted_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Units on hand per product size. `position` keeps the entered order.
    product_stock (product_id, size) {
        product_id -> Uuid,
        size -> Varchar,
        stock -> Int4,
        position -> Int4,
    }
}

diesel::table! {
    coupons (id) {
        id -> Uuid,
        code -> Varchar,
        description -> Nullable<Varchar>,
        discount -> Int4,
        max_discount_amount -> Int8,
        min_purchase_amount -> Int8,
        expiration_date -> Timestamptz,
        usage_limit_per_user -> Int4,
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per redemption.
    coupon_usages (id) {
        id -> Uuid,
        coupon_id -> Uuid,
        user_id -> Uuid,
        order_id -> Nullable<Uuid>,
        used_at -> Timestamptz,
    }
}

diesel::table! {
    carts (user_id) {
        user_id -> Uuid,
        applied_coupon_id -> Nullable<Uuid>,
    }
}

diesel::table! {
    cart_items (id) {
        id -> Uuid,
        user_id -> Uuid,
        product_id -> Uuid,
        size -> Varchar,
        quantity -> Int4,
        position -> Int4,
    }
}

diesel::table! {
    wishlist_items (user_id, product_id) {
        user_id -> Uuid,
        product_id -> Uuid,
        added_at -> Timestamptz,
    }
}

diesel::table! {
    /// Orders. `shipping_address` is a JSON snapshot taken at placement.
    orders (id) {
        id -> Uuid,
        order_number -> Varchar,
        user_id -> Uuid,
        shipping_address -> Jsonb,
        payment_method -> Varchar,
        payment_status -> Varchar,
        status -> Varchar,
        gateway_order_id -> Nullable<Varchar>,
        gateway_payment_id -> Nullable<Varchar>,
        total_mrp -> Int8,
        offer_discount -> Int8,
        coupon_id -> Nullable<Uuid>,
        coupon_code -> Nullable<Varchar>,
        coupon_amount -> Int8,
        bill_amount -> Int8,
        refunded_amount -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    order_items (id) {
        id -> Uuid,
        order_id -> Uuid,
        position -> Int4,
        product_id -> Uuid,
        product_name -> Varchar,
        brand_name -> Varchar,
        category_name -> Varchar,
        thumbnail -> Varchar,
        size -> Varchar,
        quantity -> Int4,
        sale_price -> Int8,
        unit_price -> Int8,
        applied_offer_amount -> Int8,
        item_total -> Int8,
        status -> Varchar,
    }
}

diesel::table! {
    return_requests (id) {
        id -> Uuid,
        order_id -> Uuid,
        item_id -> Uuid,
        user_id -> Uuid,
        product_id -> Uuid,
        reason -> Varchar,
        remarks -> Nullable<Varchar>,
        status -> Varchar,
        resolved_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    wallets (user_id) {
        user_id -> Uuid,
        balance -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    wallet_transactions (id) {
        id -> Uuid,
        user_id -> Uuid,
        amount -> Int8,
        kind -> Varchar,
        status -> Varchar,
        description -> Varchar,
        gateway_order_id -> Nullable<Varchar>,
        gateway_payment_id -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    banners (id) {
        id -> Uuid,
        product_id -> Uuid,
        title -> Varchar,
        subtitle -> Varchar,
        image -> Varchar,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    users,
    admins,
    otps,
    addresses,
    offers,
    categories,
    brands,
    products,
    product_stock,
    coupons,
    coupon_usages,
    carts,
    cart_items,
    wishlist_items,
    orders,
    order_items,
    return_requests,
    wallets,
    wallet_transactions,
    banners,
);
