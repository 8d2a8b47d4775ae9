//! Rows for coupons, carts, wishlists, wallets and banners.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::banner::Banner;
use crate::domain::cart::{CartLine, WishlistEntry};
use crate::domain::ports::PersistenceError;
use crate::domain::promotion::{Coupon, CouponStatus};
use crate::domain::wallet::{TransactionKind, TransactionStatus, Wallet, WalletTransaction};
use crate::domain::{BannerId, CartItemId, CouponId, ProductId, TransactionId, UserId};

use super::super::diesel_error_mapping::parse_column;
use super::super::schema::{
    banners, cart_items, carts, coupon_usages, coupons, wallet_transactions, wallets,
    wishlist_items,
};

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = coupons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CouponRow {
    pub id: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub discount: i32,
    pub max_discount_amount: i64,
    pub min_purchase_amount: i64,
    pub expiration_date: DateTime<Utc>,
    pub usage_limit_per_user: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = PersistenceError;

    fn try_from(row: CouponRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CouponId::from_uuid(row.id),
            status: parse_column::<CouponStatus>("coupons.status", &row.status)?,
            code: row.code,
            description: row.description,
            discount: row.discount,
            max_discount_amount: row.max_discount_amount,
            min_purchase_amount: row.min_purchase_amount,
            expiration_date: row.expiration_date,
            usage_limit_per_user: row.usage_limit_per_user,
            created_at: row.created_at,
        })
    }
}

impl From<&Coupon> for CouponRow {
    fn from(coupon: &Coupon) -> Self {
        Self {
            id: *coupon.id.as_uuid(),
            code: coupon.code.clone(),
            description: coupon.description.clone(),
            discount: coupon.discount,
            max_discount_amount: coupon.max_discount_amount,
            min_purchase_amount: coupon.min_purchase_amount,
            expiration_date: coupon.expiration_date,
            usage_limit_per_user: coupon.usage_limit_per_user,
            status: coupon.status.as_str().to_owned(),
            created_at: coupon.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = coupon_usages)]
pub(crate) struct NewCouponUsageRow {
    pub id: Uuid,
    pub coupon_id: Uuid,
    pub user_id: Uuid,
    pub order_id: Option<Uuid>,
    pub used_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = carts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CartRow {
    pub user_id: Uuid,
    pub applied_coupon_id: Option<Uuid>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = cart_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CartItemRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub size: String,
    pub quantity: i32,
    pub position: i32,
}

impl From<CartItemRow> for CartLine {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: CartItemId::from_uuid(row.id),
            product_id: ProductId::from_uuid(row.product_id),
            size: row.size,
            quantity: row.quantity,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = wishlist_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WishlistRow {
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub added_at: DateTime<Utc>,
}

impl From<WishlistRow> for WishlistEntry {
    fn from(row: WishlistRow) -> Self {
        Self {
            product_id: ProductId::from_uuid(row.product_id),
            added_at: row.added_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = wallets)]
#[diesel(primary_key(user_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WalletRow {
    pub user_id: Uuid,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WalletRow> for Wallet {
    fn from(row: WalletRow) -> Self {
        Self {
            user_id: UserId::from_uuid(row.user_id),
            balance: row.balance,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = wallet_transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WalletTransactionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub kind: String,
    pub status: String,
    pub description: String,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn transaction_kind(value: &str) -> Result<TransactionKind, PersistenceError> {
    match value {
        "credit" => Ok(TransactionKind::Credit),
        "debit" => Ok(TransactionKind::Debit),
        other => Err(PersistenceError::query(format!(
            "unrecognised wallet_transactions.kind value {other:?}"
        ))),
    }
}

fn transaction_status(value: &str) -> Result<TransactionStatus, PersistenceError> {
    [
        TransactionStatus::Initiated,
        TransactionStatus::Pending,
        TransactionStatus::Success,
        TransactionStatus::Failed,
    ]
    .into_iter()
    .find(|status| status.as_str() == value)
    .ok_or_else(|| {
        PersistenceError::query(format!(
            "unrecognised wallet_transactions.status value {value:?}"
        ))
    })
}

impl TryFrom<WalletTransactionRow> for WalletTransaction {
    type Error = PersistenceError;

    fn try_from(row: WalletTransactionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TransactionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            amount: row.amount,
            kind: transaction_kind(&row.kind)?,
            status: transaction_status(&row.status)?,
            description: row.description,
            gateway_order_id: row.gateway_order_id,
            gateway_payment_id: row.gateway_payment_id,
            created_at: row.created_at,
        })
    }
}

impl From<&WalletTransaction> for WalletTransactionRow {
    fn from(tx: &WalletTransaction) -> Self {
        Self {
            id: *tx.id.as_uuid(),
            user_id: *tx.user_id.as_uuid(),
            amount: tx.amount,
            kind: tx.kind.as_str().to_owned(),
            status: tx.status.as_str().to_owned(),
            description: tx.description.clone(),
            gateway_order_id: tx.gateway_order_id.clone(),
            gateway_payment_id: tx.gateway_payment_id.clone(),
            created_at: tx.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = banners)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BannerRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub title: String,
    pub subtitle: String,
    pub image: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BannerRow> for Banner {
    fn from(row: BannerRow) -> Self {
        Self {
            id: BannerId::from_uuid(row.id),
            product_id: ProductId::from_uuid(row.product_id),
            title: row.title,
            subtitle: row.subtitle,
            image: row.image,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&Banner> for BannerRow {
    fn from(banner: &Banner) -> Self {
        Self {
            id: *banner.id.as_uuid(),
            product_id: *banner.product_id.as_uuid(),
            title: banner.title.clone(),
            subtitle: banner.subtitle.clone(),
            image: banner.image.clone(),
            is_active: banner.is_active,
            created_at: banner.created_at,
            updated_at: banner.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("initiated", TransactionStatus::Initiated)]
    #[case("success", TransactionStatus::Success)]
    fn transaction_status_reads_stored_names(
        #[case] stored: &str,
        #[case] expected: TransactionStatus,
    ) {
        assert_eq!(transaction_status(stored).expect("known"), expected);
    }

    #[rstest]
    fn unknown_kind_is_a_query_error() {
        assert!(matches!(
            transaction_kind("refund"),
            Err(PersistenceError::Query { .. })
        ));
    }
}
