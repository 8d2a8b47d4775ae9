//! Ports for offers and coupons.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::promotion::{Coupon, CouponStatus, CouponWithUsage, Offer, OfferKind};
use crate::domain::{CategoryId, CouponId, OfferId, ProductId, UserId};

use super::PersistenceError;

/// New offer price for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedProduct {
    pub product_id: ProductId,
    pub offer_price: i64,
}

/// Percentage offers and their attachments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OfferRepository: Send + Sync {
    async fn insert(&self, offer: &Offer) -> Result<(), PersistenceError>;

    async fn find(&self, id: &OfferId) -> Result<Option<Offer>, PersistenceError>;

    /// Newest first. With `kind`, only offers of that kind not yet expired at
    /// `now`.
    async fn list(
        &self,
        kind: Option<OfferKind>,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<Offer>, PersistenceError>;

    /// Detach the offer from every product and category, then delete it.
    /// Returns whether the offer existed.
    async fn delete(&self, id: &OfferId) -> Result<bool, PersistenceError>;

    /// Point a product at `offer_id` with a precomputed price.
    async fn attach_to_product(
        &self,
        offer_id: &OfferId,
        priced: PricedProduct,
    ) -> Result<(), PersistenceError>;

    /// Point a category and the listed products at `offer_id` in one
    /// transaction.
    async fn attach_to_category(
        &self,
        offer_id: &OfferId,
        category_id: &CategoryId,
        products: &[PricedProduct],
    ) -> Result<(), PersistenceError>;
}

/// Coupon codes and their redemptions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Fails with `Duplicate` when the code exists.
    async fn insert(&self, coupon: &Coupon) -> Result<(), PersistenceError>;

    async fn find(&self, id: &CouponId) -> Result<Option<Coupon>, PersistenceError>;

    /// Look up by upper-cased code.
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, PersistenceError>;

    /// Newest first with total redemptions.
    async fn list(&self, page: PageRequest) -> Result<Page<CouponWithUsage>, PersistenceError>;

    /// Returns the updated coupon, or `None` when it does not exist.
    async fn set_status(
        &self,
        id: &CouponId,
        status: CouponStatus,
    ) -> Result<Option<Coupon>, PersistenceError>;

    /// Returns whether the coupon existed.
    async fn delete(&self, id: &CouponId) -> Result<bool, PersistenceError>;

    /// How often `user_id` has redeemed `coupon_id`.
    async fn usage_count(
        &self,
        coupon_id: &CouponId,
        user_id: &UserId,
    ) -> Result<i64, PersistenceError>;

    /// Active, unexpired coupons the user has redeemed fewer times than
    /// allowed.
    async fn available_for(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Coupon>, PersistenceError>;
}
