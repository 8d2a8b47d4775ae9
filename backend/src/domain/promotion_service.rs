//! Offer scheduling and attachment, coupon administration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use pagination::{Page, PageRequest};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use super::catalog::{ProductDetails, ProductView};
use super::ports::{
    CategoryRepository, CouponRepository, OfferRepository, PricedProduct, ProductRepository,
};
use super::pricing::offer_price;
use super::promotion::{
    Coupon, CouponDraft, CouponInput, CouponStatus, CouponWithUsage, Offer, OfferDraft,
    OfferInput, OfferKind,
};
use super::{CategoryId, CouponId, Error, OfferId, ProductId, UserId};

/// Result of attaching an offer to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOfferOutcome {
    /// Products now carrying the offer.
    pub updated: usize,
    /// Products kept on an equal or better offer.
    pub skipped: usize,
}

/// Offers and coupons.
#[derive(Clone)]
pub struct PromotionService {
    offers: Arc<dyn OfferRepository>,
    coupons: Arc<dyn CouponRepository>,
    categories: Arc<dyn CategoryRepository>,
    products: Arc<dyn ProductRepository>,
    clock: Arc<dyn Clock>,
}

impl PromotionService {
    pub fn new(
        offers: Arc<dyn OfferRepository>,
        coupons: Arc<dyn CouponRepository>,
        categories: Arc<dyn CategoryRepository>,
        products: Arc<dyn ProductRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            offers,
            coupons,
            categories,
            products,
            clock,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    pub async fn create_offer(&self, input: OfferInput) -> Result<Offer, Error> {
        let now = self.now();
        let draft = OfferDraft::parse(input, now.date_naive())?;
        let offer = Offer {
            id: OfferId::random(),
            title: draft.title,
            description: draft.description,
            discount: draft.discount,
            kind: draft.kind,
            start_date: draft.start_date,
            end_date: draft.end_date,
            created_at: now,
        };
        self.offers.insert(&offer).await?;
        info!(offer_id = %offer.id, kind = offer.kind.as_str(), "offer created");
        Ok(offer)
    }

    pub async fn offers(&self, kind: Option<OfferKind>, page: PageRequest) -> Result<Page<Offer>, Error> {
        Ok(self.offers.list(kind, self.now(), page).await?)
    }

    /// Delete an offer and detach it everywhere.
    pub async fn delete_offer(&self, id: OfferId) -> Result<(), Error> {
        if !self.offers.delete(&id).await? {
            return Err(Error::not_found("offer not found"));
        }
        info!(offer_id = %id, "offer deleted");
        Ok(())
    }

    async fn applicable_offer(&self, id: OfferId, kind: OfferKind) -> Result<Offer, Error> {
        let offer = self
            .offers
            .find(&id)
            .await?
            .ok_or_else(|| Error::not_found("offer not found"))?;
        if offer.kind != kind {
            return Err(Error::invalid_request(format!(
                "offer is not a {} offer",
                kind.as_str()
            )));
        }
        if offer.is_expired(self.now()) {
            return Err(Error::invalid_request("offer has expired"));
        }
        Ok(offer)
    }

    /// Whether `details` already carries an unexpired offer at least as
    /// generous as `discount`.
    fn keeps_current_offer(&self, details: &ProductDetails, discount: i32) -> bool {
        details
            .unexpired_offer(self.now())
            .is_some_and(|current| current.discount >= discount)
    }

    pub async fn apply_offer_to_product(
        &self,
        offer_id: OfferId,
        product_id: ProductId,
    ) -> Result<ProductView, Error> {
        let offer = self.applicable_offer(offer_id, OfferKind::Product).await?;
        let mut details = self
            .products
            .find(&product_id)
            .await?
            .filter(|details| details.product.deleted_at.is_none())
            .ok_or_else(|| Error::not_found("product not found"))?;
        if self.keeps_current_offer(&details, offer.discount) {
            return Err(Error::conflict(
                "product already has an equal or better offer",
            ));
        }
        let priced = PricedProduct {
            product_id,
            offer_price: offer_price(details.product.sale_price, offer.discount),
        };
        self.offers.attach_to_product(&offer_id, priced).await?;
        info!(%offer_id, %product_id, "offer applied to product");

        details.product.offer_id = Some(offer_id);
        details.product.offer_price = Some(priced.offer_price);
        details.offer = Some(offer.window());
        Ok(ProductView::new(&details, self.now()))
    }

    /// Attach a category offer to the category and every product not already
    /// on an equal or better offer.
    pub async fn apply_offer_to_category(
        &self,
        offer_id: OfferId,
        category_id: CategoryId,
    ) -> Result<CategoryOfferOutcome, Error> {
        let offer = self.applicable_offer(offer_id, OfferKind::Category).await?;
        let category = self
            .categories
            .find(&category_id)
            .await?
            .filter(|category| category.deleted_at.is_none())
            .ok_or_else(|| Error::not_found("category not found"))?;
        if let Some(current_id) = category.offer_id
            && current_id != offer_id
            && let Some(current) = self.offers.find(&current_id).await?
            && !current.is_expired(self.now())
            && current.discount >= offer.discount
        {
            return Err(Error::conflict(
                "category already has an equal or better offer",
            ));
        }

        let products = self.products.list_by_category(&category_id).await?;
        let (kept, repriced): (Vec<_>, Vec<_>) = products
            .iter()
            .partition(|details| self.keeps_current_offer(details, offer.discount));
        let priced: Vec<PricedProduct> = repriced
            .iter()
            .map(|details| PricedProduct {
                product_id: details.product.id,
                offer_price: offer_price(details.product.sale_price, offer.discount),
            })
            .collect();
        self.offers
            .attach_to_category(&offer_id, &category_id, &priced)
            .await?;
        let outcome = CategoryOfferOutcome {
            updated: priced.len(),
            skipped: kept.len(),
        };
        info!(
            %offer_id,
            %category_id,
            updated = outcome.updated,
            skipped = outcome.skipped,
            "offer applied to category"
        );
        Ok(outcome)
    }

    // Coupons

    pub async fn coupons(&self, page: PageRequest) -> Result<Page<CouponWithUsage>, Error> {
        Ok(self.coupons.list(page).await?)
    }

    pub async fn create_coupon(&self, input: CouponInput) -> Result<Coupon, Error> {
        let now = self.now();
        let draft = CouponDraft::parse(input, now.date_naive())?;
        if self.coupons.find_by_code(&draft.code).await?.is_some() {
            return Err(Error::conflict("coupon code already exists"));
        }
        let coupon = Coupon {
            id: CouponId::random(),
            code: draft.code,
            description: draft.description,
            discount: draft.discount,
            max_discount_amount: draft.max_discount_amount,
            min_purchase_amount: draft.min_purchase_amount,
            expiration_date: draft.expiration_date,
            usage_limit_per_user: draft.usage_limit_per_user,
            status: CouponStatus::Active,
            created_at: now,
        };
        self.coupons.insert(&coupon).await?;
        info!(coupon_id = %coupon.id, code = %coupon.code, "coupon created");
        Ok(coupon)
    }

    pub async fn set_coupon_status(&self, id: CouponId, status: CouponStatus) -> Result<Coupon, Error> {
        self.coupons
            .set_status(&id, status)
            .await?
            .ok_or_else(|| Error::not_found("coupon not found"))
    }

    pub async fn delete_coupon(&self, id: CouponId) -> Result<(), Error> {
        if !self.coupons.delete(&id).await? {
            return Err(Error::not_found("coupon not found"));
        }
        Ok(())
    }

    /// Coupons `user_id` can still redeem.
    pub async fn available_coupons(&self, user_id: UserId) -> Result<Vec<Coupon>, Error> {
        Ok(self.coupons.available_for(&user_id, self.now()).await?)
    }
}

#[cfg(test)]
#[path = "promotion_service_tests.rs"]
mod tests;
