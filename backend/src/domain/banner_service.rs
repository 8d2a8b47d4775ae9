//! Home page banners.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use pagination::{Page, PageRequest};

use super::banner::{Banner, BannerDraft, BannerView};
use super::catalog::{ProductDetails, ProductView};
use super::ports::{BannerRepository, ProductRepository};
use super::{BannerId, Error, ProductId};

/// Banner administration and the public banner strip.
#[derive(Clone)]
pub struct BannerService {
    banners: Arc<dyn BannerRepository>,
    products: Arc<dyn ProductRepository>,
    clock: Arc<dyn Clock>,
}

impl BannerService {
    pub fn new(
        banners: Arc<dyn BannerRepository>,
        products: Arc<dyn ProductRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            banners,
            products,
            clock,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    async fn parse(
        &self,
        product_id: ProductId,
        title: &str,
        subtitle: &str,
        image: &str,
    ) -> Result<BannerDraft, Error> {
        let draft = BannerDraft::parse(product_id, title, subtitle, image)?;
        self.products
            .find(&product_id)
            .await?
            .filter(|details| details.product.deleted_at.is_none())
            .ok_or_else(|| Error::not_found("product not found"))?;
        Ok(draft)
    }

    async fn existing(&self, id: BannerId) -> Result<Banner, Error> {
        self.banners
            .find(&id)
            .await?
            .ok_or_else(|| Error::not_found("banner not found"))
    }

    pub async fn create(
        &self,
        product_id: ProductId,
        title: &str,
        subtitle: &str,
        image: &str,
    ) -> Result<Banner, Error> {
        let draft = self.parse(product_id, title, subtitle, image).await?;
        let now = self.now();
        let banner = Banner {
            id: BannerId::random(),
            product_id: draft.product_id,
            title: draft.title,
            subtitle: draft.subtitle,
            image: draft.image,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.banners.insert(&banner).await?;
        Ok(banner)
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<Banner>, Error> {
        Ok(self.banners.list(page).await?)
    }

    pub async fn update(
        &self,
        id: BannerId,
        product_id: ProductId,
        title: &str,
        subtitle: &str,
        image: &str,
    ) -> Result<Banner, Error> {
        let mut banner = self.existing(id).await?;
        let draft = self.parse(product_id, title, subtitle, image).await?;
        banner.product_id = draft.product_id;
        banner.title = draft.title;
        banner.subtitle = draft.subtitle;
        banner.image = draft.image;
        banner.updated_at = self.now();
        self.banners.update(&banner).await?;
        Ok(banner)
    }

    pub async fn set_active(&self, id: BannerId, active: bool) -> Result<Banner, Error> {
        let mut banner = self.existing(id).await?;
        banner.is_active = active;
        banner.updated_at = self.now();
        self.banners.update(&banner).await?;
        Ok(banner)
    }

    pub async fn delete(&self, id: BannerId) -> Result<(), Error> {
        if !self.banners.delete(&id).await? {
            return Err(Error::not_found("banner not found"));
        }
        Ok(())
    }

    /// Active banners whose product can currently be bought.
    pub async fn public_banners(&self) -> Result<Vec<BannerView>, Error> {
        let banners = self.banners.list_active().await?;
        let ids: Vec<ProductId> = banners.iter().map(|banner| banner.product_id).collect();
        let products: HashMap<ProductId, ProductDetails> = self
            .products
            .find_many(&ids)
            .await?
            .into_iter()
            .filter(ProductDetails::is_purchasable)
            .map(|details| (details.product.id, details))
            .collect();
        let now = self.now();
        Ok(banners
            .into_iter()
            .filter_map(|banner| {
                let product = products.get(&banner.product_id)?;
                Some(BannerView {
                    product: ProductView::new(product, now),
                    banner,
                })
            })
            .collect())
    }

    /// Products with a running offer, for picking a banner target.
    pub async fn offer_products(&self) -> Result<Vec<ProductView>, Error> {
        let now = self.now();
        Ok(self
            .products
            .list_with_active_offer(now)
            .await?
            .iter()
            .map(|details| ProductView::new(details, now))
            .collect())
    }
}

#[cfg(test)]
#[path = "banner_service_tests.rs"]
mod tests;
