//! Category, brand and product administration plus the public catalog.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use pagination::Page;
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use super::catalog::{
    Brand, BrandDraft, CatalogQuery, Category, CategoryDraft, Product, ProductDetails,
    ProductDraft, ProductInput, ProductView,
};
use super::listing::ListQuery;
use super::ports::{BrandRepository, CategoryRepository, OfferRepository, ProductRepository};
use super::pricing::offer_price;
use super::promotion::OfferWindow;
use super::{BrandId, CategoryId, Error, OfferId, ProductId};

/// Related products shown next to a product page.
const RELATED_LIMIT: i64 = 5;

/// Public product page: the product and a few siblings from its category.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub product: ProductView,
    pub related: Vec<ProductView>,
}

/// Catalog administration and browsing.
#[derive(Clone)]
pub struct CatalogService {
    categories: Arc<dyn CategoryRepository>,
    brands: Arc<dyn BrandRepository>,
    products: Arc<dyn ProductRepository>,
    offers: Arc<dyn OfferRepository>,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        brands: Arc<dyn BrandRepository>,
        products: Arc<dyn ProductRepository>,
        offers: Arc<dyn OfferRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            categories,
            brands,
            products,
            offers,
            clock,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    async fn live_category(&self, id: CategoryId) -> Result<Category, Error> {
        self.categories
            .find(&id)
            .await?
            .filter(|category| category.deleted_at.is_none())
            .ok_or_else(|| Error::not_found("category not found"))
    }

    async fn live_brand(&self, id: BrandId) -> Result<Brand, Error> {
        self.brands
            .find(&id)
            .await?
            .filter(|brand| brand.deleted_at.is_none())
            .ok_or_else(|| Error::not_found("brand not found"))
    }

    async fn live_product(&self, id: ProductId) -> Result<ProductDetails, Error> {
        self.products
            .find(&id)
            .await?
            .filter(|details| details.product.deleted_at.is_none())
            .ok_or_else(|| Error::not_found("product not found"))
    }

    /// The offer `id` when it exists and has not ended.
    async fn unexpired_offer(&self, id: Option<OfferId>) -> Result<Option<OfferWindow>, Error> {
        let Some(id) = id else {
            return Ok(None);
        };
        let now = self.now();
        Ok(self
            .offers
            .find(&id)
            .await?
            .map(|offer| offer.window())
            .filter(|window| !window.is_expired(now)))
    }

    // Categories

    pub async fn create_category(&self, name: &str, description: &str) -> Result<Category, Error> {
        let draft = CategoryDraft::parse(name, description)?;
        if self.categories.name_taken(&draft.name, None).await? {
            return Err(Error::conflict("category already exists"));
        }
        let now = self.now();
        let category = Category {
            id: CategoryId::random(),
            name: draft.name,
            description: draft.description,
            is_active: true,
            offer_id: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.categories.insert(&category).await?;
        info!(category_id = %category.id, "category created");
        Ok(category)
    }

    pub async fn categories(&self, query: &ListQuery) -> Result<Page<Category>, Error> {
        Ok(self.categories.list(query).await?)
    }

    pub async fn all_categories(&self) -> Result<Vec<Category>, Error> {
        Ok(self.categories.list_all().await?)
    }

    pub async fn update_category(
        &self,
        id: CategoryId,
        name: &str,
        description: &str,
    ) -> Result<Category, Error> {
        let draft = CategoryDraft::parse(name, description)?;
        let mut category = self.live_category(id).await?;
        if self.categories.name_taken(&draft.name, Some(id)).await? {
            return Err(Error::conflict("category already exists"));
        }
        category.name = draft.name;
        category.description = draft.description;
        category.updated_at = self.now();
        self.categories.update(&category).await?;
        Ok(category)
    }

    pub async fn set_category_active(&self, id: CategoryId, active: bool) -> Result<Category, Error> {
        let mut category = self.live_category(id).await?;
        category.is_active = active;
        category.updated_at = self.now();
        self.categories.update(&category).await?;
        Ok(category)
    }

    /// Soft delete; the category also stops being listed.
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), Error> {
        let mut category = self.live_category(id).await?;
        let now = self.now();
        category.is_active = false;
        category.deleted_at = Some(now);
        category.updated_at = now;
        self.categories.update(&category).await?;
        info!(category_id = %id, "category deleted");
        Ok(())
    }

    // Brands

    pub async fn create_brand(
        &self,
        name: &str,
        description: &str,
        logo_url: &str,
    ) -> Result<Brand, Error> {
        let draft = BrandDraft::parse(name, description, logo_url)?;
        if self.brands.name_taken(&draft.name, None).await? {
            return Err(Error::conflict("brand already exists"));
        }
        let now = self.now();
        let brand = Brand {
            id: BrandId::random(),
            name: draft.name,
            description: draft.description,
            logo_url: draft.logo_url,
            is_active: true,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.brands.insert(&brand).await?;
        info!(brand_id = %brand.id, "brand created");
        Ok(brand)
    }

    pub async fn brands(&self, query: &ListQuery) -> Result<Page<Brand>, Error> {
        Ok(self.brands.list(query).await?)
    }

    pub async fn all_brands(&self) -> Result<Vec<Brand>, Error> {
        Ok(self.brands.list_all().await?)
    }

    pub async fn update_brand(
        &self,
        id: BrandId,
        name: &str,
        description: &str,
        logo_url: &str,
    ) -> Result<Brand, Error> {
        let draft = BrandDraft::parse(name, description, logo_url)?;
        let mut brand = self.live_brand(id).await?;
        if self.brands.name_taken(&draft.name, Some(id)).await? {
            return Err(Error::conflict("brand already exists"));
        }
        brand.name = draft.name;
        brand.description = draft.description;
        brand.logo_url = draft.logo_url;
        brand.updated_at = self.now();
        self.brands.update(&brand).await?;
        Ok(brand)
    }

    pub async fn set_brand_active(&self, id: BrandId, active: bool) -> Result<Brand, Error> {
        let mut brand = self.live_brand(id).await?;
        brand.is_active = active;
        brand.updated_at = self.now();
        self.brands.update(&brand).await?;
        Ok(brand)
    }

    pub async fn delete_brand(&self, id: BrandId) -> Result<(), Error> {
        let mut brand = self.live_brand(id).await?;
        let now = self.now();
        brand.is_active = false;
        brand.deleted_at = Some(now);
        brand.updated_at = now;
        self.brands.update(&brand).await?;
        info!(brand_id = %id, "brand deleted");
        Ok(())
    }

    // Products

    /// Create a product. A product in a category with a running or upcoming
    /// offer inherits that offer.
    pub async fn create_product(&self, input: ProductInput) -> Result<ProductView, Error> {
        let draft = ProductDraft::parse(input)?;
        let category = self.live_category(draft.category_id).await?;
        let brand = self.live_brand(draft.brand_id).await?;
        let inherited = self.unexpired_offer(category.offer_id).await?;
        let now = self.now();
        let product = Product {
            id: ProductId::random(),
            name: draft.name,
            description: draft.description,
            category_id: draft.category_id,
            brand_id: draft.brand_id,
            regular_price: draft.regular_price,
            sale_price: draft.sale_price,
            offer_price: inherited.map(|offer| offer_price(draft.sale_price, offer.discount)),
            offer_id: inherited.map(|offer| offer.id),
            thumbnail: draft.thumbnail,
            gallery: draft.gallery,
            stock: draft.stock,
            is_active: true,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.products.insert(&product).await?;
        info!(product_id = %product.id, inherited_offer = inherited.is_some(), "product created");
        let details = ProductDetails {
            product,
            category_name: category.name.clone(),
            category_listed: category.is_listed(),
            brand_name: brand.name.clone(),
            brand_listed: brand.is_listed(),
            offer: inherited,
        };
        Ok(ProductView::new(&details, now))
    }

    pub async fn products(&self, query: &ListQuery) -> Result<Page<ProductView>, Error> {
        let now = self.now();
        let page = self.products.list_admin(query).await?;
        Ok(page.map(|details| ProductView::new(&details, now)))
    }

    pub async fn product(&self, id: ProductId) -> Result<ProductView, Error> {
        let details = self.live_product(id).await?;
        Ok(ProductView::new(&details, self.now()))
    }

    /// Replace a product's fields, recomputing the offer price from the new
    /// sale price. An attached offer that no longer exists is detached.
    pub async fn update_product(&self, id: ProductId, input: ProductInput) -> Result<ProductView, Error> {
        let draft = ProductDraft::parse(input)?;
        let mut details = self.live_product(id).await?;
        let category = self.live_category(draft.category_id).await?;
        let brand = self.live_brand(draft.brand_id).await?;
        let offer = match details.product.offer_id {
            Some(offer_id) => self.offers.find(&offer_id).await?.map(|offer| offer.window()),
            None => None,
        };

        let product = &mut details.product;
        product.name = draft.name;
        product.description = draft.description;
        product.category_id = draft.category_id;
        product.brand_id = draft.brand_id;
        product.regular_price = draft.regular_price;
        product.sale_price = draft.sale_price;
        product.offer_id = offer.map(|window| window.id);
        product.offer_price = offer.map(|window| offer_price(draft.sale_price, window.discount));
        product.thumbnail = draft.thumbnail;
        product.gallery = draft.gallery;
        product.stock = draft.stock;
        product.updated_at = self.now();
        self.products.update(product).await?;

        details.category_name = category.name.clone();
        details.category_listed = category.is_listed();
        details.brand_name = brand.name.clone();
        details.brand_listed = brand.is_listed();
        details.offer = offer;
        Ok(ProductView::new(&details, self.now()))
    }

    pub async fn set_product_active(&self, id: ProductId, active: bool) -> Result<ProductView, Error> {
        let mut details = self.live_product(id).await?;
        details.product.is_active = active;
        details.product.updated_at = self.now();
        self.products.update(&details.product).await?;
        Ok(ProductView::new(&details, self.now()))
    }

    pub async fn delete_product(&self, id: ProductId) -> Result<(), Error> {
        let mut details = self.live_product(id).await?;
        let now = self.now();
        details.product.is_active = false;
        details.product.deleted_at = Some(now);
        details.product.updated_at = now;
        self.products.update(&details.product).await?;
        info!(product_id = %id, "product deleted");
        Ok(())
    }

    // Storefront

    /// Purchasable products matching the filters, sorted and then paged.
    pub async fn catalog(&self, query: &CatalogQuery) -> Result<Page<ProductView>, Error> {
        let now = self.now();
        let page = self.products.list_catalog(query).await?;
        Ok(page.map(|details| ProductView::new(&details, now)))
    }

    /// A purchasable product and up to five related products.
    pub async fn product_page(&self, id: ProductId) -> Result<ProductPage, Error> {
        let details = self
            .products
            .find(&id)
            .await?
            .filter(ProductDetails::is_purchasable)
            .ok_or_else(|| Error::not_found("product not found"))?;
        let now = self.now();
        let related = self
            .products
            .related(&details.product.category_id, &id, RELATED_LIMIT)
            .await?
            .iter()
            .filter(|candidate| candidate.is_purchasable())
            .map(|candidate| ProductView::new(candidate, now))
            .collect();
        Ok(ProductPage {
            product: ProductView::new(&details, now),
            related,
        })
    }

    pub async fn listed_brands(&self) -> Result<Vec<Brand>, Error> {
        Ok(self.brands.list_listed().await?)
    }

    pub async fn listed_categories(&self) -> Result<Vec<Category>, Error> {
        Ok(self.categories.list_listed().await?)
    }
}

#[cfg(test)]
#[path = "catalog_service_tests.rs"]
mod tests;
