//! Categories, brands and products.
//!
//! Catalog entities are soft-deleted: a deleted row keeps its id so order
//! history can still resolve it, but it disappears from every listing.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::promotion::OfferWindow;
use super::validation::{at_least, capitalise, field_error, http_url, image_url, min_length};
use super::{BrandId, CategoryId, Error, OfferId, ProductId};

/// Lowest regular or sale price accepted for a product.
pub const MIN_PRODUCT_PRICE: i64 = 100;

/// Product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub offer_id: Option<OfferId>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Visible on the storefront.
    pub fn is_listed(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }
}

/// Validated category form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
}

impl CategoryDraft {
    /// Capitalise the name and check both lengths.
    pub fn parse(name: &str, description: &str) -> Result<Self, Error> {
        let name = capitalise(&min_length("name", name, 3)?);
        let description = min_length("description", description, 10)?;
        Ok(Self { name, description })
    }
}

/// Product brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub description: String,
    pub logo_url: String,
    pub is_active: bool,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Brand {
    /// Visible on the storefront.
    pub fn is_listed(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }
}

/// Validated brand form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandDraft {
    pub name: String,
    pub description: String,
    pub logo_url: String,
}

impl BrandDraft {
    /// Capitalise the name and validate the logo URL.
    pub fn parse(name: &str, description: &str, logo_url: &str) -> Result<Self, Error> {
        Ok(Self {
            name: capitalise(&min_length("name", name, 2)?),
            description: min_length("description", description, 10)?,
            logo_url: http_url("logoUrl", logo_url)?,
        })
    }
}

/// Units on hand for one size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockEntry {
    pub size: String,
    pub stock: i32,
}

/// Persisted product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    pub brand_id: BrandId,
    pub regular_price: i64,
    pub sale_price: i64,
    pub offer_price: Option<i64>,
    pub offer_id: Option<OfferId>,
    pub thumbnail: String,
    pub gallery: Vec<String>,
    pub stock: Vec<StockEntry>,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Units on hand for `size`, if the size exists.
    pub fn stock_for(&self, size: &str) -> Option<i32> {
        let wanted = normalise_size(size);
        self.stock
            .iter()
            .find(|entry| entry.size == wanted)
            .map(|entry| entry.stock)
    }
}

/// Product joined with the names, visibility and offer it depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetails {
    pub product: Product,
    pub category_name: String,
    pub category_listed: bool,
    pub brand_name: String,
    pub brand_listed: bool,
    pub offer: Option<OfferWindow>,
}

impl ProductDetails {
    /// Active, not deleted, and both its category and brand are listed.
    pub fn is_purchasable(&self) -> bool {
        self.product.is_active
            && self.product.deleted_at.is_none()
            && self.category_listed
            && self.brand_listed
    }

    /// The attached offer when it is running at `now`.
    pub fn active_offer(&self, now: DateTime<Utc>) -> Option<OfferWindow> {
        self.offer.filter(|offer| offer.is_active(now))
    }

    /// The attached offer unless it has already ended.
    pub fn unexpired_offer(&self, now: DateTime<Utc>) -> Option<OfferWindow> {
        self.offer.filter(|offer| !offer.is_expired(now))
    }

    /// Unit price a customer pays at `now`.
    pub fn applicable_price(&self, now: DateTime<Utc>) -> i64 {
        match (self.active_offer(now), self.product.offer_price) {
            (Some(_), Some(offer_price)) => offer_price,
            _ => self.product.sale_price,
        }
    }
}

/// Product as exposed over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    pub category_name: String,
    pub brand_id: BrandId,
    pub brand_name: String,
    pub regular_price: i64,
    pub sale_price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_discount: Option<i32>,
    pub effective_price: i64,
    pub thumbnail: String,
    pub gallery: Vec<String>,
    pub stock: Vec<StockEntry>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductView {
    /// Render `details` with prices as of `now`.
    pub fn new(details: &ProductDetails, now: DateTime<Utc>) -> Self {
        let product = &details.product;
        let active = details.active_offer(now);
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            category_id: product.category_id,
            category_name: details.category_name.clone(),
            brand_id: product.brand_id,
            brand_name: details.brand_name.clone(),
            regular_price: product.regular_price,
            sale_price: product.sale_price,
            offer_price: active.and(product.offer_price),
            offer_discount: active.map(|offer| offer.discount),
            effective_price: details.applicable_price(now),
            thumbnail: product.thumbnail.clone(),
            gallery: product.gallery.clone(),
            stock: product.stock.clone(),
            is_active: product.is_active,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Raw product form.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    pub brand_id: BrandId,
    pub regular_price: i64,
    pub sale_price: i64,
    pub thumbnail: String,
    pub gallery: Vec<String>,
    pub stock: Vec<StockEntry>,
}

/// Validated product form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    pub brand_id: BrandId,
    pub regular_price: i64,
    pub sale_price: i64,
    pub thumbnail: String,
    pub gallery: Vec<String>,
    pub stock: Vec<StockEntry>,
}

impl ProductDraft {
    /// Validate prices, images and stock.
    pub fn parse(input: ProductInput) -> Result<Self, Error> {
        let name = capitalise(&min_length("name", &input.name, 3)?);
        let description = min_length("description", &input.description, 10)?;
        let regular_price = at_least("regularPrice", input.regular_price, MIN_PRODUCT_PRICE)?;
        let sale_price = at_least("salePrice", input.sale_price, MIN_PRODUCT_PRICE)?;
        if sale_price > regular_price {
            return Err(field_error(
                "salePrice",
                "above_regular_price",
                "salePrice cannot exceed regularPrice",
            ));
        }
        let thumbnail = image_url("thumbnail", &input.thumbnail)?;
        let gallery = input
            .gallery
            .iter()
            .map(|url| image_url("gallery", url))
            .collect::<Result<Vec<_>, _>>()?;
        let stock = parse_stock(input.stock)?;
        Ok(Self {
            name,
            description,
            category_id: input.category_id,
            brand_id: input.brand_id,
            regular_price,
            sale_price,
            thumbnail,
            gallery,
            stock,
        })
    }
}

/// Canonical form of a size label: trimmed and upper-cased.
pub fn normalise_size(size: &str) -> String {
    size.trim().to_uppercase()
}

fn parse_stock(entries: Vec<StockEntry>) -> Result<Vec<StockEntry>, Error> {
    if entries.is_empty() {
        return Err(field_error(
            "stock",
            "missing_field",
            "at least one size with stock is required",
        ));
    }
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .map(|entry| {
            let size = normalise_size(&entry.size);
            if size.is_empty() {
                return Err(field_error("stock", "missing_size", "every stock entry needs a size"));
            }
            if entry.stock < 0 {
                return Err(field_error("stock", "negative_stock", "stock cannot be negative"));
            }
            if !seen.insert(size.clone()) {
                return Err(field_error(
                    "stock",
                    "duplicate_size",
                    format!("size {size} is listed twice"),
                ));
            }
            Ok(StockEntry {
                size,
                stock: entry.stock,
            })
        })
        .collect()
}

/// Sort orders offered by the public catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CatalogSort {
    /// `aA-zZ`
    NameAsc,
    /// `zZ-aA`
    NameDesc,
    /// `Price: Low to High`
    PriceAsc,
    /// `Price: High to Low`
    PriceDesc,
    /// `Newest`
    Newest,
    /// Default: oldest first.
    #[default]
    Oldest,
}

impl CatalogSort {
    /// Parse the storefront's sort labels; unknown labels fall back to the
    /// default order.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some("aA-zZ") => Self::NameAsc,
            Some("zZ-aA") => Self::NameDesc,
            Some("Price: Low to High") => Self::PriceAsc,
            Some("Price: High to Low") => Self::PriceDesc,
            Some("Newest") => Self::Newest,
            _ => Self::Oldest,
        }
    }
}

/// Public catalog filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub brand_ids: Vec<BrandId>,
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub sort: CatalogSort,
    pub page: pagination::PageRequest,
}
