//! Rows for categories, brands, products, stock and offers.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::catalog::{Brand, Category, Product, StockEntry};
use crate::domain::ports::PersistenceError;
use crate::domain::promotion::{Offer, OfferKind};
use crate::domain::{BrandId, CategoryId, OfferId, ProductId};

use super::super::diesel_error_mapping::parse_column;
use super::super::schema::{brands, categories, offers, product_stock, products};

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub offer_id: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            is_active: row.is_active,
            offer_id: row.offer_id.map(OfferId::from_uuid),
            deleted_at: row.deleted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&Category> for CategoryRow {
    fn from(category: &Category) -> Self {
        Self {
            id: *category.id.as_uuid(),
            name: category.name.clone(),
            description: category.description.clone(),
            is_active: category.is_active,
            offer_id: category.offer_id.map(Uuid::from),
            deleted_at: category.deleted_at,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = brands)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct BrandRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub logo_url: String,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BrandRow> for Brand {
    fn from(row: BrandRow) -> Self {
        Self {
            id: BrandId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            logo_url: row.logo_url,
            is_active: row.is_active,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&Brand> for BrandRow {
    fn from(brand: &Brand) -> Self {
        Self {
            id: *brand.id.as_uuid(),
            name: brand.name.clone(),
            description: brand.description.clone(),
            logo_url: brand.logo_url.clone(),
            is_active: brand.is_active,
            deleted_at: brand.deleted_at,
            created_at: brand.created_at,
            updated_at: brand.updated_at,
        }
    }
}

/// Product columns; stock lives in `product_stock`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category_id: Uuid,
    pub brand_id: Uuid,
    pub regular_price: i64,
    pub sale_price: i64,
    pub offer_price: Option<i64>,
    pub offer_id: Option<Uuid>,
    pub thumbnail: String,
    pub gallery: Vec<String>,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    pub fn into_product(self, stock: Vec<StockEntry>) -> Product {
        Product {
            id: ProductId::from_uuid(self.id),
            name: self.name,
            description: self.description,
            category_id: CategoryId::from_uuid(self.category_id),
            brand_id: BrandId::from_uuid(self.brand_id),
            regular_price: self.regular_price,
            sale_price: self.sale_price,
            offer_price: self.offer_price,
            offer_id: self.offer_id.map(OfferId::from_uuid),
            thumbnail: self.thumbnail,
            gallery: self.gallery,
            stock,
            is_active: self.is_active,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: *product.id.as_uuid(),
            name: product.name.clone(),
            description: product.description.clone(),
            category_id: *product.category_id.as_uuid(),
            brand_id: *product.brand_id.as_uuid(),
            regular_price: product.regular_price,
            sale_price: product.sale_price,
            offer_price: product.offer_price,
            offer_id: product.offer_id.map(Uuid::from),
            thumbnail: product.thumbnail.clone(),
            gallery: product.gallery.clone(),
            is_active: product.is_active,
            deleted_at: product.deleted_at,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = product_stock)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StockRow {
    pub product_id: Uuid,
    pub size: String,
    pub stock: i32,
    pub position: i32,
}

impl StockRow {
    /// Rows for every entry of `product`, numbered in entry order.
    pub fn for_product(product: &Product) -> Vec<Self> {
        product
            .stock
            .iter()
            .zip(0..)
            .map(|(entry, position)| Self {
                product_id: *product.id.as_uuid(),
                size: entry.size.clone(),
                stock: entry.stock,
                position,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = offers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OfferRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub discount: i32,
    pub kind: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<OfferRow> for Offer {
    type Error = PersistenceError;

    fn try_from(row: OfferRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OfferId::from_uuid(row.id),
            kind: parse_column::<OfferKind>("offers.kind", &row.kind)?,
            title: row.title,
            description: row.description,
            discount: row.discount,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
        })
    }
}

impl From<&Offer> for OfferRow {
    fn from(offer: &Offer) -> Self {
        Self {
            id: *offer.id.as_uuid(),
            title: offer.title.clone(),
            description: offer.description.clone(),
            discount: offer.discount,
            kind: offer.kind.as_str().to_owned(),
            start_date: offer.start_date,
            end_date: offer.end_date,
            created_at: offer.created_at,
        }
    }
}
