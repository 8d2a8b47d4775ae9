//! Ports for categories, brands and products.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::Page;

use crate::domain::catalog::{Brand, CatalogQuery, Category, Product, ProductDetails};
use crate::domain::listing::ListQuery;
use crate::domain::report::ReportWindow;
use crate::domain::{BrandId, CategoryId, ProductId};

use super::PersistenceError;

/// Product categories.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Fetch by id, including soft-deleted rows.
    async fn find(&self, id: &CategoryId) -> Result<Option<Category>, PersistenceError>;

    /// Whether a non-deleted category other than `exclude` has this name,
    /// compared case-insensitively.
    async fn name_taken(
        &self,
        name: &str,
        exclude: Option<CategoryId>,
    ) -> Result<bool, PersistenceError>;

    async fn insert(&self, category: &Category) -> Result<(), PersistenceError>;

    async fn update(&self, category: &Category) -> Result<(), PersistenceError>;

    /// Non-deleted categories, newest first.
    async fn list(&self, query: &ListQuery) -> Result<Page<Category>, PersistenceError>;

    /// Every non-deleted category in name order.
    async fn list_all(&self) -> Result<Vec<Category>, PersistenceError>;

    /// Active, non-deleted categories in name order.
    async fn list_listed(&self) -> Result<Vec<Category>, PersistenceError>;
}

/// Product brands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrandRepository: Send + Sync {
    /// Fetch by id, including soft-deleted rows.
    async fn find(&self, id: &BrandId) -> Result<Option<Brand>, PersistenceError>;

    /// Whether a non-deleted brand other than `exclude` has this name,
    /// compared case-insensitively.
    async fn name_taken(
        &self,
        name: &str,
        exclude: Option<BrandId>,
    ) -> Result<bool, PersistenceError>;

    async fn insert(&self, brand: &Brand) -> Result<(), PersistenceError>;

    async fn update(&self, brand: &Brand) -> Result<(), PersistenceError>;

    /// Non-deleted brands, newest first.
    async fn list(&self, query: &ListQuery) -> Result<Page<Brand>, PersistenceError>;

    /// Every non-deleted brand in name order.
    async fn list_all(&self) -> Result<Vec<Brand>, PersistenceError>;

    /// Active, non-deleted brands in name order.
    async fn list_listed(&self) -> Result<Vec<Brand>, PersistenceError>;
}

/// Products joined with their category, brand and offer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Fetch by id, including soft-deleted rows.
    async fn find(&self, id: &ProductId) -> Result<Option<ProductDetails>, PersistenceError>;

    /// Fetch several products; missing ids are skipped.
    async fn find_many(&self, ids: &[ProductId]) -> Result<Vec<ProductDetails>, PersistenceError>;

    async fn insert(&self, product: &Product) -> Result<(), PersistenceError>;

    async fn update(&self, product: &Product) -> Result<(), PersistenceError>;

    /// Non-deleted products, newest first, searching the product name.
    async fn list_admin(
        &self,
        query: &ListQuery,
    ) -> Result<Page<ProductDetails>, PersistenceError>;

    /// Purchasable products filtered, sorted and then paged.
    async fn list_catalog(
        &self,
        query: &CatalogQuery,
    ) -> Result<Page<ProductDetails>, PersistenceError>;

    /// Purchasable products of `category_id` other than `exclude`.
    async fn related(
        &self,
        category_id: &CategoryId,
        exclude: &ProductId,
        limit: i64,
    ) -> Result<Vec<ProductDetails>, PersistenceError>;

    /// Non-deleted products of a category.
    async fn list_by_category(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<ProductDetails>, PersistenceError>;

    /// Non-deleted products whose offer is running at `now`.
    async fn list_with_active_offer(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ProductDetails>, PersistenceError>;

    /// Non-deleted products created inside `window`.
    async fn count_created(&self, window: &ReportWindow) -> Result<i64, PersistenceError>;
}
