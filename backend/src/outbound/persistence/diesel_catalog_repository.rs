//! PostgreSQL adapters for categories, brands and products.
//!
//! Products are read in two steps: the product rows matching a query, then
//! their stock, category, brand and offer rows in batched lookups.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use pagination::Page;
use uuid::Uuid;

use crate::domain::catalog::{
    Brand, CatalogQuery, CatalogSort, Category, Product, ProductDetails, StockEntry,
};
use crate::domain::listing::ListQuery;
use crate::domain::ports::{
    BrandRepository, CategoryRepository, PersistenceError, ProductRepository,
};
use crate::domain::promotion::Offer;
use crate::domain::report::ReportWindow;
use crate::domain::{BrandId, CategoryId, ProductId};

use super::diesel_error_mapping::{
    contains_pattern, limit, map_diesel_error, map_pool_error, offset, total,
};
use super::models::catalog_rows::{BrandRow, CategoryRow, OfferRow, ProductRow, StockRow};
use super::pool::DbPool;
use super::schema::{brands, categories, offers, product_stock, products};

diesel::define_sql_function!(fn lower(value: Text) -> Text);

/// Diesel-backed [`CategoryRepository`].
#[derive(Clone)]
pub struct DieselCategoryRepository {
    pool: DbPool,
}

impl DieselCategoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn searched_categories(query: &ListQuery) -> categories::BoxedQuery<'static, Pg> {
    let mut filtered = categories::table
        .filter(categories::deleted_at.is_null())
        .into_boxed();
    if let Some(term) = &query.search {
        filtered = filtered.filter(categories::name.ilike(contains_pattern(term)));
    }
    filtered
}

#[async_trait]
impl CategoryRepository for DieselCategoryRepository {
    async fn find(&self, id: &CategoryId) -> Result<Option<Category>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CategoryRow> = categories::table
            .find(id.as_uuid())
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Category::from))
    }

    async fn name_taken(
        &self,
        name: &str,
        exclude: Option<CategoryId>,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut same_name = categories::table
            .filter(categories::deleted_at.is_null())
            .filter(lower(categories::name).eq(lower(name.to_owned())))
            .into_boxed();
        if let Some(excluded_id) = exclude {
            same_name = same_name.filter(categories::id.ne(Uuid::from(excluded_id)));
        }
        let count: i64 = same_name
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count > 0)
    }

    async fn insert(&self, category: &Category) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = CategoryRow::from(category);
        diesel::insert_into(categories::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, category: &Category) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = CategoryRow::from(category);
        diesel::update(categories::table.find(category.id.as_uuid()))
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(&self, query: &ListQuery) -> Result<Page<Category>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = searched_categories(query)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<CategoryRow> = searched_categories(query)
            .order((categories::created_at.desc(), categories::id))
            .limit(limit(query.page))
            .offset(offset(query.page))
            .select(CategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Page::new(
            rows.into_iter().map(Category::from).collect(),
            query.page,
            total(count),
        ))
    }

    async fn list_all(&self) -> Result<Vec<Category>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CategoryRow> = categories::table
            .filter(categories::deleted_at.is_null())
            .order(categories::name)
            .select(CategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn list_listed(&self) -> Result<Vec<Category>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CategoryRow> = categories::table
            .filter(categories::deleted_at.is_null())
            .filter(categories::is_active.eq(true))
            .order(categories::name)
            .select(CategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }
}

/// Diesel-backed [`BrandRepository`].
#[derive(Clone)]
pub struct DieselBrandRepository {
    pool: DbPool,
}

impl DieselBrandRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn searched_brands(query: &ListQuery) -> brands::BoxedQuery<'static, Pg> {
    let mut filtered = brands::table.filter(brands::deleted_at.is_null()).into_boxed();
    if let Some(term) = &query.search {
        filtered = filtered.filter(brands::name.ilike(contains_pattern(term)));
    }
    filtered
}

#[async_trait]
impl BrandRepository for DieselBrandRepository {
    async fn find(&self, id: &BrandId) -> Result<Option<Brand>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<BrandRow> = brands::table
            .find(id.as_uuid())
            .select(BrandRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Brand::from))
    }

    async fn name_taken(
        &self,
        name: &str,
        exclude: Option<BrandId>,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut same_name = brands::table
            .filter(brands::deleted_at.is_null())
            .filter(lower(brands::name).eq(lower(name.to_owned())))
            .into_boxed();
        if let Some(excluded_id) = exclude {
            same_name = same_name.filter(brands::id.ne(Uuid::from(excluded_id)));
        }
        let count: i64 = same_name
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count > 0)
    }

    async fn insert(&self, brand: &Brand) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = BrandRow::from(brand);
        diesel::insert_into(brands::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, brand: &Brand) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = BrandRow::from(brand);
        diesel::update(brands::table.find(brand.id.as_uuid()))
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(&self, query: &ListQuery) -> Result<Page<Brand>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = searched_brands(query)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<BrandRow> = searched_brands(query)
            .order((brands::created_at.desc(), brands::id))
            .limit(limit(query.page))
            .offset(offset(query.page))
            .select(BrandRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Page::new(
            rows.into_iter().map(Brand::from).collect(),
            query.page,
            total(count),
        ))
    }

    async fn list_all(&self) -> Result<Vec<Brand>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BrandRow> = brands::table
            .filter(brands::deleted_at.is_null())
            .order(brands::name)
            .select(BrandRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Brand::from).collect())
    }

    async fn list_listed(&self) -> Result<Vec<Brand>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BrandRow> = brands::table
            .filter(brands::deleted_at.is_null())
            .filter(brands::is_active.eq(true))
            .order(brands::name)
            .select(BrandRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Brand::from).collect())
    }
}

/// Diesel-backed [`ProductRepository`].
#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn live_products() -> products::BoxedQuery<'static, Pg> {
    products::table
        .filter(products::deleted_at.is_null())
        .into_boxed()
}

/// Active products whose category and brand are listed.
fn purchasable_products() -> products::BoxedQuery<'static, Pg> {
    live_products()
        .filter(products::is_active.eq(true))
        .filter(
            products::category_id.eq_any(
                categories::table
                    .filter(categories::deleted_at.is_null())
                    .filter(categories::is_active.eq(true))
                    .select(categories::id),
            ),
        )
        .filter(
            products::brand_id.eq_any(
                brands::table
                    .filter(brands::deleted_at.is_null())
                    .filter(brands::is_active.eq(true))
                    .select(brands::id),
            ),
        )
}

fn catalog_products(query: &CatalogQuery) -> products::BoxedQuery<'static, Pg> {
    let mut filtered = purchasable_products();
    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = contains_pattern(term);
        filtered = filtered.filter(
            products::name
                .ilike(pattern.clone())
                .or(products::category_id.eq_any(
                    categories::table
                        .filter(categories::name.ilike(pattern.clone()))
                        .select(categories::id),
                ))
                .or(products::brand_id.eq_any(
                    brands::table
                        .filter(brands::name.ilike(pattern))
                        .select(brands::id),
                )),
        );
    }
    if !query.brand_ids.is_empty() {
        let wanted: Vec<Uuid> = query.brand_ids.iter().copied().map(Uuid::from).collect();
        filtered = filtered.filter(products::brand_id.eq_any(wanted));
    }
    if let Some(name) = query.category.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        filtered = filtered.filter(
            products::category_id.eq_any(
                categories::table
                    .filter(lower(categories::name).eq(lower(name.to_owned())))
                    .select(categories::id),
            ),
        );
    }
    if let Some(min) = query.min_price {
        filtered = filtered.filter(products::sale_price.ge(min));
    }
    if let Some(max) = query.max_price {
        filtered = filtered.filter(products::sale_price.le(max));
    }
    filtered
}

fn sorted(
    query: products::BoxedQuery<'static, Pg>,
    sort: CatalogSort,
) -> products::BoxedQuery<'static, Pg> {
    let ordered = match sort {
        CatalogSort::NameAsc => query.order(lower(products::name).asc()),
        CatalogSort::NameDesc => query.order(lower(products::name).desc()),
        CatalogSort::PriceAsc => query.order(products::sale_price.asc()),
        CatalogSort::PriceDesc => query.order(products::sale_price.desc()),
        CatalogSort::Newest => query.order(products::created_at.desc()),
        CatalogSort::Oldest => query.order(products::created_at.asc()),
    };
    ordered.then_order_by(products::id)
}

/// Attach stock, category, brand and offer data to product rows, keeping
/// row order.
async fn hydrate(
    conn: &mut AsyncPgConnection,
    rows: Vec<ProductRow>,
) -> Result<Vec<ProductDetails>, PersistenceError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let product_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let category_ids: Vec<Uuid> = rows.iter().map(|row| row.category_id).collect();
    let brand_ids: Vec<Uuid> = rows.iter().map(|row| row.brand_id).collect();
    let offer_ids: Vec<Uuid> = rows.iter().filter_map(|row| row.offer_id).collect();

    let stock_rows: Vec<StockRow> = product_stock::table
        .filter(product_stock::product_id.eq_any(&product_ids))
        .order((product_stock::product_id, product_stock::position))
        .select(StockRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    let mut stock: HashMap<Uuid, Vec<StockEntry>> = HashMap::new();
    for row in stock_rows {
        stock.entry(row.product_id).or_default().push(StockEntry {
            size: row.size,
            stock: row.stock,
        });
    }

    let categories: HashMap<Uuid, CategoryRow> = categories::table
        .filter(categories::id.eq_any(&category_ids))
        .select(CategoryRow::as_select())
        .load::<CategoryRow>(conn)
        .await
        .map_err(map_diesel_error)?
        .into_iter()
        .map(|row| (row.id, row))
        .collect();
    let brands: HashMap<Uuid, BrandRow> = brands::table
        .filter(brands::id.eq_any(&brand_ids))
        .select(BrandRow::as_select())
        .load::<BrandRow>(conn)
        .await
        .map_err(map_diesel_error)?
        .into_iter()
        .map(|row| (row.id, row))
        .collect();
    let offers: HashMap<Uuid, Offer> = offers::table
        .filter(offers::id.eq_any(&offer_ids))
        .select(OfferRow::as_select())
        .load::<OfferRow>(conn)
        .await
        .map_err(map_diesel_error)?
        .into_iter()
        .map(|row| Offer::try_from(row).map(|offer| (*offer.id.as_uuid(), offer)))
        .collect::<Result<_, _>>()?;

    rows.into_iter()
        .map(|row| {
            let category = categories.get(&row.category_id).ok_or_else(|| {
                PersistenceError::query(format!("product {} has no category row", row.id))
            })?;
            let brand = brands.get(&row.brand_id).ok_or_else(|| {
                PersistenceError::query(format!("product {} has no brand row", row.id))
            })?;
            let offer = row
                .offer_id
                .and_then(|id| offers.get(&id))
                .map(Offer::window);
            let entries = stock.remove(&row.id).unwrap_or_default();
            Ok(ProductDetails {
                category_name: category.name.clone(),
                category_listed: category.is_active && category.deleted_at.is_none(),
                brand_name: brand.name.clone(),
                brand_listed: brand.is_active && brand.deleted_at.is_none(),
                offer,
                product: row.into_product(entries),
            })
        })
        .collect()
}

async fn write_stock(
    conn: &mut AsyncPgConnection,
    product: &Product,
) -> Result<(), diesel::result::Error> {
    diesel::delete(product_stock::table.filter(product_stock::product_id.eq(product.id.as_uuid())))
        .execute(conn)
        .await?;
    diesel::insert_into(product_stock::table)
        .values(StockRow::for_product(product))
        .execute(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn find(&self, id: &ProductId) -> Result<Option<ProductDetails>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ProductRow> = products::table
            .find(id.as_uuid())
            .select(ProductRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(hydrate(&mut conn, vec![row]).await?.into_iter().next())
    }

    async fn find_many(&self, ids: &[ProductId]) -> Result<Vec<ProductDetails>, PersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let wanted: Vec<Uuid> = ids.iter().copied().map(Uuid::from).collect();
        let rows: Vec<ProductRow> = products::table
            .filter(products::id.eq_any(&wanted))
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        hydrate(&mut conn, rows).await
    }

    async fn insert(&self, product: &Product) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = ProductRow::from(product);
        conn.transaction::<_, PersistenceError, _>(|conn| {
            async move {
                diesel::insert_into(products::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                write_stock(conn, product).await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    async fn update(&self, product: &Product) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = ProductRow::from(product);
        conn.transaction::<_, PersistenceError, _>(|conn| {
            async move {
                diesel::update(products::table.find(row.id))
                    .set(&row)
                    .execute(conn)
                    .await?;
                write_stock(conn, product).await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    async fn list_admin(
        &self,
        query: &ListQuery,
    ) -> Result<Page<ProductDetails>, PersistenceError> {
        let searched = || {
            let mut filtered = live_products();
            if let Some(term) = &query.search {
                filtered = filtered.filter(products::name.ilike(contains_pattern(term)));
            }
            filtered
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = searched()
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<ProductRow> = searched()
            .order((products::created_at.desc(), products::id))
            .limit(limit(query.page))
            .offset(offset(query.page))
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let items = hydrate(&mut conn, rows).await?;
        Ok(Page::new(items, query.page, total(count)))
    }

    async fn list_catalog(
        &self,
        query: &CatalogQuery,
    ) -> Result<Page<ProductDetails>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = catalog_products(query)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<ProductRow> = sorted(catalog_products(query), query.sort)
            .limit(limit(query.page))
            .offset(offset(query.page))
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let items = hydrate(&mut conn, rows).await?;
        Ok(Page::new(items, query.page, total(count)))
    }

    async fn related(
        &self,
        category_id: &CategoryId,
        exclude: &ProductId,
        limit: i64,
    ) -> Result<Vec<ProductDetails>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProductRow> = purchasable_products()
            .filter(products::category_id.eq(Uuid::from(*category_id)))
            .filter(products::id.ne(Uuid::from(*exclude)))
            .order(products::created_at.desc())
            .limit(limit)
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        hydrate(&mut conn, rows).await
    }

    async fn list_by_category(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<ProductDetails>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProductRow> = live_products()
            .filter(products::category_id.eq(Uuid::from(*category_id)))
            .order(products::created_at)
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        hydrate(&mut conn, rows).await
    }

    async fn list_with_active_offer(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ProductDetails>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let running = offers::table
            .filter(offers::start_date.le(now))
            .filter(offers::end_date.ge(now))
            .select(offers::id.nullable());
        let rows: Vec<ProductRow> = live_products()
            .filter(products::offer_id.eq_any(running))
            .order(products::created_at.desc())
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        hydrate(&mut conn, rows).await
    }

    async fn count_created(&self, window: &ReportWindow) -> Result<i64, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut created = live_products();
        if let Some(from) = window.from {
            created = created.filter(products::created_at.ge(from));
        }
        if let Some(to) = window.to {
            created = created.filter(products::created_at.le(to));
        }
        created
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}
