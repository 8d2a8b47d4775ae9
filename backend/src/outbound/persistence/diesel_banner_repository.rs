//! PostgreSQL adapter for home page banners.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};

use crate::domain::BannerId;
use crate::domain::banner::Banner;
use crate::domain::ports::{BannerRepository, PersistenceError};

use super::diesel_error_mapping::{limit, map_diesel_error, map_pool_error, offset, total};
use super::models::commerce_rows::BannerRow;
use super::pool::DbPool;
use super::schema::banners;

/// Diesel-backed [`BannerRepository`].
#[derive(Clone)]
pub struct DieselBannerRepository {
    pool: DbPool,
}

impl DieselBannerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BannerRepository for DieselBannerRepository {
    async fn insert(&self, banner: &Banner) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = BannerRow::from(banner);
        diesel::insert_into(banners::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, banner: &Banner) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = BannerRow::from(banner);
        diesel::update(banners::table.find(banner.id.as_uuid()))
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(&self, id: &BannerId) -> Result<Option<Banner>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<BannerRow> = banners::table
            .find(id.as_uuid())
            .select(BannerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Banner::from))
    }

    async fn delete(&self, id: &BannerId) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(banners::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Banner>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = banners::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<BannerRow> = banners::table
            .order((banners::created_at.desc(), banners::id))
            .limit(limit(page))
            .offset(offset(page))
            .select(BannerRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Page::new(
            rows.into_iter().map(Banner::from).collect(),
            page,
            total(count),
        ))
    }

    async fn list_active(&self) -> Result<Vec<Banner>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BannerRow> = banners::table
            .filter(banners::is_active.eq(true))
            .order((banners::created_at.desc(), banners::id))
            .select(BannerRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Banner::from).collect())
    }
}
