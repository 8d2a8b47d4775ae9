//! PostgreSQL adapters for offers and coupons.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{CouponRepository, OfferRepository, PersistenceError, PricedProduct};
use crate::domain::promotion::{Coupon, CouponStatus, CouponWithUsage, Offer, OfferKind};
use crate::domain::{CategoryId, CouponId, OfferId, UserId};

use super::diesel_error_mapping::{limit, map_diesel_error, map_pool_error, offset, total};
use super::models::catalog_rows::OfferRow;
use super::models::commerce_rows::CouponRow;
use super::pool::DbPool;
use super::schema::{categories, coupon_usages, coupons, offers, products};

/// Diesel-backed [`OfferRepository`].
#[derive(Clone)]
pub struct DieselOfferRepository {
    pool: DbPool,
}

impl DieselOfferRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn listed_offers(kind: Option<OfferKind>, now: DateTime<Utc>) -> offers::BoxedQuery<'static, Pg> {
    let mut filtered = offers::table.into_boxed();
    if let Some(kind) = kind {
        filtered = filtered
            .filter(offers::kind.eq(kind.as_str()))
            .filter(offers::end_date.ge(now));
    }
    filtered
}

#[async_trait]
impl OfferRepository for DieselOfferRepository {
    async fn insert(&self, offer: &Offer) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = OfferRow::from(offer);
        diesel::insert_into(offers::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(&self, id: &OfferId) -> Result<Option<Offer>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OfferRow> = offers::table
            .find(id.as_uuid())
            .select(OfferRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Offer::try_from).transpose()
    }

    async fn list(
        &self,
        kind: Option<OfferKind>,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<Offer>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = listed_offers(kind, now)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<OfferRow> = listed_offers(kind, now)
            .order((offers::created_at.desc(), offers::id))
            .limit(limit(page))
            .offset(offset(page))
            .select(OfferRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let items = rows
            .into_iter()
            .map(Offer::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total(count)))
    }

    async fn delete(&self, id: &OfferId) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let offer_id = *id.as_uuid();
        conn.transaction::<_, PersistenceError, _>(|conn| {
            async move {
                diesel::update(products::table.filter(products::offer_id.eq(offer_id)))
                    .set((
                        products::offer_id.eq(None::<Uuid>),
                        products::offer_price.eq(None::<i64>),
                    ))
                    .execute(conn)
                    .await?;
                diesel::update(categories::table.filter(categories::offer_id.eq(offer_id)))
                    .set(categories::offer_id.eq(None::<Uuid>))
                    .execute(conn)
                    .await?;
                let removed = diesel::delete(offers::table.find(offer_id))
                    .execute(conn)
                    .await?;
                Ok(removed > 0)
            }
            .scope_boxed()
        })
        .await
    }

    async fn attach_to_product(
        &self,
        offer_id: &OfferId,
        priced: PricedProduct,
    ) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(products::table.find(priced.product_id.as_uuid()))
            .set((
                products::offer_id.eq(Some(*offer_id.as_uuid())),
                products::offer_price.eq(Some(priced.offer_price)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn attach_to_category(
        &self,
        offer_id: &OfferId,
        category_id: &CategoryId,
        products: &[PricedProduct],
    ) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let offer_id = *offer_id.as_uuid();
        let category_id = *category_id.as_uuid();
        conn.transaction::<_, PersistenceError, _>(|conn| {
            async move {
                diesel::update(categories::table.find(category_id))
                    .set(categories::offer_id.eq(Some(offer_id)))
                    .execute(conn)
                    .await?;
                for priced in products {
                    diesel::update(products::table.find(priced.product_id.as_uuid()))
                        .set((
                            products::offer_id.eq(Some(offer_id)),
                            products::offer_price.eq(Some(priced.offer_price)),
                        ))
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }
}

/// Diesel-backed [`CouponRepository`].
#[derive(Clone)]
pub struct DieselCouponRepository {
    pool: DbPool,
}

impl DieselCouponRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CouponRepository for DieselCouponRepository {
    async fn insert(&self, coupon: &Coupon) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = CouponRow::from(coupon);
        diesel::insert_into(coupons::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(&self, id: &CouponId) -> Result<Option<Coupon>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CouponRow> = coupons::table
            .find(id.as_uuid())
            .select(CouponRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Coupon::try_from).transpose()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CouponRow> = coupons::table
            .filter(coupons::code.eq(code.trim().to_uppercase()))
            .select(CouponRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Coupon::try_from).transpose()
    }

    async fn list(&self, page: PageRequest) -> Result<Page<CouponWithUsage>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = coupons::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<CouponRow> = coupons::table
            .order((coupons::created_at.desc(), coupons::id))
            .limit(limit(page))
            .offset(offset(page))
            .select(CouponRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let usage: HashMap<Uuid, i64> = coupon_usages::table
            .filter(coupon_usages::coupon_id.eq_any(&ids))
            .group_by(coupon_usages::coupon_id)
            .select((coupon_usages::coupon_id, count_star()))
            .load::<(Uuid, i64)>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .collect();
        let items = rows
            .into_iter()
            .map(|row| {
                let times_used = usage.get(&row.id).copied().unwrap_or(0);
                Coupon::try_from(row).map(|coupon| CouponWithUsage { coupon, times_used })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total(count)))
    }

    async fn set_status(
        &self,
        id: &CouponId,
        status: CouponStatus,
    ) -> Result<Option<Coupon>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CouponRow> = diesel::update(coupons::table.find(id.as_uuid()))
            .set(coupons::status.eq(status.as_str()))
            .returning(CouponRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Coupon::try_from).transpose()
    }

    async fn delete(&self, id: &CouponId) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(coupons::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn usage_count(
        &self,
        coupon_id: &CouponId,
        user_id: &UserId,
    ) -> Result<i64, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        coupon_usages::table
            .filter(coupon_usages::coupon_id.eq(coupon_id.as_uuid()))
            .filter(coupon_usages::user_id.eq(user_id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn available_for(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Coupon>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CouponRow> = coupons::table
            .filter(coupons::status.eq(CouponStatus::Active.as_str()))
            .filter(coupons::expiration_date.ge(now))
            .order((coupons::expiration_date, coupons::id))
            .select(CouponRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let used: HashMap<Uuid, i64> = coupon_usages::table
            .filter(coupon_usages::user_id.eq(user_id.as_uuid()))
            .group_by(coupon_usages::coupon_id)
            .select((coupon_usages::coupon_id, count_star()))
            .load::<(Uuid, i64)>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .collect();
        rows.into_iter()
            .filter(|row| {
                used.get(&row.id).copied().unwrap_or(0) < i64::from(row.usage_limit_per_user)
            })
            .map(Coupon::try_from)
            .collect()
    }
}
