//! PostgreSQL adapters for carts and wishlists.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::cart::{Cart, WishlistEntry};
use crate::domain::ports::{CartRepository, PersistenceError, WishlistRepository};
use crate::domain::{CouponId, ProductId, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::commerce_rows::{CartItemRow, CartRow, WishlistRow};
use super::pool::DbPool;
use super::schema::{cart_items, carts, wishlist_items};

/// Diesel-backed [`CartRepository`].
#[derive(Clone)]
pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn line_rows(cart: &Cart) -> Vec<CartItemRow> {
    cart.lines
        .iter()
        .zip(0..)
        .map(|(line, position)| CartItemRow {
            id: *line.id.as_uuid(),
            user_id: *cart.user_id.as_uuid(),
            product_id: *line.product_id.as_uuid(),
            size: line.size.clone(),
            quantity: line.quantity,
            position,
        })
        .collect()
}

#[async_trait]
impl CartRepository for DieselCartRepository {
    async fn find(&self, user_id: &UserId) -> Result<Option<Cart>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let cart: Option<CartRow> = carts::table
            .find(user_id.as_uuid())
            .select(CartRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(cart) = cart else {
            return Ok(None);
        };
        let lines: Vec<CartItemRow> = cart_items::table
            .filter(cart_items::user_id.eq(cart.user_id))
            .order(cart_items::position)
            .select(CartItemRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Some(Cart {
            user_id: UserId::from_uuid(cart.user_id),
            lines: lines.into_iter().map(Into::into).collect(),
            applied_coupon_id: cart.applied_coupon_id.map(CouponId::from_uuid),
        }))
    }

    async fn save(&self, cart: &Cart) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let header = CartRow {
            user_id: *cart.user_id.as_uuid(),
            applied_coupon_id: cart.applied_coupon_id.map(Uuid::from),
        };
        let lines = line_rows(cart);
        conn.transaction::<_, PersistenceError, _>(|conn| {
            async move {
                diesel::insert_into(carts::table)
                    .values(&header)
                    .on_conflict(carts::user_id)
                    .do_update()
                    .set(carts::applied_coupon_id.eq(excluded(carts::applied_coupon_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(cart_items::table.filter(cart_items::user_id.eq(header.user_id)))
                    .execute(conn)
                    .await?;
                if !lines.is_empty() {
                    diesel::insert_into(cart_items::table)
                        .values(&lines)
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

/// Diesel-backed [`WishlistRepository`].
#[derive(Clone)]
pub struct DieselWishlistRepository {
    pool: DbPool,
}

impl DieselWishlistRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WishlistRepository for DieselWishlistRepository {
    async fn list(&self, user_id: &UserId) -> Result<Vec<WishlistEntry>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<WishlistRow> = wishlist_items::table
            .filter(wishlist_items::user_id.eq(user_id.as_uuid()))
            .order(wishlist_items::added_at.desc())
            .select(WishlistRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(WishlistEntry::from).collect())
    }

    async fn add(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        at: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = WishlistRow {
            user_id: *user_id.as_uuid(),
            product_id: *product_id.as_uuid(),
            added_at: at,
        };
        diesel::insert_into(wishlist_items::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn remove(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            wishlist_items::table
                .filter(wishlist_items::user_id.eq(user_id.as_uuid()))
                .filter(wishlist_items::product_id.eq(product_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
