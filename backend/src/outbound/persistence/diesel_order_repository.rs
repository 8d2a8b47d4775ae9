//! PostgreSQL adapter for orders and return requests.
//!
//! Writes that touch stock, coupons, carts or wallets run inside one
//! transaction so a failed guard leaves every table as it was.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::order::{
    CustomerOrder, ItemChange, ItemStatus, Order, OrderStatus, PaymentStatus, Restock,
    ReturnRequest, ReturnStatus, ReturnView,
};
use crate::domain::ports::{OrderRepository, PersistenceError};
use crate::domain::report::ReportWindow;
use crate::domain::wallet::{TransactionKind, WalletTransaction};
use crate::domain::{OrderId, OrderItemId, UserId};

use super::diesel_error_mapping::{limit, map_diesel_error, map_pool_error, offset, total};
use super::models::commerce_rows::{NewCouponUsageRow, WalletRow, WalletTransactionRow};
use super::models::order_rows::{OrderItemRow, OrderRow, ReturnRow};
use super::pool::DbPool;
use super::schema::{
    cart_items, carts, coupon_usages, order_items, orders, product_stock, return_requests, users,
    wallet_transactions, wallets,
};

/// Diesel-backed [`OrderRepository`].
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

async fn insert_order(conn: &mut AsyncPgConnection, order: &Order) -> Result<(), PersistenceError> {
    let row = OrderRow::from_order(order)?;
    diesel::insert_into(orders::table)
        .values(&row)
        .execute(conn)
        .await?;
    let items = OrderItemRow::for_order(order);
    diesel::insert_into(order_items::table)
        .values(&items)
        .execute(conn)
        .await?;
    Ok(())
}

/// Stock decrements, coupon usage and cart clearing for a confirmed order.
async fn apply_placement(
    conn: &mut AsyncPgConnection,
    order: &Order,
) -> Result<(), PersistenceError> {
    for item in &order.items {
        let updated = diesel::update(
            product_stock::table
                .filter(product_stock::product_id.eq(item.product_id.as_uuid()))
                .filter(product_stock::size.eq(&item.size))
                .filter(product_stock::stock.ge(item.quantity)),
        )
        .set(product_stock::stock.eq(product_stock::stock - item.quantity))
        .execute(conn)
        .await?;
        if updated == 0 {
            return Err(PersistenceError::insufficient_stock(
                item.product_name.clone(),
                item.size.clone(),
            ));
        }
    }
    if let Some(coupon_id) = order.coupon_id {
        let usage = NewCouponUsageRow {
            id: Uuid::new_v4(),
            coupon_id: Uuid::from(coupon_id),
            user_id: *order.user_id.as_uuid(),
            order_id: Some(*order.id.as_uuid()),
            used_at: order.updated_at,
        };
        diesel::insert_into(coupon_usages::table)
            .values(&usage)
            .execute(conn)
            .await?;
    }
    diesel::delete(cart_items::table.filter(cart_items::user_id.eq(order.user_id.as_uuid())))
        .execute(conn)
        .await?;
    diesel::update(carts::table.find(order.user_id.as_uuid()))
        .set(carts::applied_coupon_id.eq(None::<Uuid>))
        .execute(conn)
        .await?;
    Ok(())
}

async fn debit_wallet(
    conn: &mut AsyncPgConnection,
    debit: &WalletTransaction,
) -> Result<(), PersistenceError> {
    let updated = diesel::update(
        wallets::table
            .find(debit.user_id.as_uuid())
            .filter(wallets::balance.ge(debit.amount)),
    )
    .set((
        wallets::balance.eq(wallets::balance - debit.amount),
        wallets::updated_at.eq(debit.created_at),
    ))
    .execute(conn)
    .await?;
    if updated == 0 {
        return Err(PersistenceError::insufficient_balance());
    }
    let row = WalletTransactionRow::from(debit);
    diesel::insert_into(wallet_transactions::table)
        .values(&row)
        .execute(conn)
        .await?;
    Ok(())
}

/// Credit `credit` to the customer's wallet, opening it when missing.
async fn credit_wallet(
    conn: &mut AsyncPgConnection,
    credit: &WalletTransaction,
) -> Result<(), PersistenceError> {
    let opened = WalletRow {
        user_id: *credit.user_id.as_uuid(),
        balance: 0,
        created_at: credit.created_at,
        updated_at: credit.created_at,
    };
    diesel::insert_into(wallets::table)
        .values(&opened)
        .on_conflict(wallets::user_id)
        .do_nothing()
        .execute(conn)
        .await?;
    diesel::update(wallets::table.find(opened.user_id))
        .set((
            wallets::balance.eq(wallets::balance + credit.amount),
            wallets::updated_at.eq(credit.created_at),
        ))
        .execute(conn)
        .await?;
    let row = WalletTransactionRow::from(credit);
    diesel::insert_into(wallet_transactions::table)
        .values(&row)
        .execute(conn)
        .await?;
    Ok(())
}

async fn restock(conn: &mut AsyncPgConnection, restock: &Restock) -> Result<(), PersistenceError> {
    let position: i32 = product_stock::table
        .filter(product_stock::product_id.eq(restock.product_id.as_uuid()))
        .count()
        .get_result::<i64>(conn)
        .await?
        .try_into()
        .unwrap_or(i32::MAX);
    diesel::insert_into(product_stock::table)
        .values((
            product_stock::product_id.eq(restock.product_id.as_uuid()),
            product_stock::size.eq(&restock.size),
            product_stock::stock.eq(restock.quantity),
            product_stock::position.eq(position),
        ))
        .on_conflict((product_stock::product_id, product_stock::size))
        .do_update()
        .set(product_stock::stock.eq(product_stock::stock + restock.quantity))
        .execute(conn)
        .await?;
    Ok(())
}

/// Attach items to order rows, keeping row order.
async fn load_orders(
    conn: &mut AsyncPgConnection,
    rows: Vec<OrderRow>,
) -> Result<Vec<Order>, PersistenceError> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let item_rows: Vec<OrderItemRow> = order_items::table
        .filter(order_items::order_id.eq_any(&ids))
        .order((order_items::order_id, order_items::position))
        .select(OrderItemRow::as_select())
        .load(conn)
        .await?;
    let mut items: HashMap<Uuid, Vec<OrderItemRow>> = HashMap::new();
    for item in item_rows {
        items.entry(item.order_id).or_default().push(item);
    }
    rows.into_iter()
        .map(|row| {
            let lines = items.remove(&row.id).unwrap_or_default();
            row.into_order(lines)
        })
        .collect()
}

async fn load_order(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<Option<Order>, PersistenceError> {
    let row: Option<OrderRow> = orders::table
        .find(id)
        .select(OrderRow::as_select())
        .first(conn)
        .await
        .optional()?;
    match row {
        Some(row) => Ok(load_orders(conn, vec![row]).await?.into_iter().next()),
        None => Ok(None),
    }
}

async fn require_order(conn: &mut AsyncPgConnection, id: Uuid) -> Result<Order, PersistenceError> {
    load_order(conn, id)
        .await?
        .ok_or_else(|| PersistenceError::query(format!("order {id} vanished mid-transaction")))
}

type Customer = (String, String);

/// Names and emails keyed by user id.
async fn customers(
    conn: &mut AsyncPgConnection,
    user_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, Customer>, PersistenceError> {
    let rows: Vec<(Uuid, String, String, String)> = users::table
        .filter(users::id.eq_any(user_ids))
        .select((users::id, users::first_name, users::last_name, users::email))
        .load(conn)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(id, first, last, email)| (id, (format!("{first} {last}"), email)))
        .collect())
}

async fn with_customers(
    conn: &mut AsyncPgConnection,
    orders: Vec<Order>,
) -> Result<Vec<CustomerOrder>, PersistenceError> {
    let user_ids = orders.iter().map(|order| *order.user_id.as_uuid()).collect();
    let known = customers(conn, user_ids).await?;
    Ok(orders
        .into_iter()
        .map(|order| {
            let (customer_name, customer_email) = known
                .get(order.user_id.as_uuid())
                .cloned()
                .unwrap_or_default();
            CustomerOrder {
                order,
                customer_name,
                customer_email,
            }
        })
        .collect())
}

fn orders_with_status(status: Option<OrderStatus>) -> orders::BoxedQuery<'static, Pg> {
    let mut filtered = orders::table.into_boxed();
    if let Some(status) = status {
        filtered = filtered.filter(orders::status.eq(status.as_str()));
    }
    filtered
}

fn returns_with_status(status: Option<ReturnStatus>) -> return_requests::BoxedQuery<'static, Pg> {
    let mut filtered = return_requests::table.into_boxed();
    if let Some(status) = status {
        filtered = filtered.filter(return_requests::status.eq(status.as_str()));
    }
    filtered
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn place_confirmed(
        &self,
        order: &Order,
        wallet_debit: Option<WalletTransaction>,
    ) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<_, PersistenceError, _>(|conn| {
            async move {
                insert_order(conn, order).await?;
                apply_placement(conn, order).await?;
                if let Some(debit) = &wallet_debit {
                    debit_wallet(conn, debit).await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    async fn insert_initiated(&self, order: &Order) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<_, PersistenceError, _>(|conn| {
            async move { insert_order(conn, order).await }.scope_boxed()
        })
        .await
    }

    async fn confirm_payment(
        &self,
        order_id: &OrderId,
        gateway_payment_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Order, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *order_id.as_uuid();
        conn.transaction::<_, PersistenceError, _>(|conn| {
            async move {
                let updated = diesel::update(
                    orders::table
                        .find(id)
                        .filter(orders::status.eq(OrderStatus::Initiated.as_str())),
                )
                .set((
                    orders::status.eq(OrderStatus::Confirmed.as_str()),
                    orders::payment_status.eq(PaymentStatus::Success.as_str()),
                    orders::gateway_payment_id.eq(Some(gateway_payment_id)),
                    orders::updated_at.eq(at),
                ))
                .execute(conn)
                .await?;
                if updated == 0 {
                    return Err(PersistenceError::stale(format!(
                        "order {id} is no longer awaiting payment"
                    )));
                }
                let order = require_order(conn, id).await?;
                apply_placement(conn, &order).await?;
                Ok(order)
            }
            .scope_boxed()
        })
        .await
    }

    async fn fail_payment(
        &self,
        order_id: &OrderId,
        payment_status: PaymentStatus,
        gateway_payment_id: Option<String>,
        refund: Option<WalletTransaction>,
        at: DateTime<Utc>,
    ) -> Result<Order, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *order_id.as_uuid();
        conn.transaction::<_, PersistenceError, _>(|conn| {
            async move {
                let updated = diesel::update(
                    orders::table
                        .find(id)
                        .filter(orders::status.eq(OrderStatus::Initiated.as_str())),
                )
                .set((
                    orders::status.eq(OrderStatus::Failed.as_str()),
                    orders::payment_status.eq(payment_status.as_str()),
                    orders::gateway_payment_id.eq(gateway_payment_id),
                    orders::updated_at.eq(at),
                ))
                .execute(conn)
                .await?;
                if updated == 0 {
                    return Err(PersistenceError::stale(format!(
                        "order {id} is no longer awaiting payment"
                    )));
                }
                if let Some(credit) = &refund {
                    credit_wallet(conn, credit).await?;
                    diesel::update(orders::table.find(id))
                        .set(orders::refunded_amount.eq(orders::refunded_amount + credit.amount))
                        .execute(conn)
                        .await?;
                }
                require_order(conn, id).await
            }
            .scope_boxed()
        })
        .await
    }

    async fn find(&self, id: &OrderId) -> Result<Option<Order>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_order(&mut conn, *id.as_uuid()).await
    }

    async fn find_with_customer(
        &self,
        id: &OrderId,
    ) -> Result<Option<CustomerOrder>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let Some(order) = load_order(&mut conn, *id.as_uuid()).await? else {
            return Ok(None);
        };
        Ok(with_customers(&mut conn, vec![order]).await?.into_iter().next())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<Order>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = *user_id.as_uuid();
        let count: i64 = orders::table
            .filter(orders::user_id.eq(owner))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<OrderRow> = orders::table
            .filter(orders::user_id.eq(owner))
            .order((orders::created_at.desc(), orders::id))
            .limit(limit(page))
            .offset(offset(page))
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let items = load_orders(&mut conn, rows).await?;
        Ok(Page::new(items, page, total(count)))
    }

    async fn list_all(
        &self,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<CustomerOrder>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = orders_with_status(status)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<OrderRow> = orders_with_status(status)
            .order((orders::created_at.desc(), orders::id))
            .limit(limit(page))
            .offset(offset(page))
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let loaded = load_orders(&mut conn, rows).await?;
        let items = with_customers(&mut conn, loaded).await?;
        Ok(Page::new(items, page, total(count)))
    }

    async fn apply_item_change(&self, change: &ItemChange) -> Result<Order, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let order_id = *change.order_id.as_uuid();
        conn.transaction::<_, PersistenceError, _>(|conn| {
            async move {
                let order = require_order(conn, order_id).await?;
                let updated = diesel::update(
                    order_items::table
                        .find(change.item_id.as_uuid())
                        .filter(order_items::order_id.eq(order_id))
                        .filter(order_items::status.eq(change.expected.as_str())),
                )
                .set(order_items::status.eq(change.status.as_str()))
                .execute(conn)
                .await?;
                if updated == 0 {
                    return Err(PersistenceError::stale(format!(
                        "item {} of order {order_id} is no longer {}",
                        change.item_id, change.expected
                    )));
                }
                if let Some((return_id, status)) = change.resolve_return {
                    let resolved = diesel::update(
                        return_requests::table
                            .find(return_id.as_uuid())
                            .filter(return_requests::status.eq(ReturnStatus::Requested.as_str())),
                    )
                    .set((
                        return_requests::status.eq(status.as_str()),
                        return_requests::resolved_at.eq(Some(change.at)),
                    ))
                    .execute(conn)
                    .await?;
                    if resolved == 0 {
                        return Err(PersistenceError::stale(format!(
                            "return {return_id} is already resolved"
                        )));
                    }
                }
                if let Some(units) = &change.restock {
                    restock(conn, units).await?;
                }
                if let Some(amount) = change.refund.filter(|amount| *amount > 0) {
                    let credit = WalletTransaction::settled(
                        order.user_id,
                        TransactionKind::Credit,
                        amount,
                        format!("Refund for {}", order.order_number),
                        change.at,
                    );
                    credit_wallet(conn, &credit).await?;
                    diesel::update(orders::table.find(order_id))
                        .set(orders::refunded_amount.eq(orders::refunded_amount + amount))
                        .execute(conn)
                        .await?;
                }
                if change.mark_paid {
                    diesel::update(orders::table.find(order_id))
                        .set(orders::payment_status.eq(PaymentStatus::Success.as_str()))
                        .execute(conn)
                        .await?;
                }
                diesel::update(orders::table.find(order_id))
                    .set(orders::updated_at.eq(change.at))
                    .execute(conn)
                    .await?;
                require_order(conn, order_id).await
            }
            .scope_boxed()
        })
        .await
    }

    async fn create_return(&self, request: &ReturnRequest) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = ReturnRow::from(request);
        conn.transaction::<_, PersistenceError, _>(|conn| {
            async move {
                diesel::insert_into(return_requests::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                let updated = diesel::update(
                    order_items::table
                        .find(row.item_id)
                        .filter(order_items::order_id.eq(row.order_id))
                        .filter(order_items::status.eq(ItemStatus::Delivered.as_str())),
                )
                .set(order_items::status.eq(ItemStatus::ReturnRequested.as_str()))
                .execute(conn)
                .await?;
                if updated == 0 {
                    return Err(PersistenceError::stale(format!(
                        "item {} is no longer awaiting a return",
                        row.item_id
                    )));
                }
                diesel::update(orders::table.find(row.order_id))
                    .set(orders::updated_at.eq(row.created_at))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    async fn find_return(
        &self,
        order_id: &OrderId,
        item_id: &OrderItemId,
    ) -> Result<Option<ReturnRequest>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ReturnRow> = return_requests::table
            .filter(return_requests::order_id.eq(order_id.as_uuid()))
            .filter(return_requests::item_id.eq(item_id.as_uuid()))
            .order(return_requests::created_at.desc())
            .select(ReturnRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(ReturnRequest::try_from).transpose()
    }

    async fn list_returns(
        &self,
        status: Option<ReturnStatus>,
        page: PageRequest,
    ) -> Result<Page<ReturnView>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = returns_with_status(status)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<ReturnRow> = returns_with_status(status)
            .order((return_requests::created_at.desc(), return_requests::id))
            .limit(limit(page))
            .offset(offset(page))
            .select(ReturnRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let order_ids: Vec<Uuid> = rows.iter().map(|row| row.order_id).collect();
        let item_ids: Vec<Uuid> = rows.iter().map(|row| row.item_id).collect();
        let user_ids: Vec<Uuid> = rows.iter().map(|row| row.user_id).collect();
        let numbers: HashMap<Uuid, String> = orders::table
            .filter(orders::id.eq_any(&order_ids))
            .select((orders::id, orders::order_number))
            .load::<(Uuid, String)>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .collect();
        let items: HashMap<Uuid, OrderItemRow> = order_items::table
            .filter(order_items::id.eq_any(&item_ids))
            .select(OrderItemRow::as_select())
            .load::<OrderItemRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();
        let known = customers(&mut conn, user_ids).await?;

        let views = rows
            .into_iter()
            .map(|row| {
                let item = items.get(&row.item_id).ok_or_else(|| {
                    PersistenceError::query(format!("return {} has no order item", row.id))
                })?;
                let order_number = numbers.get(&row.order_id).cloned().unwrap_or_default();
                let user_email = known
                    .get(&row.user_id)
                    .map(|(_, email)| email.clone())
                    .unwrap_or_default();
                Ok(ReturnView {
                    order_number,
                    user_email,
                    product_name: item.product_name.clone(),
                    size: item.size.clone(),
                    quantity: item.quantity,
                    item_total: item.item_total,
                    request: ReturnRequest::try_from(row)?,
                })
            })
            .collect::<Result<Vec<_>, PersistenceError>>()?;
        Ok(Page::new(views, page, total(count)))
    }

    async fn confirmed_between(
        &self,
        window: &ReportWindow,
    ) -> Result<Vec<CustomerOrder>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut confirmed = orders_with_status(Some(OrderStatus::Confirmed));
        if let Some(from) = window.from {
            confirmed = confirmed.filter(orders::created_at.ge(from));
        }
        if let Some(to) = window.to {
            confirmed = confirmed.filter(orders::created_at.le(to));
        }
        let rows: Vec<OrderRow> = confirmed
            .order((orders::created_at.desc(), orders::id))
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let loaded = load_orders(&mut conn, rows).await?;
        with_customers(&mut conn, loaded).await
    }
}
