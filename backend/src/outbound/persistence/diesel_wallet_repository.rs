//! PostgreSQL adapter for wallets and their ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::{Page, PageRequest};

use crate::domain::ports::{PersistenceError, WalletRepository};
use crate::domain::wallet::{TransactionStatus, Wallet, WalletTransaction};
use crate::domain::{TransactionId, UserId};

use super::diesel_error_mapping::{limit, map_diesel_error, map_pool_error, offset, total};
use super::models::commerce_rows::{WalletRow, WalletTransactionRow};
use super::pool::DbPool;
use super::schema::{wallet_transactions, wallets};

/// Diesel-backed [`WalletRepository`].
#[derive(Clone)]
pub struct DieselWalletRepository {
    pool: DbPool,
}

impl DieselWalletRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn visible_movements(user_id: &UserId) -> wallet_transactions::BoxedQuery<'static, Pg> {
    wallet_transactions::table
        .filter(wallet_transactions::user_id.eq(*user_id.as_uuid()))
        .filter(wallet_transactions::status.ne_all(vec![
            TransactionStatus::Initiated.as_str(),
            TransactionStatus::Failed.as_str(),
        ]))
        .into_boxed()
}

#[async_trait]
impl WalletRepository for DieselWalletRepository {
    async fn find(&self, user_id: &UserId) -> Result<Option<Wallet>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<WalletRow> = wallets::table
            .find(user_id.as_uuid())
            .select(WalletRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Wallet::from))
    }

    async fn create(&self, wallet: &Wallet) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = WalletRow {
            user_id: *wallet.user_id.as_uuid(),
            balance: wallet.balance,
            created_at: wallet.created_at,
            updated_at: wallet.updated_at,
        };
        diesel::insert_into(wallets::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn statement(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<WalletTransaction>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = visible_movements(user_id)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<WalletTransactionRow> = visible_movements(user_id)
            .order((
                wallet_transactions::created_at.desc(),
                wallet_transactions::id,
            ))
            .limit(limit(page))
            .offset(offset(page))
            .select(WalletTransactionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let items = rows
            .into_iter()
            .map(WalletTransaction::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total(count)))
    }

    async fn record(&self, transaction: &WalletTransaction) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = WalletTransactionRow::from(transaction);
        diesel::insert_into(wallet_transactions::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_initiated(
        &self,
        user_id: &UserId,
        gateway_order_id: &str,
    ) -> Result<Option<WalletTransaction>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<WalletTransactionRow> = wallet_transactions::table
            .filter(wallet_transactions::user_id.eq(user_id.as_uuid()))
            .filter(wallet_transactions::gateway_order_id.eq(gateway_order_id))
            .filter(wallet_transactions::status.eq(TransactionStatus::Initiated.as_str()))
            .select(WalletTransactionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(WalletTransaction::try_from).transpose()
    }

    async fn complete_top_up(
        &self,
        id: &TransactionId,
        gateway_payment_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Wallet, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *id.as_uuid();
        conn.transaction::<_, PersistenceError, _>(|conn| {
            async move {
                let settled: Option<WalletTransactionRow> = diesel::update(
                    wallet_transactions::table
                        .find(id)
                        .filter(wallet_transactions::status.eq(TransactionStatus::Initiated.as_str())),
                )
                .set((
                    wallet_transactions::status.eq(TransactionStatus::Success.as_str()),
                    wallet_transactions::gateway_payment_id.eq(Some(gateway_payment_id)),
                ))
                .returning(WalletTransactionRow::as_returning())
                .get_result(conn)
                .await
                .optional()?;
                let Some(settled) = settled else {
                    return Err(PersistenceError::stale(format!(
                        "top-up {id} is no longer awaiting payment"
                    )));
                };
                let opened = WalletRow {
                    user_id: settled.user_id,
                    balance: 0,
                    created_at: at,
                    updated_at: at,
                };
                diesel::insert_into(wallets::table)
                    .values(&opened)
                    .on_conflict(wallets::user_id)
                    .do_nothing()
                    .execute(conn)
                    .await?;
                let wallet: WalletRow = diesel::update(wallets::table.find(settled.user_id))
                    .set((
                        wallets::balance.eq(wallets::balance + settled.amount),
                        wallets::updated_at.eq(at),
                    ))
                    .returning(WalletRow::as_returning())
                    .get_result(conn)
                    .await?;
                Ok(Wallet::from(wallet))
            }
            .scope_boxed()
        })
        .await
    }

    async fn fail_top_up(&self, id: &TransactionId) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(
            wallet_transactions::table
                .find(id.as_uuid())
                .filter(wallet_transactions::status.eq(TransactionStatus::Initiated.as_str())),
        )
        .set(wallet_transactions::status.eq(TransactionStatus::Failed.as_str()))
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(map_diesel_error)
    }
}
