//! Port for wallets and their ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::wallet::{Wallet, WalletTransaction};
use crate::domain::{TransactionId, UserId};

use super::PersistenceError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletRepository: Send + Sync {
    async fn find(&self, user_id: &UserId) -> Result<Option<Wallet>, PersistenceError>;

    /// Open an empty wallet. Fails with `Duplicate` when one exists.
    async fn create(&self, wallet: &Wallet) -> Result<(), PersistenceError>;

    /// Settled movements (neither initiated nor failed), newest first.
    async fn statement(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<WalletTransaction>, PersistenceError>;

    /// Record a pending top-up.
    async fn record(&self, transaction: &WalletTransaction) -> Result<(), PersistenceError>;

    /// The initiated top-up carrying `gateway_order_id`.
    async fn find_initiated(
        &self,
        user_id: &UserId,
        gateway_order_id: &str,
    ) -> Result<Option<WalletTransaction>, PersistenceError>;

    /// Mark an initiated top-up successful and credit its amount, atomically.
    /// Fails with `Stale` when the transaction is no longer initiated.
    async fn complete_top_up(
        &self,
        id: &TransactionId,
        gateway_payment_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Wallet, PersistenceError>;

    /// Mark an initiated top-up failed.
    async fn fail_top_up(&self, id: &TransactionId) -> Result<(), PersistenceError>;
}
