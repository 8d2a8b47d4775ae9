//! Port for orders, order items and return requests.
//!
//! Every mutating method is one transaction in the adapter: stock, coupon
//! usage, cart contents and wallet balance never drift from the order row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::order::{
    CustomerOrder, ItemChange, Order, OrderStatus, PaymentStatus, ReturnRequest, ReturnStatus,
    ReturnView,
};
use crate::domain::report::ReportWindow;
use crate::domain::wallet::WalletTransaction;
use crate::domain::{OrderId, OrderItemId, UserId};

use super::PersistenceError;

/// Orders and everything their lifecycle touches.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Store a confirmed order and apply its side effects: guarded stock
    /// decrements, coupon usage, clearing the cart and, when given, the wallet
    /// debit. Fails with `InsufficientStock` or `InsufficientBalance` and
    /// leaves nothing behind.
    async fn place_confirmed(
        &self,
        order: &Order,
        wallet_debit: Option<WalletTransaction>,
    ) -> Result<(), PersistenceError>;

    /// Store an order that waits for online payment. No side effects.
    async fn insert_initiated(&self, order: &Order) -> Result<(), PersistenceError>;

    /// Move an initiated order to confirmed with a successful payment and
    /// apply the placement side effects. Fails with `Stale` when the order is
    /// no longer initiated.
    async fn confirm_payment(
        &self,
        order_id: &OrderId,
        gateway_payment_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Order, PersistenceError>;

    /// Mark an initiated order failed, optionally crediting `refund` to the
    /// customer's wallet (created when missing).
    async fn fail_payment(
        &self,
        order_id: &OrderId,
        payment_status: PaymentStatus,
        gateway_payment_id: Option<String>,
        refund: Option<WalletTransaction>,
        at: DateTime<Utc>,
    ) -> Result<Order, PersistenceError>;

    async fn find(&self, id: &OrderId) -> Result<Option<Order>, PersistenceError>;

    /// Order with its customer's name and email.
    async fn find_with_customer(
        &self,
        id: &OrderId,
    ) -> Result<Option<CustomerOrder>, PersistenceError>;

    /// A customer's orders, newest first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<Order>, PersistenceError>;

    /// Every order, newest first, optionally filtered by status.
    async fn list_all(
        &self,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<CustomerOrder>, PersistenceError>;

    /// Apply an item status change with its restock, refund and payment
    /// effects. Returns the updated order.
    ///
    /// Fails with `Stale`, changing nothing, when the item no longer holds
    /// `change.expected` or the resolved return is no longer open.
    async fn apply_item_change(&self, change: &ItemChange) -> Result<Order, PersistenceError>;

    /// Record a return request and mark the item `Return Requested`.
    /// Fails with `Stale` unless the item is still `Delivered`.
    async fn create_return(&self, request: &ReturnRequest) -> Result<(), PersistenceError>;

    /// Latest return request for an order item.
    async fn find_return(
        &self,
        order_id: &OrderId,
        item_id: &OrderItemId,
    ) -> Result<Option<ReturnRequest>, PersistenceError>;

    /// Return requests, newest first, optionally filtered by status.
    async fn list_returns(
        &self,
        status: Option<ReturnStatus>,
        page: PageRequest,
    ) -> Result<Page<ReturnView>, PersistenceError>;

    /// Confirmed orders created inside `window`, newest first.
    async fn confirmed_between(
        &self,
        window: &ReportWindow,
    ) -> Result<Vec<CustomerOrder>, PersistenceError>;
}
