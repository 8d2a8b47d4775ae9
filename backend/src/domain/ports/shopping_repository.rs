//! Ports for carts and wishlists.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::cart::{Cart, WishlistEntry};
use crate::domain::{ProductId, UserId};

use super::PersistenceError;

/// One cart per customer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn find(&self, user_id: &UserId) -> Result<Option<Cart>, PersistenceError>;

    /// Replace the stored cart with `cart`, creating it when absent.
    async fn save(&self, cart: &Cart) -> Result<(), PersistenceError>;
}

/// Saved-for-later products.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WishlistRepository: Send + Sync {
    /// Entries newest first.
    async fn list(&self, user_id: &UserId) -> Result<Vec<WishlistEntry>, PersistenceError>;

    /// Fails with `Duplicate` when already present.
    async fn add(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        at: DateTime<Utc>,
    ) -> Result<(), PersistenceError>;

    /// Returns whether the entry existed.
    async fn remove(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<bool, PersistenceError>;
}
