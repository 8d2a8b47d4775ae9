//! Ports for customer, administrator, OTP and address storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::Page;

use crate::domain::address::Address;
use crate::domain::listing::ListQuery;
use crate::domain::report::ReportWindow;
use crate::domain::user::{Admin, Otp, User};
use crate::domain::{AddressId, AdminId, UserId};

use super::PersistenceError;

/// Customer accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by id, including soft-deleted accounts.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, PersistenceError>;

    /// Fetch a user by normalised email, including soft-deleted accounts.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PersistenceError>;

    /// Whether a non-deleted user other than `exclude` uses `mobile`.
    async fn mobile_in_use(
        &self,
        mobile: &str,
        exclude: Option<UserId>,
    ) -> Result<bool, PersistenceError>;

    /// Insert a new account. Fails with `Duplicate` when the email exists.
    async fn insert(&self, user: &User) -> Result<(), PersistenceError>;

    /// Overwrite every mutable column of an existing account.
    async fn update(&self, user: &User) -> Result<(), PersistenceError>;

    /// Non-deleted users, newest first, searching name, email and mobile.
    async fn list(&self, query: &ListQuery) -> Result<Page<User>, PersistenceError>;

    /// Users created inside `window`.
    async fn count_created(&self, window: &ReportWindow) -> Result<i64, PersistenceError>;
}

/// Administrator accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Fetch an administrator by id.
    async fn find_by_id(&self, id: &AdminId) -> Result<Option<Admin>, PersistenceError>;

    /// Fetch an administrator by normalised email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, PersistenceError>;

    /// Create the administrator or replace its password hash.
    async fn upsert(&self, admin: &Admin) -> Result<(), PersistenceError>;
}

/// Pending one-time passwords.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OtpRepository: Send + Sync {
    /// Store a new code for `otp.email`.
    async fn insert(&self, otp: &Otp) -> Result<(), PersistenceError>;

    /// The most recently issued code for `email`.
    async fn latest(&self, email: &str) -> Result<Option<Otp>, PersistenceError>;

    /// Forget every code issued to `email`.
    async fn delete_for(&self, email: &str) -> Result<(), PersistenceError>;
}

/// Saved shipping addresses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// A user's addresses, default first then newest.
    async fn list(&self, user_id: &UserId) -> Result<Vec<Address>, PersistenceError>;

    /// An address owned by `user_id`.
    async fn find(
        &self,
        user_id: &UserId,
        id: &AddressId,
    ) -> Result<Option<Address>, PersistenceError>;

    /// Store a new address as given.
    async fn insert(&self, address: &Address) -> Result<(), PersistenceError>;

    /// Replace an address's fields.
    async fn update(&self, address: &Address) -> Result<(), PersistenceError>;

    /// Delete an owned address; returns whether it existed.
    async fn delete(&self, user_id: &UserId, id: &AddressId) -> Result<bool, PersistenceError>;

    /// Make `id` the user's only default address.
    async fn set_default(
        &self,
        user_id: &UserId,
        id: &AddressId,
        at: DateTime<Utc>,
    ) -> Result<(), PersistenceError>;
}
