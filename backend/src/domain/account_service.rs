//! Customer profile, saved addresses and back-office customer management.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use pagination::Page;
use tracing::info;

use super::address::{Address, AddressFields, AddressInput};
use super::listing::ListQuery;
use super::ports::{AddressRepository, PasswordHasher, UserRepository};
use super::user::{User, UserProfile};
use super::validation::{field_error, http_url, mobile_number, password, required};
use super::{AddressId, Error, UserId};

/// Raw profile edit form.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub mobile: String,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
    pub photo: Option<String>,
}

/// Profiles, addresses and customer administration.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    addresses: Arc<dyn AddressRepository>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        addresses: Arc<dyn AddressRepository>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            addresses,
            hasher,
            clock,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    async fn ensure_mobile_free(&self, mobile: &str, owner: UserId) -> Result<(), Error> {
        if self.users.mobile_in_use(mobile, Some(owner)).await? {
            return Err(Error::conflict("mobile number is already in use"));
        }
        Ok(())
    }

    /// Apply a profile edit for the signed-in customer.
    pub async fn update_profile(&self, mut user: User, update: ProfileUpdate) -> Result<UserProfile, Error> {
        let first_name = required("firstName", &update.first_name)?;
        let last_name = required("lastName", &update.last_name)?;
        let dob_raw = required("dob", &update.dob)?;
        let dob = NaiveDate::parse_from_str(&dob_raw, "%Y-%m-%d")
            .map_err(|_| field_error("dob", "invalid_date", "dob must be formatted YYYY-MM-DD"))?;
        if dob >= self.now().date_naive() {
            return Err(field_error("dob", "not_in_past", "dob must be in the past"));
        }
        let mobile = mobile_number("mobile", &update.mobile)?;
        let photo = update
            .photo
            .filter(|value| !value.trim().is_empty())
            .map(|value| http_url("photo", &value))
            .transpose()?;

        let new_password = update.new_password.filter(|value| !value.is_empty());
        let new_hash = match new_password {
            Some(candidate) => {
                if update.confirm_password.as_deref() != Some(candidate.as_str()) {
                    return Err(field_error(
                        "confirmPassword",
                        "mismatch",
                        "passwords do not match",
                    ));
                }
                password("newPassword", &candidate)?;
                if let Some(current) = user.password_hash.as_deref()
                    && self.hasher.verify(&candidate, current)?
                {
                    return Err(field_error(
                        "newPassword",
                        "unchanged",
                        "new password must differ from the current one",
                    ));
                }
                Some(self.hasher.hash(&candidate)?)
            }
            None => None,
        };

        self.ensure_mobile_free(&mobile, user.id).await?;

        user.first_name = first_name;
        user.last_name = last_name;
        user.date_of_birth = Some(dob);
        user.mobile = Some(mobile);
        if photo.is_some() {
            user.photo_url = photo;
        }
        if new_hash.is_some() {
            user.password_hash = new_hash;
        }
        user.updated_at = self.now();
        self.users.update(&user).await?;
        info!(user_id = %user.id, "profile updated");
        Ok(UserProfile::from(&user))
    }

    /// The customer's addresses, default first then newest.
    pub async fn addresses(&self, user_id: UserId) -> Result<Vec<Address>, Error> {
        Ok(self.addresses.list(&user_id).await?)
    }

    /// One owned address.
    pub async fn address(&self, user_id: UserId, id: AddressId) -> Result<Address, Error> {
        self.addresses
            .find(&user_id, &id)
            .await?
            .ok_or_else(|| Error::not_found("address not found"))
    }

    /// Save a new address. The first address, or one flagged default, becomes
    /// the default.
    pub async fn create_address(
        &self,
        user_id: UserId,
        input: AddressInput,
        make_default: bool,
    ) -> Result<Address, Error> {
        let fields = AddressFields::parse(input)?;
        let first = self.addresses.list(&user_id).await?.is_empty();
        let now = self.now();
        let mut address = Address {
            id: AddressId::random(),
            user_id,
            fields,
            is_default: false,
            created_at: now,
            updated_at: now,
        };
        self.addresses.insert(&address).await?;
        if first || make_default {
            self.addresses.set_default(&user_id, &address.id, now).await?;
            address.is_default = true;
        }
        Ok(address)
    }

    /// Replace every field of an owned address.
    pub async fn update_address(
        &self,
        user_id: UserId,
        id: AddressId,
        input: AddressInput,
    ) -> Result<Address, Error> {
        let mut address = self.address(user_id, id).await?;
        address.fields = AddressFields::parse(input)?;
        address.updated_at = self.now();
        self.addresses.update(&address).await?;
        Ok(address)
    }

    /// Make an owned address the default.
    pub async fn make_default_address(&self, user_id: UserId, id: AddressId) -> Result<Address, Error> {
        let mut address = self.address(user_id, id).await?;
        let now = self.now();
        self.addresses.set_default(&user_id, &id, now).await?;
        address.is_default = true;
        address.updated_at = now;
        Ok(address)
    }

    /// Delete an owned address, promoting the oldest remaining one when the
    /// default goes.
    pub async fn delete_address(&self, user_id: UserId, id: AddressId) -> Result<(), Error> {
        let address = self.address(user_id, id).await?;
        if !self.addresses.delete(&user_id, &id).await? {
            return Err(Error::not_found("address not found"));
        }
        if address.is_default {
            let remaining = self.addresses.list(&user_id).await?;
            if let Some(oldest) = remaining.iter().min_by_key(|candidate| candidate.created_at) {
                self.addresses
                    .set_default(&user_id, &oldest.id, self.now())
                    .await?;
            }
        }
        Ok(())
    }

    /// Non-deleted customers, newest first.
    pub async fn customers(&self, query: &ListQuery) -> Result<Page<UserProfile>, Error> {
        let page = self.users.list(query).await?;
        Ok(page.map(|user| UserProfile::from(&user)))
    }

    async fn live_customer(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(&id)
            .await?
            .filter(|user| !user.is_deleted())
            .ok_or_else(|| Error::not_found("customer not found"))
    }

    /// Edit a customer's name and mobile.
    pub async fn update_customer(
        &self,
        id: UserId,
        first_name: &str,
        last_name: &str,
        mobile: &str,
    ) -> Result<UserProfile, Error> {
        let first_name = required("firstName", first_name)?;
        let last_name = required("lastName", last_name)?;
        let mobile = mobile_number("mobile", mobile)?;
        let mut user = self.live_customer(id).await?;
        self.ensure_mobile_free(&mobile, id).await?;
        user.first_name = first_name;
        user.last_name = last_name;
        user.mobile = Some(mobile);
        user.updated_at = self.now();
        self.users.update(&user).await?;
        Ok(UserProfile::from(&user))
    }

    /// Block or unblock a customer.
    pub async fn set_customer_blocked(&self, id: UserId, blocked: bool) -> Result<UserProfile, Error> {
        let mut user = self.live_customer(id).await?;
        user.is_blocked = blocked;
        user.updated_at = self.now();
        self.users.update(&user).await?;
        info!(user_id = %id, blocked, "customer block state changed");
        Ok(UserProfile::from(&user))
    }

    /// Soft-delete a customer.
    pub async fn delete_customer(&self, id: UserId) -> Result<(), Error> {
        let mut user = self.live_customer(id).await?;
        let now = self.now();
        user.deleted_at = Some(now);
        user.updated_at = now;
        self.users.update(&user).await?;
        info!(user_id = %id, "customer deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
