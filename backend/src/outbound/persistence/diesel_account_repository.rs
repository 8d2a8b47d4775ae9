//! PostgreSQL adapters for users, administrators, OTPs and addresses.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::Page;
use uuid::Uuid;

use crate::domain::address::Address;
use crate::domain::listing::ListQuery;
use crate::domain::ports::{
    AddressRepository, AdminRepository, OtpRepository, PersistenceError, UserRepository,
};
use crate::domain::report::ReportWindow;
use crate::domain::user::{Admin, Otp, User};
use crate::domain::{AddressId, AdminId, UserId};

use super::diesel_error_mapping::{
    contains_pattern, limit, map_diesel_error, map_pool_error, offset, total,
};
use super::models::account_rows::{AddressRow, AdminRow, OtpRow, UserRow};
use super::pool::DbPool;
use super::schema::{addresses, admins, otps, users};

/// Diesel-backed [`UserRepository`].
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn searched_users(query: &ListQuery) -> users::BoxedQuery<'static, Pg> {
    let mut filtered = users::table.filter(users::deleted_at.is_null()).into_boxed();
    if let Some(term) = &query.search {
        let pattern = contains_pattern(term);
        filtered = filtered.filter(
            users::first_name
                .ilike(pattern.clone())
                .or(users::last_name.ilike(pattern.clone()))
                .or(users::email.ilike(pattern.clone()))
                .or(users::mobile.ilike(pattern).assume_not_null()),
        );
    }
    filtered
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(User::from))
    }

    async fn mobile_in_use(
        &self,
        mobile: &str,
        exclude: Option<UserId>,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut matching = users::table
            .filter(users::mobile.eq(mobile))
            .filter(users::deleted_at.is_null())
            .into_boxed();
        if let Some(excluded_id) = exclude {
            matching = matching.filter(users::id.ne(Uuid::from(excluded_id)));
        }
        let count: i64 = matching
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count > 0)
    }

    async fn insert(&self, user: &User) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = UserRow::from(user);
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, user: &User) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = UserRow::from(user);
        let updated = diesel::update(users::table.find(user.id.as_uuid()))
            .set(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(PersistenceError::query("user not found for update"));
        }
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Page<User>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = searched_users(query)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<UserRow> = searched_users(query)
            .order((users::created_at.desc(), users::id))
            .limit(limit(query.page))
            .offset(offset(query.page))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Page::new(
            rows.into_iter().map(User::from).collect(),
            query.page,
            total(count),
        ))
    }

    async fn count_created(&self, window: &ReportWindow) -> Result<i64, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut created = users::table.filter(users::deleted_at.is_null()).into_boxed();
        if let Some(from) = window.from {
            created = created.filter(users::created_at.ge(from));
        }
        if let Some(to) = window.to {
            created = created.filter(users::created_at.le(to));
        }
        created
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}

/// Diesel-backed [`AdminRepository`].
#[derive(Clone)]
pub struct DieselAdminRepository {
    pool: DbPool,
}

impl DieselAdminRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminRepository for DieselAdminRepository {
    async fn find_by_id(&self, id: &AdminId) -> Result<Option<Admin>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AdminRow> = admins::table
            .find(id.as_uuid())
            .select(AdminRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Admin::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AdminRow> = admins::table
            .filter(admins::email.eq(email))
            .select(AdminRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Admin::from))
    }

    async fn upsert(&self, admin: &Admin) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = AdminRow {
            id: *admin.id.as_uuid(),
            email: admin.email.clone(),
            password_hash: admin.password_hash.clone(),
            created_at: admin.created_at,
        };
        diesel::insert_into(admins::table)
            .values(&row)
            .on_conflict(admins::email)
            .do_update()
            .set(admins::password_hash.eq(excluded(admins::password_hash)))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

/// Diesel-backed [`OtpRepository`].
#[derive(Clone)]
pub struct DieselOtpRepository {
    pool: DbPool,
}

impl DieselOtpRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OtpRepository for DieselOtpRepository {
    async fn insert(&self, otp: &Otp) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = OtpRow {
            id: Uuid::new_v4(),
            email: otp.email.clone(),
            code_hash: otp.code_hash.clone(),
            expires_at: otp.expires_at,
            created_at: otp.created_at,
        };
        diesel::insert_into(otps::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn latest(&self, email: &str) -> Result<Option<Otp>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OtpRow> = otps::table
            .filter(otps::email.eq(email))
            .order(otps::created_at.desc())
            .select(OtpRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Otp::from))
    }

    async fn delete_for(&self, email: &str) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(otps::table.filter(otps::email.eq(email)))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

/// Diesel-backed [`AddressRepository`].
#[derive(Clone)]
pub struct DieselAddressRepository {
    pool: DbPool,
}

impl DieselAddressRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AddressRepository for DieselAddressRepository {
    async fn list(&self, user_id: &UserId) -> Result<Vec<Address>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AddressRow> = addresses::table
            .filter(addresses::user_id.eq(user_id.as_uuid()))
            .order((addresses::is_default.desc(), addresses::created_at.desc()))
            .select(AddressRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Address::from).collect())
    }

    async fn find(
        &self,
        user_id: &UserId,
        id: &AddressId,
    ) -> Result<Option<Address>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AddressRow> = addresses::table
            .filter(addresses::id.eq(id.as_uuid()))
            .filter(addresses::user_id.eq(user_id.as_uuid()))
            .select(AddressRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Address::from))
    }

    async fn insert(&self, address: &Address) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = AddressRow::from(address);
        diesel::insert_into(addresses::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, address: &Address) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = AddressRow::from(address);
        diesel::update(
            addresses::table
                .filter(addresses::id.eq(address.id.as_uuid()))
                .filter(addresses::user_id.eq(address.user_id.as_uuid())),
        )
        .set(&row)
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(map_diesel_error)
    }

    async fn delete(&self, user_id: &UserId, id: &AddressId) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            addresses::table
                .filter(addresses::id.eq(id.as_uuid()))
                .filter(addresses::user_id.eq(user_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn set_default(
        &self,
        user_id: &UserId,
        id: &AddressId,
        at: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = *user_id.as_uuid();
        let target = *id.as_uuid();
        conn.transaction::<_, PersistenceError, _>(|conn| {
            async move {
                diesel::update(
                    addresses::table
                        .filter(addresses::user_id.eq(owner))
                        .filter(addresses::is_default.eq(true)),
                )
                .set((addresses::is_default.eq(false), addresses::updated_at.eq(at)))
                .execute(conn)
                .await?;
                let promoted = diesel::update(
                    addresses::table
                        .filter(addresses::id.eq(target))
                        .filter(addresses::user_id.eq(owner)),
                )
                .set((addresses::is_default.eq(true), addresses::updated_at.eq(at)))
                .execute(conn)
                .await?;
                if promoted == 0 {
                    return Err(PersistenceError::stale("address no longer exists"));
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }
}
