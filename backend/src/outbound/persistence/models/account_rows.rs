//! Rows for users, administrators, OTPs and addresses.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::address::{Address, AddressFields};
use crate::domain::user::{Admin, Otp, User};
use crate::domain::{AddressId, AdminId, UserId};

use super::super::schema::{addresses, admins, otps, users};

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: Option<String>,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub photo_url: Option<String>,
    pub is_verified: bool,
    pub is_blocked: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            mobile: row.mobile,
            password_hash: row.password_hash,
            google_id: row.google_id,
            date_of_birth: row.date_of_birth,
            photo_url: row.photo_url,
            is_verified: row.is_verified,
            is_blocked: row.is_blocked,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            mobile: user.mobile.clone(),
            password_hash: user.password_hash.clone(),
            google_id: user.google_id.clone(),
            date_of_birth: user.date_of_birth,
            photo_url: user.photo_url.clone(),
            is_verified: user.is_verified,
            is_blocked: user.is_blocked,
            deleted_at: user.deleted_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = admins)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AdminRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<AdminRow> for Admin {
    fn from(row: AdminRow) -> Self {
        Self {
            id: AdminId::from_uuid(row.id),
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = otps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OtpRow {
    pub id: Uuid,
    pub email: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<OtpRow> for Otp {
    fn from(row: OtpRow) -> Self {
        Self {
            email: row.email,
            code_hash: row.code_hash,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = addresses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AddressRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub state: String,
    pub district: String,
    pub city: String,
    pub pincode: String,
    pub landmark: Option<String>,
    pub mobile: String,
    pub alternate_mobile: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            fields: AddressFields {
                first_name: row.first_name,
                last_name: row.last_name,
                state: row.state,
                district: row.district,
                city: row.city,
                pincode: row.pincode,
                landmark: row.landmark,
                mobile: row.mobile,
                alternate_mobile: row.alternate_mobile,
            },
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&Address> for AddressRow {
    fn from(address: &Address) -> Self {
        let fields = address.fields.clone();
        Self {
            id: *address.id.as_uuid(),
            user_id: *address.user_id.as_uuid(),
            first_name: fields.first_name,
            last_name: fields.last_name,
            state: fields.state,
            district: fields.district,
            city: fields.city,
            pincode: fields.pincode,
            landmark: fields.landmark,
            mobile: fields.mobile,
            alternate_mobile: fields.alternate_mobile,
            is_default: address.is_default,
            created_at: address.created_at,
            updated_at: address.updated_at,
        }
    }
}
