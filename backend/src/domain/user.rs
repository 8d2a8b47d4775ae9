//! Customer and administrator accounts.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{email, mobile_number, required};
use super::{AdminId, Error, UserId};

/// Access level carried in bearer tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Storefront customer.
    User,
    /// Back-office administrator.
    Admin,
}

impl Role {
    /// Lower-case wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

/// Persisted customer account.
///
/// Google-only accounts carry no password hash. Soft-deleted accounts keep
/// their row with `deleted_at` set and can no longer authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
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

impl User {
    /// Whether the account has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether the account can only sign in through Google.
    pub fn is_google_only(&self) -> bool {
        self.password_hash.is_none() && self.google_id.is_some()
    }
}

/// Customer profile as exposed over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub photo_url: Option<String>,
    pub is_verified: bool,
    pub is_blocked: bool,
    pub google_linked: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            mobile: user.mobile.clone(),
            date_of_birth: user.date_of_birth,
            photo_url: user.photo_url.clone(),
            is_verified: user.is_verified,
            is_blocked: user.is_blocked,
            google_linked: user.google_id.is_some(),
            created_at: user.created_at,
        }
    }
}

/// Validated sign-up form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: String,
}

impl SignUpDraft {
    /// Validate and normalise raw sign-up fields. The password is checked
    /// separately so it never lands in a long-lived struct.
    pub fn new(first_name: &str, last_name: &str, email_address: &str, mobile: &str) -> Result<Self, Error> {
        Ok(Self {
            first_name: required("firstName", first_name)?,
            last_name: required("lastName", last_name)?,
            email: email("email", email_address)?,
            mobile: mobile_number("mobile", mobile)?,
        })
    }
}

/// Persisted administrator account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    pub id: AdminId,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Administrator as exposed over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: AdminId,
    pub email: String,
}

impl From<&Admin> for AdminProfile {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            email: admin.email.clone(),
        }
    }
}

/// One-time password bound to an email address. Only the digest is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Otp {
    pub email: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Otp {
    /// Whether the code can still be redeemed at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn sign_up_normalises_email_and_names() {
        let draft = SignUpDraft::new(" Asha ", "Rao", " ASHA@Example.com", "9876543210")
            .expect("valid draft");
        assert_eq!(draft.first_name, "Asha");
        assert_eq!(draft.email, "asha@example.com");
    }

    #[test]
    fn sign_up_rejects_short_mobile() {
        let error = SignUpDraft::new("Asha", "Rao", "asha@example.com", "12345").expect_err("bad");
        assert_eq!(
            error.details().and_then(|d| d.get("field")),
            Some(&serde_json::json!("mobile"))
        );
    }

    #[test]
    fn otp_expires_after_deadline() {
        let otp = Otp {
            email: "a@b.co".into(),
            code_hash: "x".into(),
            expires_at: ts(),
            created_at: ts() - Duration::seconds(60),
        };
        assert!(otp.is_live(ts()));
        assert!(!otp.is_live(ts() + Duration::seconds(1)));
    }

    #[test]
    fn role_serialises_lowercase() {
        assert_eq!(serde_json::to_value(Role::Admin).expect("json"), "admin");
        assert_eq!(Role::User.as_str(), "user");
    }
}
