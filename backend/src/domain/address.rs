//! Saved shipping addresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{mobile_number, required};
use super::{AddressId, Error, UserId};

/// Shipping address owned by a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    #[serde(skip)]
    pub user_id: UserId,
    #[serde(flatten)]
    pub fields: AddressFields,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated address contents, also used as the order shipping snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressFields {
    pub first_name: String,
    pub last_name: String,
    pub state: String,
    pub district: String,
    pub city: String,
    pub pincode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    pub mobile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_mobile: Option<String>,
}

/// Raw address input before validation.
#[derive(Debug, Clone, Default)]
pub struct AddressInput {
    pub first_name: String,
    pub last_name: String,
    pub state: String,
    pub district: String,
    pub city: String,
    pub pincode: String,
    pub landmark: Option<String>,
    pub mobile: String,
    pub alternate_mobile: Option<String>,
}

impl AddressFields {
    /// Validate raw input. Optional fields collapse to `None` when blank.
    pub fn parse(input: AddressInput) -> Result<Self, Error> {
        let landmark = input
            .landmark
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        let alternate_mobile = input
            .alternate_mobile
            .filter(|value| !value.trim().is_empty())
            .map(|value| mobile_number("alternateMobile", &value))
            .transpose()?;
        Ok(Self {
            first_name: required("firstName", &input.first_name)?,
            last_name: required("lastName", &input.last_name)?,
            state: required("state", &input.state)?,
            district: required("district", &input.district)?,
            city: required("city", &input.city)?,
            pincode: required("pincode", &input.pincode)?,
            landmark,
            mobile: mobile_number("mobile", &input.mobile)?,
            alternate_mobile,
        })
    }
}
