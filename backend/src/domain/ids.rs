//! Strongly typed entity identifiers.
//!
//! Every aggregate is keyed by a UUID v4. Wrapping each in its own newtype
//! keeps a `ProductId` from being passed where an `OrderId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            utoipa::ToSchema,
        )]
        #[serde(transparent)]
        #[schema(value_type = String, format = Uuid)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Borrow the inner UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

define_id!(
    /// Customer account identifier.
    UserId
);
define_id!(
    /// Administrator account identifier.
    AdminId
);
define_id!(
    /// Saved shipping address identifier.
    AddressId
);
define_id!(
    /// Product category identifier.
    CategoryId
);
define_id!(
    /// Brand identifier.
    BrandId
);
define_id!(
    /// Product identifier.
    ProductId
);
define_id!(
    /// Percentage offer identifier.
    OfferId
);
define_id!(
    /// Coupon identifier.
    CouponId
);
define_id!(
    /// Cart line identifier.
    CartItemId
);
define_id!(
    /// Order identifier.
    OrderId
);
define_id!(
    /// Order line identifier.
    OrderItemId
);
define_id!(
    /// Return request identifier.
    ReturnId
);
define_id!(
    /// Wallet transaction identifier.
    TransactionId
);
define_id!(
    /// Home page banner identifier.
    BannerId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_uuid_text() {
        let uuid = Uuid::new_v4();
        let id: ProductId = format!(" {uuid} ").parse().expect("valid id");
        assert_eq!(id.as_uuid(), &uuid);
    }

    #[test]
    fn serialises_as_bare_string() {
        let id = OrderId::from_uuid(Uuid::nil());
        let json = serde_json::to_value(id).expect("serialise id");
        assert_eq!(json, serde_json::json!("00000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn random_ids_differ() {
        assert_ne!(UserId::random(), UserId::random());
    }
}
