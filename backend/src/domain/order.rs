//! Orders, order items and return requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::address::AddressFields;
use super::pricing::refund_amount;
use super::validation::field_error;
use super::{CouponId, Error, OrderId, OrderItemId, ProductId, ReturnId, UserId};

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire name.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        let allowed: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                        field_error(
                            $field,
                            "invalid_value",
                            format!("{} must be one of: {}", $field, allowed.join(", ")),
                        )
                    })
            }
        }
    };
}

wire_enum!(
    /// Lifecycle of an order as a whole.
    OrderStatus, "status" {
        Initiated => "Initiated",
        Confirmed => "Confirmed",
        Failed => "Failed",
    }
);

wire_enum!(
    /// Whether the customer's money has been collected.
    PaymentStatus, "paymentStatus" {
        Pending => "Pending",
        Success => "Success",
        Failed => "Failed",
    }
);

wire_enum!(
    /// How the customer pays.
    PaymentMethod, "paymentMethod" {
        PayOnDelivery => "PayOnDelivery",
        Razorpay => "Razorpay",
        Wallet => "Wallet",
    }
);

wire_enum!(
    /// Fulfilment state of one order line.
    ItemStatus, "status" {
        Pending => "Pending",
        Shipped => "Shipped",
        Delivered => "Delivered",
        Cancelled => "Cancelled",
        ReturnRequested => "Return Requested",
        ReturnAccepted => "Return Accepted",
        ReturnRejected => "Return Rejected",
    }
);

impl ItemStatus {
    /// Whether the customer may still cancel the line.
    pub fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Shipped)
    }

    /// Validate an administrator's status change.
    pub fn admin_transition(self, to: Self) -> Result<Self, Error> {
        let allowed = matches!(
            (self, to),
            (Self::Pending, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered | Self::Cancelled)
        );
        if allowed {
            Ok(to)
        } else {
            Err(Error::invalid_request(format!(
                "cannot change item status from {self} to {to}"
            ))
            .with_details(serde_json::json!({
                "field": "status",
                "code": "invalid_transition",
                "from": self.as_str(),
                "to": to.as_str(),
            })))
        }
    }
}

wire_enum!(
    /// Why a customer sends an item back.
    ReturnReason, "reason" {
        Damaged => "Product arrived damaged or defective",
        WrongItem => "Incorrect item received",
        NotAsDescribed => "Product does not match description",
        ChangedMind => "Changed mind after purchase",
        PoorFit => "Product does not fit as expected",
        Other => "Other Reason",
    }
);

impl ReturnReason {
    /// Damaged goods are written off instead of going back on the shelf.
    pub fn restocks(self) -> bool {
        self != Self::Damaged
    }
}

wire_enum!(
    /// Resolution state of a return request.
    ReturnStatus, "status" {
        Requested => "requested",
        Approved => "approved",
        Rejected => "rejected",
    }
);

/// One line of a placed order with its product snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub brand_name: String,
    pub category_name: String,
    pub thumbnail: String,
    pub size: String,
    pub quantity: i32,
    pub sale_price: i64,
    /// Price paid per unit.
    pub unit_price: i64,
    /// Offer savings across the line.
    pub applied_offer_amount: i64,
    pub item_total: i64,
    pub status: ItemStatus,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    #[serde(skip)]
    pub user_id: UserId,
    pub shipping_address: AddressFields,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_payment_id: Option<String>,
    #[serde(rename = "totalMRP")]
    pub total_mrp: i64,
    pub offer_discount: i64,
    #[serde(skip)]
    pub coupon_id: Option<CouponId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    pub coupon_amount: i64,
    pub bill_amount: i64,
    pub refunded_amount: i64,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Find a line by id.
    pub fn item(&self, id: OrderItemId) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// What cancelling or returning `item` gives back to the customer.
    ///
    /// Nothing is owed until the payment has been collected.
    pub fn refund_for(&self, item: &OrderItem) -> i64 {
        if self.payment_status != PaymentStatus::Success {
            return 0;
        }
        refund_amount(item.item_total, self.bill_amount, self.coupon_amount)
    }

    /// Whether stock, coupon and cart side effects have been applied.
    pub fn is_confirmed(&self) -> bool {
        self.status == OrderStatus::Confirmed
    }
}

/// Generate an order number of the form `ORD-XXXXXXXX`.
pub fn new_order_number(id: OrderId) -> String {
    let simple = id.as_uuid().simple().to_string().to_uppercase();
    let suffix: String = simple.chars().take(8).collect();
    format!("ORD-{suffix}")
}

/// Order listed for administrators with its customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOrder {
    #[serde(flatten)]
    pub order: Order,
    pub customer_name: String,
    pub customer_email: String,
}

/// A customer's request to send an item back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub id: ReturnId,
    pub order_id: OrderId,
    pub item_id: OrderItemId,
    #[serde(skip)]
    pub user_id: UserId,
    pub product_id: ProductId,
    pub reason: ReturnReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub status: ReturnStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Return request joined with the order and customer, for administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnView {
    #[serde(flatten)]
    pub request: ReturnRequest,
    pub order_number: String,
    pub user_email: String,
    pub product_name: String,
    pub size: String,
    pub quantity: i32,
    pub item_total: i64,
}

/// Everything that changes when an order line moves to a new status.
///
/// Adapters apply the whole change in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemChange {
    pub order_id: OrderId,
    pub item_id: OrderItemId,
    /// Status the line must still hold; the change is stale otherwise.
    pub expected: ItemStatus,
    pub status: ItemStatus,
    /// Units to put back on the shelf.
    pub restock: Option<Restock>,
    /// Wallet credit owed to the customer.
    pub refund: Option<i64>,
    /// Mark a pay-on-delivery order as collected.
    pub mark_paid: bool,
    /// Return request resolved by this change. It must still be open.
    pub resolve_return: Option<(ReturnId, ReturnStatus)>,
    pub at: DateTime<Utc>,
}

/// Stock to restore for a product size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restock {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: i32,
}

impl Restock {
    /// Restock everything on `item`.
    pub fn of(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id,
            size: item.size.clone(),
            quantity: item.quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{address_fields, now};
    use rstest::rstest;

    fn order(payment_status: PaymentStatus, coupon_amount: i64) -> Order {
        let id = OrderId::random();
        Order {
            id,
            order_number: new_order_number(id),
            user_id: UserId::random(),
            shipping_address: address_fields(),
            payment_method: PaymentMethod::Razorpay,
            payment_status,
            status: OrderStatus::Confirmed,
            gateway_order_id: None,
            gateway_payment_id: None,
            total_mrp: 2000,
            offer_discount: 0,
            coupon_id: None,
            coupon_code: None,
            coupon_amount,
            bill_amount: 2000 - coupon_amount,
            refunded_amount: 0,
            items: vec![OrderItem {
                id: OrderItemId::random(),
                product_id: ProductId::random(),
                product_name: "Trail runner".into(),
                brand_name: "Stride".into(),
                category_name: "Shoes".into(),
                thumbnail: "https://cdn.example.com/a.png".into(),
                size: "M".into(),
                quantity: 1,
                sale_price: 1000,
                unit_price: 1000,
                applied_offer_amount: 0,
                item_total: 1000,
                status: ItemStatus::Pending,
            }],
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn order_number_has_expected_shape() {
        let number = new_order_number(OrderId::random());
        assert!(number.starts_with("ORD-"));
        assert_eq!(number.len(), 12);
        assert!(number[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[rstest]
    #[case(ItemStatus::Pending, ItemStatus::Shipped, true)]
    #[case(ItemStatus::Pending, ItemStatus::Cancelled, true)]
    #[case(ItemStatus::Shipped, ItemStatus::Delivered, true)]
    #[case(ItemStatus::Shipped, ItemStatus::Cancelled, true)]
    #[case(ItemStatus::Pending, ItemStatus::Delivered, false)]
    #[case(ItemStatus::Delivered, ItemStatus::Cancelled, false)]
    #[case(ItemStatus::Cancelled, ItemStatus::Shipped, false)]
    fn admin_transitions(#[case] from: ItemStatus, #[case] to: ItemStatus, #[case] ok: bool) {
        assert_eq!(from.admin_transition(to).is_ok(), ok);
    }

    #[test]
    fn statuses_use_display_names_on_the_wire() {
        assert_eq!(
            serde_json::to_value(ItemStatus::ReturnRequested).expect("json"),
            "Return Requested"
        );
        assert_eq!(
            "return accepted".parse::<ItemStatus>().expect("parse"),
            ItemStatus::ReturnAccepted
        );
        assert!("Lost".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn damaged_returns_skip_restock() {
        let reason: ReturnReason = "Product arrived damaged or defective".parse().expect("reason");
        assert!(!reason.restocks());
        assert!(ReturnReason::ChangedMind.restocks());
    }

    #[rstest]
    #[case::unpaid(PaymentStatus::Pending, 0, 0)]
    #[case::paid(PaymentStatus::Success, 0, 1000)]
    #[case::paid_with_coupon(PaymentStatus::Success, 200, 900)]
    fn refunds_follow_payment_state(
        #[case] status: PaymentStatus,
        #[case] coupon: i64,
        #[case] expected: i64,
    ) {
        let order = order(status, coupon);
        let item = order.items.first().expect("item");
        assert_eq!(order.refund_for(item), expected);
    }
}
