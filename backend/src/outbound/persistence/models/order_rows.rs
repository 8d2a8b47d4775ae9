//! Rows for orders, order items and return requests.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::address::AddressFields;
use crate::domain::order::{
    ItemStatus, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, ReturnReason,
    ReturnRequest, ReturnStatus,
};
use crate::domain::ports::PersistenceError;
use crate::domain::{CouponId, OrderId, OrderItemId, ProductId, ReturnId, UserId};

use super::super::diesel_error_mapping::parse_column;
use super::super::schema::{order_items, orders, return_requests};

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub shipping_address: serde_json::Value,
    pub payment_method: String,
    pub payment_status: String,
    pub status: String,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub total_mrp: i64,
    pub offer_discount: i64,
    pub coupon_id: Option<Uuid>,
    pub coupon_code: Option<String>,
    pub coupon_amount: i64,
    pub bill_amount: i64,
    pub refunded_amount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn from_order(order: &Order) -> Result<Self, PersistenceError> {
        let shipping_address = serde_json::to_value(&order.shipping_address)
            .map_err(|err| PersistenceError::query(format!("address snapshot: {err}")))?;
        Ok(Self {
            id: *order.id.as_uuid(),
            order_number: order.order_number.clone(),
            user_id: *order.user_id.as_uuid(),
            shipping_address,
            payment_method: order.payment_method.as_str().to_owned(),
            payment_status: order.payment_status.as_str().to_owned(),
            status: order.status.as_str().to_owned(),
            gateway_order_id: order.gateway_order_id.clone(),
            gateway_payment_id: order.gateway_payment_id.clone(),
            total_mrp: order.total_mrp,
            offer_discount: order.offer_discount,
            coupon_id: order.coupon_id.map(Uuid::from),
            coupon_code: order.coupon_code.clone(),
            coupon_amount: order.coupon_amount,
            bill_amount: order.bill_amount,
            refunded_amount: order.refunded_amount,
            created_at: order.created_at,
            updated_at: order.updated_at,
        })
    }

    /// Assemble the domain order from this row and its items in position order.
    pub fn into_order(self, items: Vec<OrderItemRow>) -> Result<Order, PersistenceError> {
        let shipping_address: AddressFields = serde_json::from_value(self.shipping_address)
            .map_err(|err| PersistenceError::query(format!("address snapshot: {err}")))?;
        Ok(Order {
            id: OrderId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            shipping_address,
            payment_method: parse_column::<PaymentMethod>("orders.payment_method", &self.payment_method)?,
            payment_status: parse_column::<PaymentStatus>("orders.payment_status", &self.payment_status)?,
            status: parse_column::<OrderStatus>("orders.status", &self.status)?,
            order_number: self.order_number,
            gateway_order_id: self.gateway_order_id,
            gateway_payment_id: self.gateway_payment_id,
            total_mrp: self.total_mrp,
            offer_discount: self.offer_discount,
            coupon_id: self.coupon_id.map(CouponId::from_uuid),
            coupon_code: self.coupon_code,
            coupon_amount: self.coupon_amount,
            bill_amount: self.bill_amount,
            refunded_amount: self.refunded_amount,
            items: items
                .into_iter()
                .map(OrderItem::try_from)
                .collect::<Result<_, _>>()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub product_name: String,
    pub brand_name: String,
    pub category_name: String,
    pub thumbnail: String,
    pub size: String,
    pub quantity: i32,
    pub sale_price: i64,
    pub unit_price: i64,
    pub applied_offer_amount: i64,
    pub item_total: i64,
    pub status: String,
}

impl OrderItemRow {
    pub fn for_order(order: &Order) -> Vec<Self> {
        order
            .items
            .iter()
            .zip(0..)
            .map(|(item, position)| Self {
                id: *item.id.as_uuid(),
                order_id: *order.id.as_uuid(),
                position,
                product_id: *item.product_id.as_uuid(),
                product_name: item.product_name.clone(),
                brand_name: item.brand_name.clone(),
                category_name: item.category_name.clone(),
                thumbnail: item.thumbnail.clone(),
                size: item.size.clone(),
                quantity: item.quantity,
                sale_price: item.sale_price,
                unit_price: item.unit_price,
                applied_offer_amount: item.applied_offer_amount,
                item_total: item.item_total,
                status: item.status.as_str().to_owned(),
            })
            .collect()
    }
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = PersistenceError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderItemId::from_uuid(row.id),
            product_id: ProductId::from_uuid(row.product_id),
            status: parse_column::<ItemStatus>("order_items.status", &row.status)?,
            product_name: row.product_name,
            brand_name: row.brand_name,
            category_name: row.category_name,
            thumbnail: row.thumbnail,
            size: row.size,
            quantity: row.quantity,
            sale_price: row.sale_price,
            unit_price: row.unit_price,
            applied_offer_amount: row.applied_offer_amount,
            item_total: row.item_total,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = return_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReturnRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub item_id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub reason: String,
    pub remarks: Option<String>,
    pub status: String,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReturnRow> for ReturnRequest {
    type Error = PersistenceError;

    fn try_from(row: ReturnRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ReturnId::from_uuid(row.id),
            order_id: OrderId::from_uuid(row.order_id),
            item_id: OrderItemId::from_uuid(row.item_id),
            user_id: UserId::from_uuid(row.user_id),
            product_id: ProductId::from_uuid(row.product_id),
            reason: parse_column::<ReturnReason>("return_requests.reason", &row.reason)?,
            remarks: row.remarks,
            status: parse_column::<ReturnStatus>("return_requests.status", &row.status)?,
            resolved_at: row.resolved_at,
            created_at: row.created_at,
        })
    }
}

impl From<&ReturnRequest> for ReturnRow {
    fn from(request: &ReturnRequest) -> Self {
        Self {
            id: *request.id.as_uuid(),
            order_id: *request.order_id.as_uuid(),
            item_id: *request.item_id.as_uuid(),
            user_id: *request.user_id.as_uuid(),
            product_id: *request.product_id.as_uuid(),
            reason: request.reason.as_str().to_owned(),
            remarks: request.remarks.clone(),
            status: request.status.as_str().to_owned(),
            resolved_at: request.resolved_at,
            created_at: request.created_at,
        }
    }
}
