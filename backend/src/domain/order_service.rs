//! Checkout, payment reconciliation, cancellations and returns.
//!
//! Totals are always recomputed from the cart on the server. Every write
//! that touches more than the order row goes through one repository call so
//! the adapter can run it in a single transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use pagination::{Page, PageRequest};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::cart::{Cart, CartSummary, PricedLine};
use super::order::{
    CustomerOrder, ItemChange, ItemStatus, Order, OrderItem, OrderStatus, PaymentMethod,
    PaymentStatus, Restock, ReturnReason, ReturnRequest, ReturnStatus, ReturnView,
    new_order_number,
};
use super::ports::{
    AddressRepository, CartRepository, CouponRepository, GatewayOrder, OrderRepository,
    PaymentGateway, PaymentProof, PersistenceError, ProductRepository, WalletRepository,
};
use super::pricing::to_paise;
use super::promotion::Coupon;
use super::shopping_service::price_lines;
use super::wallet::{TransactionKind, WalletTransaction};
use super::{AddressId, Error, OrderId, OrderItemId, ReturnId, UserId};

/// Currency every gateway order is raised in.
pub const CURRENCY: &str = "INR";

/// Collaborators the order flow needs.
#[derive(Clone)]
pub struct OrderPorts {
    pub orders: Arc<dyn OrderRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub coupons: Arc<dyn CouponRepository>,
    pub addresses: Arc<dyn AddressRepository>,
    pub wallets: Arc<dyn WalletRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
}

/// What the client reports back from the gateway checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Checkout completed; the proof still has to be verified.
    Success(PaymentProof),
    /// Checkout was abandoned or declined.
    Failure,
}

/// A freshly placed order and, for online payment, the checkout to
/// complete.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<GatewayOrder>,
}

/// Order lifecycle for customers and administrators.
#[derive(Clone)]
pub struct OrderService {
    ports: OrderPorts,
    clock: Arc<dyn Clock>,
}

impl OrderService {
    pub fn new(ports: OrderPorts, clock: Arc<dyn Clock>) -> Self {
        Self { ports, clock }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    /// Reject lines that can no longer be bought in the requested quantity.
    fn check_lines(cart: &Cart, lines: &[PricedLine]) -> Result<(), Error> {
        if lines.len() != cart.lines.len() {
            return Err(Error::invalid_request(
                "a product in your cart is no longer available",
            ));
        }
        for priced in lines {
            let name = &priced.details.product.name;
            if !priced.details.is_purchasable() {
                return Err(Error::invalid_request(format!("{name} is no longer available")));
            }
            if priced.available() < priced.line.quantity {
                return Err(Error::invalid_request(format!(
                    "{name} in size {} does not have enough stock",
                    priced.line.size
                ))
                .with_details(json!({
                    "code": "insufficient_stock",
                    "product": name,
                    "size": priced.line.size,
                })));
            }
        }
        Ok(())
    }

    /// The cart's coupon when it can still be redeemed by `user_id` against
    /// `cart_total`.
    async fn usable_coupon(
        &self,
        cart: &Cart,
        user_id: UserId,
        cart_total: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Coupon>, Error> {
        let Some(id) = cart.applied_coupon_id else {
            return Ok(None);
        };
        let Some(coupon) = self.ports.coupons.find(&id).await? else {
            return Ok(None);
        };
        let used = self.ports.coupons.usage_count(&coupon.id, &user_id).await?;
        let usable = coupon.is_redeemable(now)
            && used < i64::from(coupon.usage_limit_per_user)
            && cart_total >= coupon.min_purchase_amount;
        if !usable {
            info!(%user_id, code = %coupon.code, "dropping unusable coupon at checkout");
            return Ok(None);
        }
        Ok(Some(coupon))
    }

    fn order_items(lines: &[PricedLine], now: DateTime<Utc>) -> Vec<OrderItem> {
        lines
            .iter()
            .map(|priced| {
                let details = &priced.details;
                let quantity = i64::from(priced.line.quantity);
                let unit_price = details.applicable_price(now);
                let applied_offer_amount = if details.active_offer(now).is_some() {
                    (details.product.sale_price - unit_price) * quantity
                } else {
                    0
                };
                OrderItem {
                    id: OrderItemId::random(),
                    product_id: details.product.id,
                    product_name: details.product.name.clone(),
                    brand_name: details.brand_name.clone(),
                    category_name: details.category_name.clone(),
                    thumbnail: details.product.thumbnail.clone(),
                    size: priced.line.size.clone(),
                    quantity: priced.line.quantity,
                    sale_price: details.product.sale_price,
                    unit_price,
                    applied_offer_amount,
                    item_total: unit_price * quantity,
                    status: ItemStatus::Pending,
                }
            })
            .collect()
    }

    /// Turn the customer's cart into an order.
    pub async fn place_order(
        &self,
        user_id: UserId,
        address_id: AddressId,
        method: PaymentMethod,
    ) -> Result<PlacedOrder, Error> {
        let now = self.now();
        let cart = self
            .ports
            .carts
            .find(&user_id)
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or_else(|| Error::invalid_request("cart is empty"))?;
        let address = self
            .ports
            .addresses
            .find(&user_id, &address_id)
            .await?
            .ok_or_else(|| Error::not_found("address not found"))?;
        let lines = price_lines(self.ports.products.as_ref(), &cart).await?;
        Self::check_lines(&cart, &lines)?;

        let cart_total = CartSummary::compute(&lines, None, now).cart_total;
        let coupon = self.usable_coupon(&cart, user_id, cart_total, now).await?;
        let summary = CartSummary::compute(&lines, coupon.as_ref(), now);

        let id = OrderId::random();
        let mut order = Order {
            id,
            order_number: new_order_number(id),
            user_id,
            shipping_address: address.fields,
            payment_method: method,
            payment_status: PaymentStatus::Pending,
            status: OrderStatus::Confirmed,
            gateway_order_id: None,
            gateway_payment_id: None,
            total_mrp: summary.total_mrp,
            offer_discount: summary.total_discount,
            coupon_id: coupon.as_ref().map(|coupon| coupon.id),
            coupon_code: coupon.as_ref().map(|coupon| coupon.code.clone()),
            coupon_amount: summary.coupon_discount,
            bill_amount: summary.total_amount,
            refunded_amount: 0,
            items: Self::order_items(&lines, now),
            created_at: now,
            updated_at: now,
        };

        let payment = match method {
            PaymentMethod::PayOnDelivery => {
                self.ports.orders.place_confirmed(&order, None).await?;
                None
            }
            PaymentMethod::Wallet => {
                let wallet = self
                    .ports
                    .wallets
                    .find(&user_id)
                    .await?
                    .ok_or_else(|| Error::invalid_request("wallet not found"))?;
                if wallet.balance < order.bill_amount {
                    return Err(Error::invalid_request("insufficient wallet balance")
                        .with_details(json!({ "code": "insufficient_balance" })));
                }
                order.payment_status = PaymentStatus::Success;
                let debit = WalletTransaction::settled(
                    user_id,
                    TransactionKind::Debit,
                    order.bill_amount,
                    format!("Payment for {}", order.order_number),
                    now,
                );
                self.ports.orders.place_confirmed(&order, Some(debit)).await?;
                None
            }
            PaymentMethod::Razorpay => {
                let checkout = self
                    .ports
                    .gateway
                    .create_order(to_paise(order.bill_amount), CURRENCY, &order.order_number)
                    .await?;
                order.status = OrderStatus::Initiated;
                order.gateway_order_id = Some(checkout.gateway_order_id.clone());
                self.ports.orders.insert_initiated(&order).await?;
                Some(checkout)
            }
        };
        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            method = %method,
            bill = order.bill_amount,
            "order placed"
        );
        Ok(PlacedOrder { order, payment })
    }

    async fn owned_order(&self, user_id: UserId, id: OrderId) -> Result<Order, Error> {
        self.ports
            .orders
            .find(&id)
            .await?
            .filter(|order| order.user_id == user_id)
            .ok_or_else(|| Error::not_found("order not found"))
    }

    /// Reconcile an online checkout with its order.
    ///
    /// A failed checkout marks the order failed and still succeeds. When stock
    /// ran out between checkout and verification the order fails, the amount
    /// paid goes to the wallet and a conflict is returned.
    pub async fn verify_payment(
        &self,
        user_id: UserId,
        order_id: OrderId,
        outcome: PaymentOutcome,
    ) -> Result<Order, Error> {
        let order = self.owned_order(user_id, order_id).await?;
        if order.status != OrderStatus::Initiated {
            return Err(Error::conflict("order is not awaiting payment"));
        }
        let now = self.now();
        let proof = match outcome {
            PaymentOutcome::Failure => {
                warn!(%order_id, "online payment failed");
                return Ok(self
                    .ports
                    .orders
                    .fail_payment(&order_id, PaymentStatus::Failed, None, None, now)
                    .await?);
            }
            PaymentOutcome::Success(proof) => proof,
        };
        if order.gateway_order_id.as_deref() != Some(proof.order_id.as_str()) {
            return Err(Error::invalid_request(
                "payment does not belong to this order",
            ));
        }
        if !self.ports.gateway.verify_signature(&proof)? {
            warn!(%order_id, "payment signature mismatch");
            return Err(Error::invalid_request("payment signature is invalid")
                .with_details(json!({ "code": "signature_mismatch" })));
        }
        match self
            .ports
            .orders
            .confirm_payment(&order_id, &proof.payment_id, now)
            .await
        {
            Ok(confirmed) => {
                info!(%order_id, "online payment confirmed");
                Ok(confirmed)
            }
            Err(PersistenceError::InsufficientStock { product, size }) => {
                let refund = WalletTransaction::settled(
                    user_id,
                    TransactionKind::Credit,
                    order.bill_amount,
                    format!("Refund for {}", order.order_number),
                    now,
                );
                self.ports
                    .orders
                    .fail_payment(
                        &order_id,
                        PaymentStatus::Success,
                        Some(proof.payment_id),
                        Some(refund),
                        now,
                    )
                    .await?;
                warn!(%order_id, %product, %size, "stock ran out before payment confirmation");
                Err(Error::conflict(format!(
                    "{product} in size {size} sold out; the amount was credited to your wallet"
                ))
                .with_details(json!({
                    "code": "insufficient_stock",
                    "product": product,
                    "size": size,
                    "refunded": order.bill_amount,
                })))
            }
            Err(other) => Err(other.into()),
        }
    }

    pub async fn orders(&self, user_id: UserId, page: PageRequest) -> Result<Page<Order>, Error> {
        Ok(self.ports.orders.list_for_user(&user_id, page).await?)
    }

    pub async fn order(&self, user_id: UserId, id: OrderId) -> Result<Order, Error> {
        self.owned_order(user_id, id).await
    }

    fn confirmed_item(order: &Order, item_id: OrderItemId) -> Result<&OrderItem, Error> {
        if !order.is_confirmed() {
            return Err(Error::invalid_request("order is not confirmed"));
        }
        order
            .item(item_id)
            .ok_or_else(|| Error::not_found("order item not found"))
    }

    fn cancellation(order: &Order, item: &OrderItem, at: DateTime<Utc>) -> ItemChange {
        let refund = order.refund_for(item);
        ItemChange {
            order_id: order.id,
            item_id: item.id,
            expected: item.status,
            status: ItemStatus::Cancelled,
            restock: Some(Restock::of(item)),
            refund: (refund > 0).then_some(refund),
            mark_paid: false,
            resolve_return: None,
            at,
        }
    }

    /// Cancel one of the customer's items, restocking and refunding it.
    pub async fn cancel_item(
        &self,
        user_id: UserId,
        order_id: OrderId,
        item_id: OrderItemId,
    ) -> Result<Order, Error> {
        let order = self.owned_order(user_id, order_id).await?;
        let item = Self::confirmed_item(&order, item_id)?;
        if !item.status.is_cancellable() {
            return Err(Error::invalid_request(format!(
                "an item that is {} cannot be cancelled",
                item.status
            )));
        }
        let change = Self::cancellation(&order, item, self.now());
        let updated = self.ports.orders.apply_item_change(&change).await?;
        info!(%order_id, %item_id, refund = change.refund.unwrap_or(0), "item cancelled by customer");
        Ok(updated)
    }

    /// Open a return for a delivered item.
    pub async fn request_return(
        &self,
        user_id: UserId,
        order_id: OrderId,
        item_id: OrderItemId,
        reason: &str,
        remarks: Option<String>,
    ) -> Result<ReturnRequest, Error> {
        let order = self.owned_order(user_id, order_id).await?;
        let item = Self::confirmed_item(&order, item_id)?;
        if item.status != ItemStatus::Delivered {
            return Err(Error::invalid_request("only delivered items can be returned"));
        }
        let reason: ReturnReason = reason.parse()?;
        if let Some(existing) = self.ports.orders.find_return(&order_id, &item_id).await?
            && existing.status == ReturnStatus::Requested
        {
            return Err(Error::conflict("a return is already open for this item"));
        }
        let request = ReturnRequest {
            id: ReturnId::random(),
            order_id,
            item_id,
            user_id,
            product_id: item.product_id,
            reason,
            remarks: remarks
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty()),
            status: ReturnStatus::Requested,
            resolved_at: None,
            created_at: self.now(),
        };
        self.ports.orders.create_return(&request).await?;
        info!(%order_id, %item_id, reason = %reason, "return requested");
        Ok(request)
    }

    // Administration

    pub async fn all_orders(
        &self,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<CustomerOrder>, Error> {
        Ok(self.ports.orders.list_all(status, page).await?)
    }

    pub async fn admin_order(&self, id: OrderId) -> Result<CustomerOrder, Error> {
        self.ports
            .orders
            .find_with_customer(&id)
            .await?
            .ok_or_else(|| Error::not_found("order not found"))
    }

    async fn any_order(&self, id: OrderId) -> Result<Order, Error> {
        self.ports
            .orders
            .find(&id)
            .await?
            .ok_or_else(|| Error::not_found("order not found"))
    }

    /// Move an item along the fulfilment flow.
    pub async fn update_item_status(
        &self,
        order_id: OrderId,
        item_id: OrderItemId,
        to: ItemStatus,
    ) -> Result<Order, Error> {
        let order = self.any_order(order_id).await?;
        let item = Self::confirmed_item(&order, item_id)?;
        let status = item.status.admin_transition(to)?;
        let now = self.now();
        let change = if status == ItemStatus::Cancelled {
            Self::cancellation(&order, item, now)
        } else {
            ItemChange {
                order_id,
                item_id,
                expected: item.status,
                status,
                restock: None,
                refund: None,
                mark_paid: status == ItemStatus::Delivered
                    && order.payment_method == PaymentMethod::PayOnDelivery
                    && order.payment_status == PaymentStatus::Pending,
                resolve_return: None,
                at: now,
            }
        };
        let updated = self.ports.orders.apply_item_change(&change).await?;
        info!(%order_id, %item_id, status = %status, "item status changed");
        Ok(updated)
    }

    pub async fn returns(
        &self,
        status: Option<ReturnStatus>,
        page: PageRequest,
    ) -> Result<Page<ReturnView>, Error> {
        Ok(self.ports.orders.list_returns(status, page).await?)
    }

    /// Approve or reject an open return.
    pub async fn resolve_return(
        &self,
        order_id: OrderId,
        item_id: OrderItemId,
        decision: ReturnStatus,
    ) -> Result<Order, Error> {
        if decision == ReturnStatus::Requested {
            return Err(Error::invalid_request("status must be approved or rejected")
                .with_details(json!({ "field": "status", "code": "invalid_value" })));
        }
        let order = self.any_order(order_id).await?;
        let item = order
            .item(item_id)
            .ok_or_else(|| Error::not_found("order item not found"))?;
        let request = self
            .ports
            .orders
            .find_return(&order_id, &item_id)
            .await?
            .ok_or_else(|| Error::not_found("return request not found"))?;
        if request.status != ReturnStatus::Requested {
            return Err(Error::conflict("return request is already resolved"));
        }
        let now = self.now();
        let change = if decision == ReturnStatus::Approved {
            let refund = order.refund_for(item);
            ItemChange {
                order_id,
                item_id,
                expected: item.status,
                status: ItemStatus::ReturnAccepted,
                restock: request.reason.restocks().then(|| Restock::of(item)),
                refund: (refund > 0).then_some(refund),
                mark_paid: false,
                resolve_return: Some((request.id, decision)),
                at: now,
            }
        } else {
            ItemChange {
                order_id,
                item_id,
                expected: item.status,
                status: ItemStatus::ReturnRejected,
                restock: None,
                refund: None,
                mark_paid: false,
                resolve_return: Some((request.id, decision)),
                at: now,
            }
        };
        let updated = self.ports.orders.apply_item_change(&change).await?;
        info!(%order_id, %item_id, decision = %decision, "return resolved");
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "order_service_tests.rs"]
mod tests;
