//! Tests for checkout, payment verification, cancellation and returns.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Duration;
use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::address::Address;
use crate::domain::fixtures::{
    address_fields, clock, confirmed_order, coupon, now, order_item, product, with_offer,
};
use crate::domain::catalog::ProductDetails;
use crate::domain::ports::{
    MockAddressRepository, MockCartRepository, MockCouponRepository, MockOrderRepository,
    MockPaymentGateway, MockProductRepository, MockWalletRepository,
};
use crate::domain::wallet::Wallet;
use crate::domain::{CouponId, ProductId};

#[derive(Default)]
struct Harness {
    orders: MockOrderRepository,
    carts: MockCartRepository,
    products: MockProductRepository,
    coupons: MockCouponRepository,
    addresses: MockAddressRepository,
    wallets: MockWalletRepository,
    gateway: MockPaymentGateway,
}

impl Harness {
    /// A customer whose cart holds `lines` and who owns one address.
    fn checkout(user_id: UserId, lines: Vec<(ProductDetails, i32)>, coupon: Option<Coupon>) -> Self {
        let mut harness = Self::default();
        let mut cart = Cart::empty(user_id);
        for (details, quantity) in &lines {
            let size = details
                .product
                .stock
                .first()
                .map(|entry| entry.size.clone())
                .unwrap_or_default();
            cart.add(details.product.id, &size, *quantity);
        }
        cart.applied_coupon_id = coupon.as_ref().map(|c| c.id);
        harness.carts.expect_find().return_once(move |_| Ok(Some(cart)));
        harness.addresses.expect_find().returning(move |owner, id| {
            Ok(Some(Address {
                id: *id,
                user_id: *owner,
                fields: address_fields(),
                is_default: true,
                created_at: now(),
                updated_at: now(),
            }))
        });
        let catalog: Vec<ProductDetails> = lines.into_iter().map(|(details, _)| details).collect();
        harness.products.expect_find_many().returning(move |ids| {
            Ok(catalog
                .iter()
                .filter(|details| ids.contains(&details.product.id))
                .cloned()
                .collect())
        });
        if let Some(coupon) = coupon {
            harness.coupons.expect_find().return_once(move |_| Ok(Some(coupon)));
            harness.coupons.expect_usage_count().return_once(|_, _| Ok(0));
        }
        harness
    }

    fn build(self) -> OrderService {
        OrderService::new(
            OrderPorts {
                orders: Arc::new(self.orders),
                carts: Arc::new(self.carts),
                products: Arc::new(self.products),
                coupons: Arc::new(self.coupons),
                addresses: Arc::new(self.addresses),
                wallets: Arc::new(self.wallets),
                gateway: Arc::new(self.gateway),
            },
            clock(),
        )
    }
}

fn serve_order(orders: &mut MockOrderRepository, order: Order) {
    orders.expect_find().returning(move |_| Ok(Some(order.clone())));
}

fn echo_change(orders: &mut MockOrderRepository, order: Order, check: impl Fn(&ItemChange) -> bool + Send + 'static) {
    orders
        .expect_apply_item_change()
        .withf(move |change| check(change))
        .times(1)
        .returning(move |_| Ok(order.clone()));
}

#[tokio::test]
async fn pay_on_delivery_prices_offers_and_coupon() {
    let user_id = UserId::random();
    let shoe = with_offer(product(2000, &[("M", 5)]), 10, 1800);
    let save = coupon("SAVE10", 10, 150, 1000);
    let mut harness = Harness::checkout(user_id, vec![(shoe, 2)], Some(save));
    harness
        .orders
        .expect_place_confirmed()
        .withf(|order, debit| debit.is_none() && order.coupon_code.as_deref() == Some("SAVE10"))
        .times(1)
        .returning(|_, _| Ok(()));

    let placed = harness
        .build()
        .place_order(user_id, AddressId::random(), PaymentMethod::PayOnDelivery)
        .await
        .expect("placed");

    let order = placed.order;
    assert!(placed.payment.is_none());
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.total_mrp, 4000);
    assert_eq!(order.offer_discount, 400);
    assert_eq!(order.coupon_amount, 150);
    assert_eq!(order.bill_amount, 3450);
    let line = order.items.first().expect("one item");
    assert_eq!((line.unit_price, line.applied_offer_amount, line.item_total), (1800, 400, 3600));
    assert!(order.order_number.starts_with("ORD-"));
}

#[tokio::test]
async fn expired_coupon_is_dropped_at_checkout() {
    let user_id = UserId::random();
    let mut stale = coupon("OLDIE", 10, 150, 100);
    stale.expiration_date = now() - Duration::days(1);
    let mut harness = Harness::checkout(user_id, vec![(product(1000, &[("M", 5)]), 1)], Some(stale));
    harness.orders.expect_place_confirmed().returning(|_, _| Ok(()));

    let placed = harness
        .build()
        .place_order(user_id, AddressId::random(), PaymentMethod::PayOnDelivery)
        .await
        .expect("placed");
    assert_eq!(placed.order.coupon_amount, 0);
    assert!(placed.order.coupon_id.is_none());
    assert_eq!(placed.order.bill_amount, 1000);
}

#[tokio::test]
async fn checkout_rechecks_stock() {
    let user_id = UserId::random();
    let mut shoe = product(1000, &[("M", 5)]);
    let mut harness = Harness::checkout(user_id, vec![(shoe.clone(), 3)], None);
    // Stock drops after the line was added.
    shoe.product.stock = vec![crate::domain::catalog::StockEntry { size: "M".into(), stock: 2 }];
    harness.products = MockProductRepository::new();
    harness
        .products
        .expect_find_many()
        .return_once(move |_| Ok(vec![shoe]));
    harness.orders.expect_place_confirmed().never();

    let error = harness
        .build()
        .place_order(user_id, AddressId::random(), PaymentMethod::PayOnDelivery)
        .await
        .expect_err("short on stock");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        error.details().and_then(|d| d.get("code")),
        Some(&serde_json::json!("insufficient_stock"))
    );
}

#[tokio::test]
async fn empty_cart_cannot_be_ordered() {
    let mut harness = Harness::default();
    harness
        .carts
        .expect_find()
        .return_once(|user_id| Ok(Some(Cart::empty(*user_id))));
    let error = harness
        .build()
        .place_order(UserId::random(), AddressId::random(), PaymentMethod::Wallet)
        .await
        .expect_err("empty");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case::short(500, false)]
#[case::enough(5000, true)]
#[tokio::test]
async fn wallet_payment_needs_balance(#[case] balance: i64, #[case] succeeds: bool) {
    let user_id = UserId::random();
    let mut harness = Harness::checkout(user_id, vec![(product(1000, &[("M", 5)]), 1)], None);
    harness.wallets.expect_find().return_once(move |owner| {
        Ok(Some(Wallet {
            user_id: *owner,
            balance,
            created_at: now(),
            updated_at: now(),
        }))
    });
    harness
        .orders
        .expect_place_confirmed()
        .withf(|order, debit| {
            order.payment_status == PaymentStatus::Success
                && debit.as_ref().is_some_and(|tx| {
                    tx.amount == 1000 && tx.kind == TransactionKind::Debit
                })
        })
        .times(usize::from(succeeds))
        .returning(|_, _| Ok(()));

    let result = harness
        .build()
        .place_order(user_id, AddressId::random(), PaymentMethod::Wallet)
        .await;
    assert_eq!(result.is_ok(), succeeds);
}

#[tokio::test]
async fn online_payment_waits_for_verification() {
    let user_id = UserId::random();
    let mut harness = Harness::checkout(user_id, vec![(product(1499, &[("M", 5)]), 1)], None);
    harness
        .gateway
        .expect_create_order()
        .withf(|amount, currency, receipt| {
            *amount == 149_900 && currency == "INR" && receipt.starts_with("ORD-")
        })
        .return_once(|amount, currency, _| {
            Ok(GatewayOrder {
                gateway_order_id: "order_gw_1".into(),
                amount,
                currency: currency.to_owned(),
                key_id: "rzp_test".into(),
            })
        });
    harness
        .orders
        .expect_insert_initiated()
        .withf(|order| {
            order.status == OrderStatus::Initiated
                && order.gateway_order_id.as_deref() == Some("order_gw_1")
        })
        .times(1)
        .returning(|_| Ok(()));
    harness.orders.expect_place_confirmed().never();

    let placed = harness
        .build()
        .place_order(user_id, AddressId::random(), PaymentMethod::Razorpay)
        .await
        .expect("placed");
    assert_eq!(placed.payment.map(|p| p.amount), Some(149_900));
}

fn initiated(user_id: UserId) -> Order {
    let mut order = confirmed_order(user_id, PaymentMethod::Razorpay, vec![order_item(ItemStatus::Pending, 1000)]);
    order.status = OrderStatus::Initiated;
    order.gateway_order_id = Some("order_gw_1".into());
    order
}

fn proof(order_id: &str) -> PaymentOutcome {
    PaymentOutcome::Success(PaymentProof {
        order_id: order_id.into(),
        payment_id: "pay_1".into(),
        signature: "sig".into(),
    })
}

#[tokio::test]
async fn verification_rejects_settled_orders() {
    let user_id = UserId::random();
    let order = confirmed_order(user_id, PaymentMethod::Razorpay, vec![order_item(ItemStatus::Pending, 1000)]);
    let id = order.id;
    let mut harness = Harness::default();
    serve_order(&mut harness.orders, order);

    let error = harness
        .build()
        .verify_payment(user_id, id, proof("order_gw_1"))
        .await
        .expect_err("already confirmed");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn verification_of_someone_elses_order_is_not_found() {
    let order = initiated(UserId::random());
    let id = order.id;
    let mut harness = Harness::default();
    serve_order(&mut harness.orders, order);

    let error = harness
        .build()
        .verify_payment(UserId::random(), id, PaymentOutcome::Failure)
        .await
        .expect_err("not owned");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn bad_signature_is_rejected() {
    let user_id = UserId::random();
    let order = initiated(user_id);
    let id = order.id;
    let mut harness = Harness::default();
    serve_order(&mut harness.orders, order);
    harness.gateway.expect_verify_signature().return_once(|_| Ok(false));
    harness.orders.expect_confirm_payment().never();

    let error = harness
        .build()
        .verify_payment(user_id, id, proof("order_gw_1"))
        .await
        .expect_err("bad signature");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn failed_checkout_marks_order_failed() {
    let user_id = UserId::random();
    let order = initiated(user_id);
    let id = order.id;
    let mut failed = order.clone();
    failed.status = OrderStatus::Failed;
    failed.payment_status = PaymentStatus::Failed;
    let mut harness = Harness::default();
    serve_order(&mut harness.orders, order);
    harness
        .orders
        .expect_fail_payment()
        .withf(|_, status, payment, refund, _| {
            *status == PaymentStatus::Failed && payment.is_none() && refund.is_none()
        })
        .return_once(move |_, _, _, _, _| Ok(failed));

    let result = harness
        .build()
        .verify_payment(user_id, id, PaymentOutcome::Failure)
        .await
        .expect("recorded");
    assert_eq!(result.status, OrderStatus::Failed);
}

#[tokio::test]
async fn sold_out_during_payment_refunds_to_wallet() {
    let user_id = UserId::random();
    let order = initiated(user_id);
    let id = order.id;
    let failed = order.clone();
    let mut harness = Harness::default();
    serve_order(&mut harness.orders, order);
    harness.gateway.expect_verify_signature().return_once(|_| Ok(true));
    harness.orders.expect_confirm_payment().return_once(|_, _, _| {
        Err(PersistenceError::insufficient_stock("Trail runner", "M"))
    });
    harness
        .orders
        .expect_fail_payment()
        .withf(|_, status, payment, refund, _| {
            *status == PaymentStatus::Success
                && payment.as_deref() == Some("pay_1")
                && refund.as_ref().is_some_and(|tx| tx.amount == 1000)
        })
        .times(1)
        .return_once(move |_, _, _, _, _| Ok(failed));

    let error = harness
        .build()
        .verify_payment(user_id, id, proof("order_gw_1"))
        .await
        .expect_err("sold out");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn cancelling_paid_item_refunds_proportionally() {
    let user_id = UserId::random();
    let line = order_item(ItemStatus::Shipped, 1000);
    let item_id = line.id;
    let mut order = confirmed_order(user_id, PaymentMethod::Wallet, vec![line, order_item(ItemStatus::Pending, 1000)]);
    order.payment_status = PaymentStatus::Success;
    order.coupon_id = Some(CouponId::random());
    order.coupon_amount = 200;
    order.bill_amount = 1800;
    let id = order.id;
    let mut harness = Harness::default();
    serve_order(&mut harness.orders, order.clone());
    echo_change(&mut harness.orders, order, |change| {
        change.expected == ItemStatus::Shipped
            && change.status == ItemStatus::Cancelled
            && change.refund == Some(900)
            && change.restock.as_ref().is_some_and(|r| r.quantity == 1)
    });

    harness
        .build()
        .cancel_item(user_id, id, item_id)
        .await
        .expect("cancelled");
}

#[tokio::test]
async fn concurrent_cancels_refund_once() {
    let user_id = UserId::random();
    let line = order_item(ItemStatus::Pending, 1000);
    let item_id = line.id;
    let mut order = confirmed_order(user_id, PaymentMethod::Wallet, vec![line]);
    order.payment_status = PaymentStatus::Success;
    let id = order.id;
    let mut harness = Harness::default();
    serve_order(&mut harness.orders, order.clone());
    let applied = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&applied);
    harness
        .orders
        .expect_apply_item_change()
        .withf(|change| change.expected == ItemStatus::Pending && change.refund == Some(1000))
        .times(2)
        .returning(move |change| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(order.clone())
            } else {
                Err(PersistenceError::stale(format!(
                    "item {} is no longer {}",
                    change.item_id, change.expected
                )))
            }
        });
    let service = harness.build();

    let (first, second) = tokio::join!(
        service.cancel_item(user_id, id, item_id),
        service.cancel_item(user_id, id, item_id),
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
    let error = outcomes
        .into_iter()
        .find_map(Result::err)
        .expect("one cancel loses");
    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(applied.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn delivered_item_cannot_be_cancelled() {
    let user_id = UserId::random();
    let line = order_item(ItemStatus::Delivered, 1000);
    let item_id = line.id;
    let order = confirmed_order(user_id, PaymentMethod::PayOnDelivery, vec![line]);
    let id = order.id;
    let mut harness = Harness::default();
    serve_order(&mut harness.orders, order);
    harness.orders.expect_apply_item_change().never();

    let error = harness
        .build()
        .cancel_item(user_id, id, item_id)
        .await
        .expect_err("delivered");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn unpaid_cancellation_has_no_refund() {
    let user_id = UserId::random();
    let line = order_item(ItemStatus::Pending, 1000);
    let item_id = line.id;
    let order = confirmed_order(user_id, PaymentMethod::PayOnDelivery, vec![line]);
    let id = order.id;
    let mut harness = Harness::default();
    serve_order(&mut harness.orders, order.clone());
    echo_change(&mut harness.orders, order, |change| change.refund.is_none());

    harness
        .build()
        .cancel_item(user_id, id, item_id)
        .await
        .expect("cancelled");
}

#[rstest]
#[case::not_delivered(ItemStatus::Shipped, "Other Reason", None, ErrorCode::InvalidRequest)]
#[case::bad_reason(ItemStatus::Delivered, "Too expensive", None, ErrorCode::InvalidRequest)]
#[case::already_open(ItemStatus::Delivered, "Other Reason", Some(ReturnStatus::Requested), ErrorCode::Conflict)]
#[tokio::test]
async fn return_request_rules(
    #[case] status: ItemStatus,
    #[case] reason: &str,
    #[case] existing: Option<ReturnStatus>,
    #[case] expected: ErrorCode,
) {
    let user_id = UserId::random();
    let line = order_item(status, 1000);
    let item_id = line.id;
    let order = confirmed_order(user_id, PaymentMethod::PayOnDelivery, vec![line]);
    let id = order.id;
    let mut harness = Harness::default();
    serve_order(&mut harness.orders, order);
    harness.orders.expect_find_return().returning(move |order_id, item_id| {
        Ok(existing.map(|status| ReturnRequest {
            id: ReturnId::random(),
            order_id: *order_id,
            item_id: *item_id,
            user_id,
            product_id: ProductId::random(),
            reason: ReturnReason::Other,
            remarks: None,
            status,
            resolved_at: None,
            created_at: now(),
        }))
    });
    harness.orders.expect_create_return().never();

    let error = harness
        .build()
        .request_return(user_id, id, item_id, reason, None)
        .await
        .expect_err("rejected");
    assert_eq!(error.code(), expected);
}

#[tokio::test]
async fn return_after_rejection_can_be_reopened() {
    let user_id = UserId::random();
    let line = order_item(ItemStatus::Delivered, 1000);
    let item_id = line.id;
    let order = confirmed_order(user_id, PaymentMethod::PayOnDelivery, vec![line]);
    let id = order.id;
    let mut harness = Harness::default();
    serve_order(&mut harness.orders, order);
    harness.orders.expect_find_return().return_once(|_, _| Ok(None));
    harness
        .orders
        .expect_create_return()
        .withf(|request| request.reason == ReturnReason::PoorFit && request.remarks.is_none())
        .times(1)
        .returning(|_| Ok(()));

    let request = harness
        .build()
        .request_return(user_id, id, item_id, "product does not fit as expected", Some("  ".into()))
        .await
        .expect("requested");
    assert_eq!(request.status, ReturnStatus::Requested);
}

#[tokio::test]
async fn delivering_cash_order_marks_it_paid() {
    let line = order_item(ItemStatus::Shipped, 1000);
    let item_id = line.id;
    let order = confirmed_order(UserId::random(), PaymentMethod::PayOnDelivery, vec![line]);
    let id = order.id;
    let mut harness = Harness::default();
    serve_order(&mut harness.orders, order.clone());
    echo_change(&mut harness.orders, order, |change| {
        change.status == ItemStatus::Delivered && change.mark_paid && change.restock.is_none()
    });

    harness
        .build()
        .update_item_status(id, item_id, ItemStatus::Delivered)
        .await
        .expect("delivered");
}

#[tokio::test]
async fn admin_cannot_skip_shipping() {
    let line = order_item(ItemStatus::Pending, 1000);
    let item_id = line.id;
    let order = confirmed_order(UserId::random(), PaymentMethod::PayOnDelivery, vec![line]);
    let id = order.id;
    let mut harness = Harness::default();
    serve_order(&mut harness.orders, order);

    let error = harness
        .build()
        .update_item_status(id, item_id, ItemStatus::Delivered)
        .await
        .expect_err("skips shipping");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

fn open_return(order: &Order, item_id: OrderItemId, reason: ReturnReason, status: ReturnStatus) -> ReturnRequest {
    ReturnRequest {
        id: ReturnId::random(),
        order_id: order.id,
        item_id,
        user_id: order.user_id,
        product_id: ProductId::random(),
        reason,
        remarks: None,
        status,
        resolved_at: None,
        created_at: now(),
    }
}

#[rstest]
#[case::damaged(ReturnReason::Damaged, false)]
#[case::fit(ReturnReason::PoorFit, true)]
#[tokio::test]
async fn approving_return_restocks_unless_damaged(#[case] reason: ReturnReason, #[case] restocks: bool) {
    let line = order_item(ItemStatus::ReturnRequested, 1000);
    let item_id = line.id;
    let mut order = confirmed_order(UserId::random(), PaymentMethod::PayOnDelivery, vec![line]);
    order.payment_status = PaymentStatus::Success;
    let id = order.id;
    let request = open_return(&order, item_id, reason, ReturnStatus::Requested);
    let request_id = request.id;
    let mut harness = Harness::default();
    serve_order(&mut harness.orders, order.clone());
    harness
        .orders
        .expect_find_return()
        .return_once(move |_, _| Ok(Some(request)));
    echo_change(&mut harness.orders, order, move |change| {
        change.expected == ItemStatus::ReturnRequested
            && change.status == ItemStatus::ReturnAccepted
            && change.restock.is_some() == restocks
            && change.refund == Some(1000)
            && change.resolve_return == Some((request_id, ReturnStatus::Approved))
    });

    harness
        .build()
        .resolve_return(id, item_id, ReturnStatus::Approved)
        .await
        .expect("approved");
}

#[tokio::test]
async fn resolving_twice_conflicts() {
    let line = order_item(ItemStatus::ReturnAccepted, 1000);
    let item_id = line.id;
    let order = confirmed_order(UserId::random(), PaymentMethod::PayOnDelivery, vec![line]);
    let id = order.id;
    let request = open_return(&order, item_id, ReturnReason::Other, ReturnStatus::Approved);
    let mut harness = Harness::default();
    serve_order(&mut harness.orders, order);
    harness
        .orders
        .expect_find_return()
        .return_once(move |_, _| Ok(Some(request)));
    harness.orders.expect_apply_item_change().never();

    let error = harness
        .build()
        .resolve_return(id, item_id, ReturnStatus::Rejected)
        .await
        .expect_err("resolved");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn resolution_must_be_a_decision() {
    let error = Harness::default()
        .build()
        .resolve_return(OrderId::random(), OrderItemId::random(), ReturnStatus::Requested)
        .await
        .expect_err("not a decision");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}
