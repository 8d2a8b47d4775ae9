//! Handler tests for customer and admin order routes.

use actix_web::http::StatusCode;
use actix_web::test;
use pagination::Page;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use crate::domain::address::Address;
use crate::domain::cart::Cart;
use crate::domain::fixtures;
use crate::domain::order::{CustomerOrder, ItemStatus, Order, OrderStatus, PaymentMethod};
use crate::domain::ports::GatewayOrder;
use crate::domain::user::User;
use crate::domain::{AddressId, OrderId, OrderItemId};
use crate::inbound::http::test_utils::{
    ADMIN_TOKEN, MockPorts, USER_TOKEN, bearer, test_app,
};

#[fixture]
fn user() -> User {
    fixtures::user("asha@example.com")
}

fn signed_in(user: &User) -> MockPorts {
    let mut ports = MockPorts::default();
    ports.sign_in_user(user);
    ports
}

/// A cart with two units of a 1000 product and one address on file.
fn ready_to_check_out(ports: &mut MockPorts, user: &User) {
    let user_id = user.id;
    let details = fixtures::product(1000, &[("M", 5)]);
    let product_id = details.product.id;
    ports.carts.expect_find().returning(move |_| {
        let mut cart = Cart::empty(user_id);
        cart.add(product_id, "M", 2);
        Ok(Some(cart))
    });
    ports.addresses.expect_find().returning(|owner, id| {
        Ok(Some(Address {
            id: *id,
            user_id: *owner,
            fields: fixtures::address_fields(),
            is_default: true,
            created_at: fixtures::now(),
            updated_at: fixtures::now(),
        }))
    });
    ports
        .products
        .expect_find_many()
        .returning(move |_| Ok(vec![details.clone()]));
}

fn serve_order(ports: &mut MockPorts, order: &Order) {
    let order = order.clone();
    ports
        .orders
        .expect_find()
        .returning(move |_| Ok(Some(order.clone())));
}

#[rstest]
#[case::no_address(json!({ "paymentMethod": "PayOnDelivery" }), "addressId")]
#[case::unknown_method(
    json!({ "addressId": "5f0c4a4e-1b7d-4c55-9a51-0d4c1d0e9a11", "paymentMethod": "Cheque" }),
    "paymentMethod"
)]
#[actix_web::test]
async fn placing_validates_the_body(user: User, #[case] body: Value, #[case] field: &str) {
    let app = test::init_service(test_app(signed_in(&user).into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/user/orders")
            .insert_header(bearer(USER_TOKEN))
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload: Value = test::read_body_json(response).await;
    assert_eq!(payload["details"]["field"], field);
}

#[rstest]
#[actix_web::test]
async fn pay_on_delivery_confirms_immediately(user: User) {
    let mut ports = signed_in(&user);
    ready_to_check_out(&mut ports, &user);
    ports
        .orders
        .expect_place_confirmed()
        .withf(|order, debit| order.bill_amount == 2000 && debit.is_none())
        .times(1)
        .returning(|_, _| Ok(()));
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/user/orders")
            .insert_header(bearer(USER_TOKEN))
            .set_json(json!({ "addressId": AddressId::random(), "paymentMethod": "payondelivery" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["order"]["status"], "Confirmed");
    assert_eq!(body["order"]["paymentMethod"], "PayOnDelivery");
    assert_eq!(body["order"]["billAmount"], 2000);
    assert!(body.get("payment").is_none());
}

#[rstest]
#[actix_web::test]
async fn online_payment_returns_a_checkout(user: User) {
    let mut ports = signed_in(&user);
    ready_to_check_out(&mut ports, &user);
    ports
        .gateway
        .expect_create_order()
        .withf(|amount, currency, receipt| {
            *amount == 200_000 && currency == "INR" && receipt.starts_with("ORD-")
        })
        .returning(|amount, currency, _| {
            Ok(GatewayOrder {
                gateway_order_id: "order_EKwxwAgItmmXdp".into(),
                amount,
                currency: currency.to_owned(),
                key_id: "rzp_test_key".into(),
            })
        });
    ports
        .orders
        .expect_insert_initiated()
        .withf(|order| order.status == OrderStatus::Initiated)
        .times(1)
        .returning(|_| Ok(()));
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/user/orders")
            .insert_header(bearer(USER_TOKEN))
            .set_json(json!({ "addressId": AddressId::random(), "paymentMethod": "Razorpay" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["order"]["status"], "Initiated");
    assert_eq!(body["order"]["gatewayOrderId"], "order_EKwxwAgItmmXdp");
    assert_eq!(body["payment"]["keyId"], "rzp_test_key");
    assert_eq!(body["payment"]["amount"], 200_000);
}

#[rstest]
#[actix_web::test]
async fn a_failed_checkout_marks_the_order_failed(user: User) {
    let mut ports = signed_in(&user);
    let mut order = fixtures::confirmed_order(
        user.id,
        PaymentMethod::Razorpay,
        vec![fixtures::order_item(ItemStatus::Pending, 1000)],
    );
    order.status = OrderStatus::Initiated;
    order.gateway_order_id = Some("order_EKwxwAgItmmXdp".into());
    serve_order(&mut ports, &order);
    let mut failed = order.clone();
    failed.status = OrderStatus::Failed;
    ports
        .orders
        .expect_fail_payment()
        .withf(|_, _, payment_id, refund, _| payment_id.is_none() && refund.is_none())
        .times(1)
        .returning(move |_, _, _, _, _| Ok(failed.clone()));
    ports.gateway.expect_verify_signature().never();
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/user/orders/{}/verify-payment", order.id))
            .insert_header(bearer(USER_TOKEN))
            .set_json(json!({
                "error": { "code": "BAD_REQUEST_ERROR", "metadata": { "order_id": "order_EKwxwAgItmmXdp" } }
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["status"], "Failed");
}

#[rstest]
#[actix_web::test]
async fn verification_needs_the_signature(user: User) {
    let app = test::init_service(test_app(signed_in(&user).into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/user/orders/{}/verify-payment", OrderId::random()))
            .insert_header(bearer(USER_TOKEN))
            .set_json(json!({
                "razorpayOrderId": "order_EKwxwAgItmmXdp",
                "razorpayPaymentId": "pay_29QQoUBi66xm2f"
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload: Value = test::read_body_json(response).await;
    assert_eq!(payload["details"]["field"], "razorpaySignature");
}

#[rstest]
#[actix_web::test]
async fn other_customers_orders_are_not_found(user: User) {
    let mut ports = signed_in(&user);
    let order = fixtures::confirmed_order(
        fixtures::user("someone@example.com").id,
        PaymentMethod::PayOnDelivery,
        vec![fixtures::order_item(ItemStatus::Pending, 1000)],
    );
    serve_order(&mut ports, &order);
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/user/orders/{}", order.id))
            .insert_header(bearer(USER_TOKEN))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn delivered_items_cannot_be_cancelled(user: User) {
    let mut ports = signed_in(&user);
    let line = fixtures::order_item(ItemStatus::Delivered, 1000);
    let item_id = line.id;
    let order = fixtures::confirmed_order(user.id, PaymentMethod::PayOnDelivery, vec![line]);
    serve_order(&mut ports, &order);
    ports.orders.expect_apply_item_change().never();
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/user/orders/{}/items/{item_id}/cancel", order.id))
            .insert_header(bearer(USER_TOKEN))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn delivered_items_can_be_returned(user: User) {
    let mut ports = signed_in(&user);
    let line = fixtures::order_item(ItemStatus::Delivered, 1000);
    let item_id = line.id;
    let order = fixtures::confirmed_order(user.id, PaymentMethod::PayOnDelivery, vec![line]);
    serve_order(&mut ports, &order);
    ports.orders.expect_find_return().returning(|_, _| Ok(None));
    ports
        .orders
        .expect_create_return()
        .withf(move |request| request.item_id == item_id && request.remarks.is_none())
        .times(1)
        .returning(|_| Ok(()));
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/user/orders/{}/items/{item_id}/return", order.id))
            .insert_header(bearer(USER_TOKEN))
            .set_json(json!({ "reason": "incorrect item received", "remarks": "  " }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["reason"], "Incorrect item received");
    assert_eq!(body["status"], "requested");
}

#[rstest]
#[actix_web::test]
async fn returns_need_a_known_reason(user: User) {
    let mut ports = signed_in(&user);
    let line = fixtures::order_item(ItemStatus::Delivered, 1000);
    let item_id = line.id;
    let order = fixtures::confirmed_order(user.id, PaymentMethod::PayOnDelivery, vec![line]);
    serve_order(&mut ports, &order);
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/user/orders/{}/items/{item_id}/return", order.id))
            .insert_header(bearer(USER_TOKEN))
            .set_json(json!({ "reason": "Bored" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload: Value = test::read_body_json(response).await;
    assert_eq!(payload["details"]["field"], "reason");
}

#[rstest]
#[actix_web::test]
async fn admins_filter_orders_by_status() {
    let mut ports = MockPorts::default();
    ports.sign_in_admin(&fixtures::admin("admin@example.com"));
    let customer = fixtures::user("asha@example.com");
    let order = fixtures::confirmed_order(
        customer.id,
        PaymentMethod::Wallet,
        vec![fixtures::order_item(ItemStatus::Shipped, 1500)],
    );
    ports
        .orders
        .expect_list_all()
        .withf(|status, page| *status == Some(OrderStatus::Confirmed) && page.limit() == 5)
        .returning(move |_, page| {
            Ok(Page::new(
                vec![CustomerOrder {
                    order: order.clone(),
                    customer_name: "Asha Menon".into(),
                    customer_email: customer.email.clone(),
                }],
                page,
                1,
            ))
        });
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/admin/orders?status=confirmed&limit=5")
            .insert_header(bearer(ADMIN_TOKEN))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["items"][0]["customerName"], "Asha Menon");
    assert_eq!(body["items"][0]["billAmount"], 1500);
}

#[rstest]
#[actix_web::test]
async fn admins_cannot_skip_shipping() {
    let mut ports = MockPorts::default();
    ports.sign_in_admin(&fixtures::admin("admin@example.com"));
    let line = fixtures::order_item(ItemStatus::Pending, 1000);
    let item_id = line.id;
    let order = fixtures::confirmed_order(
        fixtures::user("asha@example.com").id,
        PaymentMethod::PayOnDelivery,
        vec![line],
    );
    serve_order(&mut ports, &order);
    ports.orders.expect_apply_item_change().never();
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/admin/orders/{}/items/{item_id}/status", order.id))
            .insert_header(bearer(ADMIN_TOKEN))
            .set_json(json!({ "status": "Delivered" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload: Value = test::read_body_json(response).await;
    assert_eq!(payload["details"]["code"], "invalid_transition");
}

#[rstest]
#[actix_web::test]
async fn unknown_order_items_are_not_found() {
    let mut ports = MockPorts::default();
    ports.sign_in_admin(&fixtures::admin("admin@example.com"));
    let order = fixtures::confirmed_order(
        fixtures::user("asha@example.com").id,
        PaymentMethod::PayOnDelivery,
        vec![fixtures::order_item(ItemStatus::Pending, 1000)],
    );
    serve_order(&mut ports, &order);
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!(
                "/api/v1/admin/orders/{}/items/{}/status",
                order.id,
                OrderItemId::random()
            ))
            .insert_header(bearer(ADMIN_TOKEN))
            .set_json(json!({ "status": "Shipped" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
