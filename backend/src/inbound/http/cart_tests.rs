//! Handler tests for the shopping cart.

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use crate::domain::cart::Cart;
use crate::domain::catalog::ProductDetails;
use crate::domain::fixtures;
use crate::domain::user::User;
use crate::domain::CartItemId;
use crate::inbound::http::test_utils::{MockPorts, USER_TOKEN, bearer, test_app};

#[fixture]
fn user() -> User {
    fixtures::user("asha@example.com")
}

fn signed_in(user: &User) -> MockPorts {
    let mut ports = MockPorts::default();
    ports.sign_in_user(user);
    ports
}

fn stock_products(ports: &mut MockPorts, details: &ProductDetails) {
    let found = details.clone();
    ports
        .products
        .expect_find()
        .returning(move |_| Ok(Some(found.clone())));
    let many = details.clone();
    ports
        .products
        .expect_find_many()
        .returning(move |_| Ok(vec![many.clone()]));
}

#[rstest]
#[actix_web::test]
async fn adding_creates_the_cart_and_normalises_the_size(user: User) {
    let mut ports = signed_in(&user);
    let details = fixtures::with_offer(fixtures::product(1000, &[("M", 5)]), 20, 800);
    let product_id = details.product.id;
    stock_products(&mut ports, &details);
    ports.carts.expect_find().returning(|_| Ok(None));
    ports
        .carts
        .expect_save()
        .withf(move |cart| {
            cart.lines.len() == 1 && cart.lines[0].size == "M" && cart.lines[0].quantity == 2
        })
        .times(1)
        .returning(|_| Ok(()));
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/user/cart/items")
            .insert_header(bearer(USER_TOKEN))
            .set_json(json!({ "productId": product_id, "size": " m ", "quantity": 2 }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["items"][0]["unitPrice"], 800);
    assert_eq!(body["summary"]["cartTotal"], 1600);
    assert_eq!(body["summary"]["totalMRP"], 2000);
    assert_eq!(body["summary"]["totalDiscount"], 400);
    assert_eq!(body["summary"]["totalAmount"], 1600);
}

#[rstest]
#[actix_web::test]
async fn adding_more_than_the_stock_is_rejected(user: User) {
    let user_id = user.id;
    let mut ports = signed_in(&user);
    let details = fixtures::product(1000, &[("M", 3)]);
    let product_id = details.product.id;
    stock_products(&mut ports, &details);
    ports.carts.expect_find().returning(move |_| {
        let mut cart = Cart::empty(user_id);
        cart.add(product_id, "M", 2);
        Ok(Some(cart))
    });
    ports.carts.expect_save().never();
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/user/cart/items")
            .insert_header(bearer(USER_TOKEN))
            .set_json(json!({ "productId": product_id, "size": "M", "quantity": 2 }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload: Value = test::read_body_json(response).await;
    assert_eq!(payload["details"]["code"], "insufficient_stock");
}

#[rstest]
#[case::no_product(json!({ "size": "M", "quantity": 1 }), "productId")]
#[case::no_quantity(json!({ "productId": "5f0c4a4e-1b7d-4c55-9a51-0d4c1d0e9a11", "size": "M" }), "quantity")]
#[case::zero_quantity(json!({ "productId": "5f0c4a4e-1b7d-4c55-9a51-0d4c1d0e9a11", "size": "M", "quantity": 0 }), "quantity")]
#[actix_web::test]
async fn adding_validates_the_body(user: User, #[case] body: Value, #[case] field: &str) {
    let app = test::init_service(test_app(signed_in(&user).into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/user/cart/items")
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
async fn reading_the_cart_trims_quantities_to_stock(user: User) {
    let user_id = user.id;
    let mut ports = signed_in(&user);
    let details = fixtures::product(1000, &[("M", 1)]);
    let product_id = details.product.id;
    stock_products(&mut ports, &details);
    ports.carts.expect_find().returning(move |_| {
        let mut cart = Cart::empty(user_id);
        cart.add(product_id, "M", 3);
        Ok(Some(cart))
    });
    ports
        .carts
        .expect_save()
        .withf(|cart| cart.lines[0].quantity == 1)
        .times(1)
        .returning(|_| Ok(()));
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/user/cart")
            .insert_header(bearer(USER_TOKEN))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["stockAdjusted"], true);
    assert_eq!(body["items"][0]["quantity"], 1);
}

#[rstest]
#[actix_web::test]
async fn missing_cart_is_not_found(user: User) {
    let mut ports = signed_in(&user);
    ports.carts.expect_find().returning(|_| Ok(None));
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/user/cart")
            .insert_header(bearer(USER_TOKEN))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn updating_needs_a_quantity_or_size(user: User) {
    let app = test::init_service(test_app(signed_in(&user).into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/user/cart/items/{}", CartItemId::random()))
            .insert_header(bearer(USER_TOKEN))
            .set_json(json!({}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn removing_an_unknown_line_is_not_found(user: User) {
    let user_id = user.id;
    let mut ports = signed_in(&user);
    ports
        .carts
        .expect_find()
        .returning(move |_| Ok(Some(Cart::empty(user_id))));
    ports.carts.expect_save().never();
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/user/cart/items/{}", CartItemId::random()))
            .insert_header(bearer(USER_TOKEN))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn clearing_empties_lines_and_coupon(user: User) {
    let user_id = user.id;
    let mut ports = signed_in(&user);
    let details = fixtures::product(1000, &[("M", 4)]);
    let product_id = details.product.id;
    let coupon_id = fixtures::coupon("SAVE10", 10, 100, 500).id;
    ports.carts.expect_find().returning(move |_| {
        let mut cart = Cart::empty(user_id);
        cart.add(product_id, "M", 1);
        cart.applied_coupon_id = Some(coupon_id);
        Ok(Some(cart))
    });
    ports
        .carts
        .expect_save()
        .withf(|cart| cart.is_empty() && cart.applied_coupon_id.is_none())
        .times(1)
        .returning(|_| Ok(()));
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/user/cart")
            .insert_header(bearer(USER_TOKEN))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["message"], "cart cleared");
}
