//! Handler tests for offer administration.

use actix_web::http::StatusCode;
use actix_web::test;
use chrono::Duration;
use pagination::Page;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use crate::domain::fixtures;
use crate::domain::promotion::{Offer, OfferKind};
use crate::domain::OfferId;
use crate::inbound::http::test_utils::{ADMIN_TOKEN, MockPorts, bearer, test_app};

#[fixture]
fn ports() -> MockPorts {
    let mut ports = MockPorts::default();
    ports.sign_in_admin(&fixtures::admin("admin@example.com"));
    ports
}

fn offer_body() -> Value {
    json!({
        "title": "Monsoon sale",
        "description": "Twenty percent off rain gear",
        "discount": 20,
        "type": "product",
        "startDate": "2026-06-01",
        "endDate": "2026-06-10"
    })
}

fn offer(kind: OfferKind) -> Offer {
    Offer {
        id: OfferId::random(),
        title: "Monsoon sale".into(),
        description: "Twenty percent off rain gear".into(),
        discount: 20,
        kind,
        start_date: fixtures::now() - Duration::days(1),
        end_date: fixtures::now() + Duration::days(9),
        created_at: fixtures::now(),
    }
}

#[rstest]
#[actix_web::test]
async fn create_returns_the_offer(mut ports: MockPorts) {
    ports.offers.expect_insert().times(1).returning(|_| Ok(()));
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/admin/offers")
            .insert_header(bearer(ADMIN_TOKEN))
            .set_json(offer_body())
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["type"], "product");
    assert_eq!(body["discount"], 20);
    assert_eq!(body["endDate"], "2026-06-10T23:59:59Z");
}

#[rstest]
#[case::kind("type", json!("store"), "type")]
#[case::malformed_start("startDate", json!("01/06/2026"), "startDate")]
#[case::started_yesterday("startDate", json!("2026-05-31"), "startDate")]
#[case::ends_first("endDate", json!("2026-05-30"), "endDate")]
#[case::discount("discount", json!(120), "discount")]
#[case::short_title("title", json!("ab"), "title")]
#[actix_web::test]
async fn create_validates_the_form(
    ports: MockPorts,
    #[case] key: &str,
    #[case] value: Value,
    #[case] field: &str,
) {
    let app = test::init_service(test_app(ports.into_state())).await;
    let mut body = offer_body();
    body[key] = value;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/admin/offers")
            .insert_header(bearer(ADMIN_TOKEN))
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
async fn listing_by_type_filters_the_kind(mut ports: MockPorts) {
    let running = offer(OfferKind::Category);
    ports
        .offers
        .expect_list()
        .withf(|kind, now, page| {
            *kind == Some(OfferKind::Category) && *now == fixtures::now() && page.page() == 1
        })
        .returning(move |_, _, page| Ok(Page::new(vec![running.clone()], page, 1)));
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/admin/offers?type=category")
            .insert_header(bearer(ADMIN_TOKEN))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["totalItems"], 1);
    assert_eq!(body["items"][0]["type"], "category");
}

#[rstest]
#[actix_web::test]
async fn listing_rejects_unknown_types(ports: MockPorts) {
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/admin/offers?type=brand")
            .insert_header(bearer(ADMIN_TOKEN))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn deleting_an_unknown_offer_is_not_found(mut ports: MockPorts) {
    ports.offers.expect_delete().times(1).returning(|_| Ok(false));
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/admin/offers/{}", OfferId::random()))
            .insert_header(bearer(ADMIN_TOKEN))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn applying_needs_both_ids(ports: MockPorts) {
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/admin/offers/apply-to-product")
            .insert_header(bearer(ADMIN_TOKEN))
            .set_json(json!({ "offerId": OfferId::random() }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload: Value = test::read_body_json(response).await;
    assert_eq!(payload["details"]["field"], "productId");
}

#[rstest]
#[actix_web::test]
async fn category_offers_cannot_go_on_products(mut ports: MockPorts) {
    let category_offer = offer(OfferKind::Category);
    let offer_id = category_offer.id;
    ports
        .offers
        .expect_find()
        .returning(move |_| Ok(Some(category_offer.clone())));
    ports.offers.expect_attach_to_product().never();
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/admin/offers/apply-to-product")
            .insert_header(bearer(ADMIN_TOKEN))
            .set_json(json!({
                "offerId": offer_id,
                "productId": fixtures::product(1000, &[("M", 1)]).product.id,
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn applying_to_a_product_reprices_it(mut ports: MockPorts) {
    let product_offer = offer(OfferKind::Product);
    let offer_id = product_offer.id;
    let details = fixtures::product(2000, &[("M", 3)]);
    let product_id = details.product.id;
    ports
        .offers
        .expect_find()
        .returning(move |_| Ok(Some(product_offer.clone())));
    ports
        .products
        .expect_find()
        .returning(move |_| Ok(Some(details.clone())));
    ports
        .offers
        .expect_attach_to_product()
        .withf(move |id, priced| {
            *id == offer_id && priced.product_id == product_id && priced.offer_price == 1600
        })
        .times(1)
        .returning(|_, _| Ok(()));
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/admin/offers/apply-to-product")
            .insert_header(bearer(ADMIN_TOKEN))
            .set_json(json!({ "offerId": offer_id, "productId": product_id }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["offerPrice"], 1600);
    assert_eq!(body["effectivePrice"], 1600);
}

#[rstest]
#[actix_web::test]
async fn applying_to_a_category_reports_counts(mut ports: MockPorts) {
    let category_offer = offer(OfferKind::Category);
    let offer_id = category_offer.id;
    let plain = fixtures::product(1000, &[("M", 1)]);
    let category_id = plain.product.category_id;
    let better = fixtures::with_offer(fixtures::product(1000, &[("M", 1)]), 50, 500);
    ports
        .offers
        .expect_find()
        .returning(move |_| Ok(Some(category_offer.clone())));
    ports.categories.expect_find().returning(move |_| {
        Ok(Some(crate::domain::catalog::Category {
            id: category_id,
            name: "Shoes".into(),
            description: "Shoes for every day".into(),
            is_active: true,
            offer_id: None,
            deleted_at: None,
            created_at: fixtures::now(),
            updated_at: fixtures::now(),
        }))
    });
    ports
        .products
        .expect_list_by_category()
        .returning(move |_| Ok(vec![plain.clone(), better.clone()]));
    ports
        .offers
        .expect_attach_to_category()
        .withf(|_, _, products| products.len() == 1 && products[0].offer_price == 800)
        .times(1)
        .returning(|_, _, _| Ok(()));
    let app = test::init_service(test_app(ports.into_state())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/admin/offers/apply-to-category")
            .insert_header(bearer(ADMIN_TOKEN))
            .set_json(json!({ "offerId": offer_id, "categoryId": category_id }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body, json!({ "updated": 1, "skipped": 1 }));
}
