//! Tests for banner administration and the public strip.

use std::sync::Arc;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::fixtures::{clock, now, product, with_offer};
use crate::domain::ports::{MockBannerRepository, MockProductRepository};

fn service(banners: MockBannerRepository, products: MockProductRepository) -> BannerService {
    BannerService::new(Arc::new(banners), Arc::new(products), clock())
}

fn banner(product_id: ProductId) -> Banner {
    Banner {
        id: BannerId::random(),
        product_id,
        title: "Monsoon sale".into(),
        subtitle: "Up to 40% off rain gear".into(),
        image: "https://cdn.example.com/banner.jpg".into(),
        is_active: true,
        created_at: now(),
        updated_at: now(),
    }
}

#[tokio::test]
async fn banner_needs_existing_product() {
    let mut products = MockProductRepository::new();
    products.expect_find().return_once(|_| Ok(None));
    let mut banners = MockBannerRepository::new();
    banners.expect_insert().never();

    let error = service(banners, products)
        .create(
            ProductId::random(),
            "Monsoon sale",
            "Up to 40% off rain gear",
            "https://cdn.example.com/banner.jpg",
        )
        .await
        .expect_err("missing product");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn invalid_copy_is_rejected_before_lookup() {
    let mut products = MockProductRepository::new();
    products.expect_find().never();
    let error = service(MockBannerRepository::new(), products)
        .create(ProductId::random(), "Sale", "Up to 40% off", "https://x.io/b.jpg")
        .await
        .expect_err("short title");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn public_banners_skip_unbuyable_products() {
    let listed = product(1000, &[("M", 2)]);
    let mut hidden = product(1000, &[("M", 2)]);
    hidden.brand_listed = false;
    let shown = banner(listed.product.id);
    let shown_id = shown.id;
    let skipped = banner(hidden.product.id);
    let mut banners = MockBannerRepository::new();
    banners
        .expect_list_active()
        .return_once(move || Ok(vec![shown, skipped]));
    let mut products = MockProductRepository::new();
    products
        .expect_find_many()
        .return_once(move |_| Ok(vec![listed, hidden]));

    let views = service(banners, products)
        .public_banners()
        .await
        .expect("banners");
    assert_eq!(views.len(), 1);
    assert_eq!(views.first().map(|view| view.banner.id), Some(shown_id));
}

#[tokio::test]
async fn offer_products_show_offer_price() {
    let mut products = MockProductRepository::new();
    products
        .expect_list_with_active_offer()
        .withf(|at| *at == now())
        .return_once(|_| Ok(vec![with_offer(product(1000, &[("M", 2)]), 10, 900)]));
    let views = service(MockBannerRepository::new(), products)
        .offer_products()
        .await
        .expect("products");
    assert_eq!(views.first().map(|view| view.effective_price), Some(900));
}

#[tokio::test]
async fn deleting_unknown_banner_is_not_found() {
    let mut banners = MockBannerRepository::new();
    banners.expect_delete().return_once(|_| Ok(false));
    let error = service(banners, MockProductRepository::new())
        .delete(BannerId::random())
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}
