//! Public catalog handlers. No authentication.
//!
//! ```text
//! GET /api/v1/public/products?page&limit&search&brands&category&minPrice&maxPrice&sortBy
//! GET /api/v1/public/products/{id}
//! GET /api/v1/public/brands
//! GET /api/v1/public/categories
//! GET /api/v1/public/banners
//! ```

use actix_web::{get, web};
use pagination::Page;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::banner::BannerView;
use crate::domain::catalog::{Brand, CatalogQuery, CatalogSort, Category, ProductView};
use crate::domain::{Error, ProductId, ProductPage};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::PageSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{brand_ids, page_request};

/// Storefront filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CatalogParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Matches product, category or brand name.
    pub search: Option<String>,
    /// Comma-separated brand ids; invalid entries are ignored.
    pub brands: Option<String>,
    /// Exact category name, any case.
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    /// `aA-zZ`, `zZ-aA`, `Price: Low to High`, `Price: High to Low` or `Newest`.
    pub sort_by: Option<String>,
}

impl CatalogParams {
    fn to_query(&self) -> Result<CatalogQuery, Error> {
        Ok(CatalogQuery {
            search: self.search.clone(),
            brand_ids: brand_ids(self.brands.as_deref()),
            category: self.category.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            sort: CatalogSort::from_label(self.sort_by.as_deref()),
            page: page_request(self.page, self.limit)?,
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/public/products",
    params(CatalogParams),
    responses(
        (status = 200, description = "Listed products", body = PageSchema<ProductView>),
        (status = 400, description = "Invalid paging", body = Error)
    ),
    tags = ["storefront"],
    operation_id = "browseProducts",
    security(())
)]
#[get("/products")]
pub async fn browse_products(
    state: web::Data<HttpState>,
    query: web::Query<CatalogParams>,
) -> ApiResult<web::Json<Page<ProductView>>> {
    Ok(web::Json(state.catalog.catalog(&query.to_query()?).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/public/products/{id}",
    params(("id" = ProductId, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product with up to five related products", body = ProductPage),
        (status = 404, description = "Not listed", body = Error)
    ),
    tags = ["storefront"],
    operation_id = "productDetails",
    security(())
)]
#[get("/products/{id}")]
pub async fn product_details(
    state: web::Data<HttpState>,
    id: web::Path<ProductId>,
) -> ApiResult<web::Json<ProductPage>> {
    Ok(web::Json(state.catalog.product_page(id.into_inner()).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/public/brands",
    responses((status = 200, description = "Listed brands", body = [Brand])),
    tags = ["storefront"],
    operation_id = "listedBrands",
    security(())
)]
#[get("/brands")]
pub async fn listed_brands(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Brand>>> {
    Ok(web::Json(state.catalog.listed_brands().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/public/categories",
    responses((status = 200, description = "Listed categories", body = [Category])),
    tags = ["storefront"],
    operation_id = "listedCategories",
    security(())
)]
#[get("/categories")]
pub async fn listed_categories(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<Category>>> {
    Ok(web::Json(state.catalog.listed_categories().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/public/banners",
    responses((status = 200, description = "Active banners", body = [BannerView])),
    tags = ["storefront"],
    operation_id = "publicBanners",
    security(())
)]
#[get("/banners")]
pub async fn public_banners(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<BannerView>>> {
    Ok(web::Json(state.banners.public_banners().await?))
}

#[cfg(test)]
#[path = "storefront_tests.rs"]
mod tests;
