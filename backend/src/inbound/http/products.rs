//! Product administration handlers.
//!
//! ```text
//! POST   /api/v1/admin/products
//! GET    /api/v1/admin/products?page&limit&search
//! GET    /api/v1/admin/products/{id}
//! PUT    /api/v1/admin/products/{id}
//! PATCH  /api/v1/admin/products/{id}/active
//! DELETE /api/v1/admin/products/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use pagination::Page;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::{ProductInput, ProductView, StockEntry};
use crate::domain::{BrandId, CategoryId, Error, ProductId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CurrentAdmin;
use crate::inbound::http::schemas::{ActiveBody, MessageResponse, PageSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{SearchParams, present};

/// Product form. Prices are whole rupees.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductBody {
    pub name: String,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    #[schema(example = 2999)]
    pub regular_price: i64,
    #[schema(example = 2499)]
    pub sale_price: i64,
    pub thumbnail: String,
    pub gallery: Vec<String>,
    pub stock: Vec<StockEntry>,
}

impl TryFrom<ProductBody> for ProductInput {
    type Error = Error;

    fn try_from(body: ProductBody) -> Result<Self, Self::Error> {
        Ok(Self {
            category_id: present("categoryId", body.category_id)?,
            brand_id: present("brandId", body.brand_id)?,
            name: body.name,
            description: body.description,
            regular_price: body.regular_price,
            sale_price: body.sale_price,
            thumbnail: body.thumbnail,
            gallery: body.gallery,
            stock: body.stock,
        })
    }
}

/// New products inherit a running offer from their category.
#[utoipa::path(
    post,
    path = "/api/v1/admin/products",
    request_body = ProductBody,
    responses(
        (status = 201, description = "Product created", body = ProductView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Category or brand not found", body = Error)
    ),
    tags = ["products"],
    operation_id = "createProduct"
)]
#[post("/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    payload: web::Json<ProductBody>,
) -> ApiResult<HttpResponse> {
    let input = ProductInput::try_from(payload.into_inner())?;
    let product = state.catalog.create_product(input).await?;
    Ok(HttpResponse::Created().json(product))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/products",
    params(SearchParams),
    responses(
        (status = 200, description = "Newest first", body = PageSchema<ProductView>),
        (status = 400, description = "Invalid paging", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["products"],
    operation_id = "listProducts"
)]
#[get("/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    query: web::Query<SearchParams>,
) -> ApiResult<web::Json<Page<ProductView>>> {
    Ok(web::Json(state.catalog.products(&query.to_query()?).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/products/{id}",
    params(("id" = ProductId, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ProductView),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["products"],
    operation_id = "getProduct"
)]
#[get("/products/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    id: web::Path<ProductId>,
) -> ApiResult<web::Json<ProductView>> {
    Ok(web::Json(state.catalog.product(id.into_inner()).await?))
}

/// The offer price follows the new sale price when an offer is attached.
#[utoipa::path(
    put,
    path = "/api/v1/admin/products/{id}",
    params(("id" = ProductId, Path, description = "Product id")),
    request_body = ProductBody,
    responses(
        (status = 200, description = "Product updated", body = ProductView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["products"],
    operation_id = "updateProduct"
)]
#[put("/products/{id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    id: web::Path<ProductId>,
    payload: web::Json<ProductBody>,
) -> ApiResult<web::Json<ProductView>> {
    let input = ProductInput::try_from(payload.into_inner())?;
    Ok(web::Json(
        state.catalog.update_product(id.into_inner(), input).await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/products/{id}/active",
    params(("id" = ProductId, Path, description = "Product id")),
    request_body = ActiveBody,
    responses(
        (status = 200, description = "Listing state changed", body = ProductView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["products"],
    operation_id = "setProductActive"
)]
#[patch("/products/{id}/active")]
pub async fn set_product_active(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    id: web::Path<ProductId>,
    payload: web::Json<ActiveBody>,
) -> ApiResult<web::Json<ProductView>> {
    let active = present("isActive", payload.is_active)?;
    Ok(web::Json(
        state.catalog.set_product_active(id.into_inner(), active).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/products/{id}",
    params(("id" = ProductId, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["products"],
    operation_id = "deleteProduct"
)]
#[delete("/products/{id}")]
pub async fn delete_product(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    id: web::Path<ProductId>,
) -> ApiResult<web::Json<MessageResponse>> {
    state.catalog.delete_product(id.into_inner()).await?;
    Ok(web::Json(MessageResponse::new("product deleted")))
}

#[cfg(test)]
#[path = "products_tests.rs"]
mod tests;
