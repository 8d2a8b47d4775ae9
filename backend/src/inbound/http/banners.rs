//! Banner administration handlers.
//!
//! ```text
//! POST   /api/v1/admin/banners
//! GET    /api/v1/admin/banners?page&limit
//! GET    /api/v1/admin/banners/offer-products
//! PUT    /api/v1/admin/banners/{id}
//! PATCH  /api/v1/admin/banners/{id}/active
//! DELETE /api/v1/admin/banners/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use pagination::Page;
use serde::{Deserialize, Serialize};

use crate::domain::banner::Banner;
use crate::domain::catalog::ProductView;
use crate::domain::{BannerId, Error, ProductId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CurrentAdmin;
use crate::inbound::http::schemas::{ActiveBody, MessageResponse, PageSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{PageParams, present};

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct BannerBody {
    pub product_id: Option<ProductId>,
    #[schema(example = "Monsoon sale")]
    pub title: String,
    pub subtitle: String,
    #[schema(example = "https://cdn.example.com/banners/monsoon.jpg")]
    pub image: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/banners",
    request_body = BannerBody,
    responses(
        (status = 201, description = "Banner created", body = Banner),
        (status = 400, description = "Invalid request or product without an offer", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Product not found", body = Error)
    ),
    tags = ["banners"],
    operation_id = "createBanner"
)]
#[post("/banners")]
pub async fn create_banner(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    payload: web::Json<BannerBody>,
) -> ApiResult<HttpResponse> {
    let product_id = present("productId", payload.product_id)?;
    let banner = state
        .banners
        .create(product_id, &payload.title, &payload.subtitle, &payload.image)
        .await?;
    Ok(HttpResponse::Created().json(banner))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/banners",
    params(PageParams),
    responses(
        (status = 200, description = "Newest first", body = PageSchema<Banner>),
        (status = 400, description = "Invalid paging", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["banners"],
    operation_id = "listBanners"
)]
#[get("/banners")]
pub async fn list_banners(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    query: web::Query<PageParams>,
) -> ApiResult<web::Json<Page<Banner>>> {
    Ok(web::Json(state.banners.list(query.to_request()?).await?))
}

/// Products a banner may point at: listed and carrying a live offer.
#[utoipa::path(
    get,
    path = "/api/v1/admin/banners/offer-products",
    responses(
        (status = 200, description = "Candidate products", body = [ProductView]),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["banners"],
    operation_id = "bannerOfferProducts"
)]
#[get("/banners/offer-products")]
pub async fn offer_products(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
) -> ApiResult<web::Json<Vec<ProductView>>> {
    Ok(web::Json(state.banners.offer_products().await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/banners/{id}",
    params(("id" = BannerId, Path, description = "Banner id")),
    request_body = BannerBody,
    responses(
        (status = 200, description = "Banner updated", body = Banner),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["banners"],
    operation_id = "updateBanner"
)]
#[put("/banners/{id}")]
pub async fn update_banner(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    id: web::Path<BannerId>,
    payload: web::Json<BannerBody>,
) -> ApiResult<web::Json<Banner>> {
    let product_id = present("productId", payload.product_id)?;
    let banner = state
        .banners
        .update(
            id.into_inner(),
            product_id,
            &payload.title,
            &payload.subtitle,
            &payload.image,
        )
        .await?;
    Ok(web::Json(banner))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/banners/{id}/active",
    params(("id" = BannerId, Path, description = "Banner id")),
    request_body = ActiveBody,
    responses(
        (status = 200, description = "Visibility changed", body = Banner),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["banners"],
    operation_id = "setBannerActive"
)]
#[patch("/banners/{id}/active")]
pub async fn set_banner_active(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    id: web::Path<BannerId>,
    payload: web::Json<ActiveBody>,
) -> ApiResult<web::Json<Banner>> {
    let active = present("isActive", payload.is_active)?;
    Ok(web::Json(
        state.banners.set_active(id.into_inner(), active).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/banners/{id}",
    params(("id" = BannerId, Path, description = "Banner id")),
    responses(
        (status = 200, description = "Banner deleted", body = MessageResponse),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["banners"],
    operation_id = "deleteBanner"
)]
#[delete("/banners/{id}")]
pub async fn delete_banner(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    id: web::Path<BannerId>,
) -> ApiResult<web::Json<MessageResponse>> {
    state.banners.delete(id.into_inner()).await?;
    Ok(web::Json(MessageResponse::new("banner deleted")))
}
