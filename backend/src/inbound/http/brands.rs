//! Brand administration handlers, mirroring the category endpoints under
//! `/api/v1/admin/brands`.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use pagination::Page;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::Brand;
use crate::domain::{BrandId, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CurrentAdmin;
use crate::inbound::http::schemas::{ActiveBody, MessageResponse, PageSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{SearchParams, present};

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct BrandBody {
    pub name: String,
    pub description: String,
    #[schema(example = "https://cdn.example.com/brands/stride.png")]
    pub logo_url: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/brands",
    request_body = BrandBody,
    responses(
        (status = 201, description = "Brand created", body = Brand),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Name taken", body = Error)
    ),
    tags = ["brands"],
    operation_id = "createBrand"
)]
#[post("/brands")]
pub async fn create_brand(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    payload: web::Json<BrandBody>,
) -> ApiResult<HttpResponse> {
    let brand = state
        .catalog
        .create_brand(&payload.name, &payload.description, &payload.logo_url)
        .await?;
    Ok(HttpResponse::Created().json(brand))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/brands",
    params(SearchParams),
    responses(
        (status = 200, description = "Newest first", body = PageSchema<Brand>),
        (status = 400, description = "Invalid paging", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["brands"],
    operation_id = "listBrands"
)]
#[get("/brands")]
pub async fn list_brands(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    query: web::Query<SearchParams>,
) -> ApiResult<web::Json<Page<Brand>>> {
    Ok(web::Json(state.catalog.brands(&query.to_query()?).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/brands/all",
    responses(
        (status = 200, description = "All brands by name", body = [Brand]),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["brands"],
    operation_id = "allBrands"
)]
#[get("/brands/all")]
pub async fn all_brands(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
) -> ApiResult<web::Json<Vec<Brand>>> {
    Ok(web::Json(state.catalog.all_brands().await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/brands/{id}",
    params(("id" = BrandId, Path, description = "Brand id")),
    request_body = BrandBody,
    responses(
        (status = 200, description = "Brand updated", body = Brand),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Name taken", body = Error)
    ),
    tags = ["brands"],
    operation_id = "updateBrand"
)]
#[put("/brands/{id}")]
pub async fn update_brand(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    id: web::Path<BrandId>,
    payload: web::Json<BrandBody>,
) -> ApiResult<web::Json<Brand>> {
    let BrandBody {
        name,
        description,
        logo_url,
    } = payload.into_inner();
    let brand = state
        .catalog
        .update_brand(id.into_inner(), &name, &description, &logo_url)
        .await?;
    Ok(web::Json(brand))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/brands/{id}/active",
    params(("id" = BrandId, Path, description = "Brand id")),
    request_body = ActiveBody,
    responses(
        (status = 200, description = "Listing state changed", body = Brand),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["brands"],
    operation_id = "setBrandActive"
)]
#[patch("/brands/{id}/active")]
pub async fn set_brand_active(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    id: web::Path<BrandId>,
    payload: web::Json<ActiveBody>,
) -> ApiResult<web::Json<Brand>> {
    let active = present("isActive", payload.is_active)?;
    Ok(web::Json(
        state.catalog.set_brand_active(id.into_inner(), active).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/brands/{id}",
    params(("id" = BrandId, Path, description = "Brand id")),
    responses(
        (status = 200, description = "Brand deleted", body = MessageResponse),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["brands"],
    operation_id = "deleteBrand"
)]
#[delete("/brands/{id}")]
pub async fn delete_brand(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    id: web::Path<BrandId>,
) -> ApiResult<web::Json<MessageResponse>> {
    state.catalog.delete_brand(id.into_inner()).await?;
    Ok(web::Json(MessageResponse::new("brand deleted")))
}
