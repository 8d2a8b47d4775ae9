//! Category administration handlers.
//!
//! ```text
//! POST   /api/v1/admin/categories
//! GET    /api/v1/admin/categories?page&limit&search
//! GET    /api/v1/admin/categories/all
//! PUT    /api/v1/admin/categories/{id}
//! PATCH  /api/v1/admin/categories/{id}/active
//! DELETE /api/v1/admin/categories/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use pagination::Page;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::Category;
use crate::domain::{CategoryId, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CurrentAdmin;
use crate::inbound::http::schemas::{ActiveBody, MessageResponse, PageSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{SearchParams, present};

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct CategoryBody {
    #[schema(example = "Sneakers")]
    pub name: String,
    pub description: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/categories",
    request_body = CategoryBody,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Name taken", body = Error)
    ),
    tags = ["categories"],
    operation_id = "createCategory"
)]
#[post("/categories")]
pub async fn create_category(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    payload: web::Json<CategoryBody>,
) -> ApiResult<HttpResponse> {
    let category = state
        .catalog
        .create_category(&payload.name, &payload.description)
        .await?;
    Ok(HttpResponse::Created().json(category))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/categories",
    params(SearchParams),
    responses(
        (status = 200, description = "Newest first", body = PageSchema<Category>),
        (status = 400, description = "Invalid paging", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["categories"],
    operation_id = "listCategories"
)]
#[get("/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    query: web::Query<SearchParams>,
) -> ApiResult<web::Json<Page<Category>>> {
    Ok(web::Json(state.catalog.categories(&query.to_query()?).await?))
}

/// Every live category in name order, for select inputs.
#[utoipa::path(
    get,
    path = "/api/v1/admin/categories/all",
    responses(
        (status = 200, description = "All categories", body = [Category]),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["categories"],
    operation_id = "allCategories"
)]
#[get("/categories/all")]
pub async fn all_categories(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
) -> ApiResult<web::Json<Vec<Category>>> {
    Ok(web::Json(state.catalog.all_categories().await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/categories/{id}",
    params(("id" = CategoryId, Path, description = "Category id")),
    request_body = CategoryBody,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Name taken", body = Error)
    ),
    tags = ["categories"],
    operation_id = "updateCategory"
)]
#[put("/categories/{id}")]
pub async fn update_category(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    id: web::Path<CategoryId>,
    payload: web::Json<CategoryBody>,
) -> ApiResult<web::Json<Category>> {
    let category = state
        .catalog
        .update_category(id.into_inner(), &payload.name, &payload.description)
        .await?;
    Ok(web::Json(category))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/categories/{id}/active",
    params(("id" = CategoryId, Path, description = "Category id")),
    request_body = ActiveBody,
    responses(
        (status = 200, description = "Listing state changed", body = Category),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["categories"],
    operation_id = "setCategoryActive"
)]
#[patch("/categories/{id}/active")]
pub async fn set_category_active(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    id: web::Path<CategoryId>,
    payload: web::Json<ActiveBody>,
) -> ApiResult<web::Json<Category>> {
    let active = present("isActive", payload.is_active)?;
    let category = state
        .catalog
        .set_category_active(id.into_inner(), active)
        .await?;
    Ok(web::Json(category))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/categories/{id}",
    params(("id" = CategoryId, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["categories"],
    operation_id = "deleteCategory"
)]
#[delete("/categories/{id}")]
pub async fn delete_category(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    id: web::Path<CategoryId>,
) -> ApiResult<web::Json<MessageResponse>> {
    state.catalog.delete_category(id.into_inner()).await?;
    Ok(web::Json(MessageResponse::new("category deleted")))
}

#[cfg(test)]
#[path = "categories_tests.rs"]
mod tests;
