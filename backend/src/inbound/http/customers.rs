//! Customer administration handlers.
//!
//! ```text
//! GET    /api/v1/admin/customers?page&limit&search
//! PUT    /api/v1/admin/customers/{id}
//! PATCH  /api/v1/admin/customers/{id}/blocked
//! DELETE /api/v1/admin/customers/{id}
//! ```

use actix_web::{delete, get, patch, put, web};
use pagination::Page;
use serde::{Deserialize, Serialize};

use crate::domain::user::UserProfile;
use crate::domain::{Error, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CurrentAdmin;
use crate::inbound::http::schemas::{MessageResponse, PageSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{SearchParams, present};

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerBody {
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "9876543210")]
    pub mobile: String,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockedBody {
    pub is_blocked: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/customers",
    params(SearchParams),
    responses(
        (status = 200, description = "Customers, newest first", body = PageSchema<UserProfile>),
        (status = 400, description = "Invalid paging", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["customers"],
    operation_id = "listCustomers"
)]
#[get("/customers")]
pub async fn list_customers(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    query: web::Query<SearchParams>,
) -> ApiResult<web::Json<Page<UserProfile>>> {
    Ok(web::Json(state.accounts.customers(&query.to_query()?).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/customers/{id}",
    params(("id" = UserId, Path, description = "Customer id")),
    request_body = CustomerBody,
    responses(
        (status = 200, description = "Customer updated", body = UserProfile),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Mobile in use", body = Error)
    ),
    tags = ["customers"],
    operation_id = "updateCustomer"
)]
#[put("/customers/{id}")]
pub async fn update_customer(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    id: web::Path<UserId>,
    payload: web::Json<CustomerBody>,
) -> ApiResult<web::Json<UserProfile>> {
    let profile = state
        .accounts
        .update_customer(
            id.into_inner(),
            &payload.first_name,
            &payload.last_name,
            &payload.mobile,
        )
        .await?;
    Ok(web::Json(profile))
}

/// Blocked customers keep their data but fail every authenticated request.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/customers/{id}/blocked",
    params(("id" = UserId, Path, description = "Customer id")),
    request_body = BlockedBody,
    responses(
        (status = 200, description = "Block state changed", body = UserProfile),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["customers"],
    operation_id = "setCustomerBlocked"
)]
#[patch("/customers/{id}/blocked")]
pub async fn set_customer_blocked(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    id: web::Path<UserId>,
    payload: web::Json<BlockedBody>,
) -> ApiResult<web::Json<UserProfile>> {
    let blocked = present("isBlocked", payload.is_blocked)?;
    Ok(web::Json(
        state
            .accounts
            .set_customer_blocked(id.into_inner(), blocked)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/customers/{id}",
    params(("id" = UserId, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer deleted", body = MessageResponse),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["customers"],
    operation_id = "deleteCustomer"
)]
#[delete("/customers/{id}")]
pub async fn delete_customer(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    id: web::Path<UserId>,
) -> ApiResult<web::Json<MessageResponse>> {
    state.accounts.delete_customer(id.into_inner()).await?;
    Ok(web::Json(MessageResponse::new("customer deleted")))
}
