//! Return administration handlers.
//!
//! ```text
//! GET   /api/v1/admin/returns?page&limit&status
//! PATCH /api/v1/admin/returns/{orderId}/items/{itemId}/confirm
//! ```

use actix_web::{get, patch, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::domain::order::{Order, ReturnStatus, ReturnView};
use crate::domain::{Error, OrderId, OrderItemId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CurrentAdmin;
use crate::inbound::http::schemas::PageSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::page_request;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReturnListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// `requested`, `approved` or `rejected`.
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct ReturnDecisionBody {
    /// `approved` or `rejected`.
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/returns",
    params(ReturnListParams),
    responses(
        (status = 200, description = "Newest first", body = PageSchema<ReturnView>),
        (status = 400, description = "Invalid status or paging", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["returns"],
    operation_id = "listReturns"
)]
#[get("/returns")]
pub async fn list_returns(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    query: web::Query<ReturnListParams>,
) -> ApiResult<web::Json<Page<ReturnView>>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<ReturnStatus>)
        .transpose()?;
    let page = page_request(query.page, query.limit)?;
    Ok(web::Json(state.orders.returns(status, page).await?))
}

/// Approve or reject an open return. Approval restocks undamaged goods and
/// refunds paid items.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/returns/{orderId}/items/{itemId}/confirm",
    params(
        ("orderId" = OrderId, Path, description = "Order id"),
        ("itemId" = OrderItemId, Path, description = "Order item id")
    ),
    request_body = ReturnDecisionBody,
    responses(
        (status = 200, description = "Order after the decision", body = Order),
        (status = 400, description = "Status must be approved or rejected", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No return for this item", body = Error),
        (status = 409, description = "Return already resolved", body = Error)
    ),
    tags = ["returns"],
    operation_id = "resolveReturn"
)]
#[patch("/returns/{order_id}/items/{item_id}/confirm")]
pub async fn resolve_return(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    path: web::Path<(OrderId, OrderItemId)>,
    payload: web::Json<ReturnDecisionBody>,
) -> ApiResult<web::Json<Order>> {
    let (order_id, item_id) = path.into_inner();
    let decision: ReturnStatus = payload.status.parse()?;
    Ok(web::Json(
        state
            .orders
            .resolve_return(order_id, item_id, decision)
            .await?,
    ))
}
