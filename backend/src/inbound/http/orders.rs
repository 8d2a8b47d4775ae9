//! Order handlers for customers and administrators.
//!
//! ```text
//! POST  /api/v1/user/orders
//! GET   /api/v1/user/orders?page&limit
//! GET   /api/v1/user/orders/{id}
//! POST  /api/v1/user/orders/{id}/verify-payment
//! PATCH /api/v1/user/orders/{orderId}/items/{itemId}/cancel
//! POST  /api/v1/user/orders/{orderId}/items/{itemId}/return
//! GET   /api/v1/admin/orders?page&limit&status
//! GET   /api/v1/admin/orders/{id}
//! PATCH /api/v1/admin/orders/{orderId}/items/{itemId}/status
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::domain::order::{CustomerOrder, ItemStatus, Order, OrderStatus, PaymentMethod, ReturnRequest};
use crate::domain::{AddressId, Error, OrderId, OrderItemId, PlacedOrder};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{CurrentAdmin, CurrentUser};
use crate::inbound::http::checkout::GatewayCallbackBody;
use crate::inbound::http::schemas::PageSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{PageParams, page_request, present};

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaceOrderBody {
    pub address_id: Option<AddressId>,
    /// `PayOnDelivery`, `Razorpay` or `Wallet`.
    #[schema(example = "PayOnDelivery")]
    pub payment_method: String,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct ReturnBody {
    #[schema(example = "Incorrect item received")]
    pub reason: String,
    pub remarks: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct ItemStatusBody {
    /// `Shipped`, `Delivered` or `Cancelled`.
    pub status: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminOrderParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// `Initiated`, `Confirmed` or `Failed`.
    pub status: Option<String>,
}

/// Place an order from the cart.
///
/// Razorpay orders come back `Initiated` with a `payment` checkout; the other
/// methods confirm immediately.
#[utoipa::path(
    post,
    path = "/api/v1/user/orders",
    request_body = PlaceOrderBody,
    responses(
        (status = 201, description = "Order placed", body = PlacedOrder),
        (status = 400, description = "Empty cart, short stock or low wallet balance", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Address not found", body = Error),
        (status = 503, description = "Payment gateway unavailable", body = Error)
    ),
    tags = ["orders"],
    operation_id = "placeOrder"
)]
#[post("/orders")]
pub async fn place_order(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    payload: web::Json<PlaceOrderBody>,
) -> ApiResult<HttpResponse> {
    let address_id = present("addressId", payload.address_id)?;
    let method: PaymentMethod = payload.payment_method.parse()?;
    let placed = state.orders.place_order(user.id, address_id, method).await?;
    Ok(HttpResponse::Created().json(placed))
}

/// Settle an `Initiated` order with the checkout result.
///
/// A failure callback marks the order `Failed` and still answers 200.
#[utoipa::path(
    post,
    path = "/api/v1/user/orders/{id}/verify-payment",
    params(("id" = OrderId, Path, description = "Order id")),
    request_body = GatewayCallbackBody,
    responses(
        (status = 200, description = "Order after settlement", body = Order),
        (status = 400, description = "Signature mismatch", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Order not found", body = Error),
        (status = 409, description = "Order not awaiting payment, or stock ran out", body = Error)
    ),
    tags = ["orders"],
    operation_id = "verifyOrderPayment"
)]
#[post("/orders/{id}/verify-payment")]
pub async fn verify_payment(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    id: web::Path<OrderId>,
    payload: web::Json<GatewayCallbackBody>,
) -> ApiResult<web::Json<Order>> {
    let outcome = payload.outcome()?;
    Ok(web::Json(
        state
            .orders
            .verify_payment(user.id, id.into_inner(), outcome)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/orders",
    params(PageParams),
    responses(
        (status = 200, description = "Newest first", body = PageSchema<Order>),
        (status = 400, description = "Invalid paging", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["orders"],
    operation_id = "listOrders"
)]
#[get("/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    query: web::Query<PageParams>,
) -> ApiResult<web::Json<Page<Order>>> {
    Ok(web::Json(
        state.orders.orders(user.id, query.to_request()?).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/orders/{id}",
    params(("id" = OrderId, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    id: web::Path<OrderId>,
) -> ApiResult<web::Json<Order>> {
    Ok(web::Json(state.orders.order(user.id, id.into_inner()).await?))
}

/// Cancel a `Pending` or `Shipped` item; stock returns and paid items are
/// refunded to the wallet.
#[utoipa::path(
    patch,
    path = "/api/v1/user/orders/{orderId}/items/{itemId}/cancel",
    params(
        ("orderId" = OrderId, Path, description = "Order id"),
        ("itemId" = OrderItemId, Path, description = "Order item id")
    ),
    responses(
        (status = 200, description = "Order after cancellation", body = Order),
        (status = 400, description = "Item can no longer be cancelled", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "cancelOrderItem"
)]
#[patch("/orders/{order_id}/items/{item_id}/cancel")]
pub async fn cancel_item(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<(OrderId, OrderItemId)>,
) -> ApiResult<web::Json<Order>> {
    let (order_id, item_id) = path.into_inner();
    Ok(web::Json(
        state.orders.cancel_item(user.id, order_id, item_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/user/orders/{orderId}/items/{itemId}/return",
    params(
        ("orderId" = OrderId, Path, description = "Order id"),
        ("itemId" = OrderItemId, Path, description = "Order item id")
    ),
    request_body = ReturnBody,
    responses(
        (status = 201, description = "Return requested", body = ReturnRequest),
        (status = 400, description = "Item not delivered or unknown reason", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "A return is already open", body = Error)
    ),
    tags = ["orders"],
    operation_id = "requestReturn"
)]
#[post("/orders/{order_id}/items/{item_id}/return")]
pub async fn request_return(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<(OrderId, OrderItemId)>,
    payload: web::Json<ReturnBody>,
) -> ApiResult<HttpResponse> {
    let (order_id, item_id) = path.into_inner();
    let ReturnBody { reason, remarks } = payload.into_inner();
    let request = state
        .orders
        .request_return(user.id, order_id, item_id, &reason, remarks)
        .await?;
    Ok(HttpResponse::Created().json(request))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/orders",
    params(AdminOrderParams),
    responses(
        (status = 200, description = "Newest first with customers", body = PageSchema<CustomerOrder>),
        (status = 400, description = "Invalid status or paging", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["orders"],
    operation_id = "adminListOrders"
)]
#[get("/orders")]
pub async fn admin_list_orders(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    query: web::Query<AdminOrderParams>,
) -> ApiResult<web::Json<Page<CustomerOrder>>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()?;
    let page = page_request(query.page, query.limit)?;
    Ok(web::Json(state.orders.all_orders(status, page).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/orders/{id}",
    params(("id" = OrderId, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with customer", body = CustomerOrder),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "adminGetOrder"
)]
#[get("/orders/{id}")]
pub async fn admin_get_order(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    id: web::Path<OrderId>,
) -> ApiResult<web::Json<CustomerOrder>> {
    Ok(web::Json(state.orders.admin_order(id.into_inner()).await?))
}

/// Move an item along Pending, Shipped and Delivered, or cancel it.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/orders/{orderId}/items/{itemId}/status",
    params(
        ("orderId" = OrderId, Path, description = "Order id"),
        ("itemId" = OrderItemId, Path, description = "Order item id")
    ),
    request_body = ItemStatusBody,
    responses(
        (status = 200, description = "Order after the change", body = Order),
        (status = 400, description = "Transition not allowed", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "updateOrderItemStatus"
)]
#[patch("/orders/{order_id}/items/{item_id}/status")]
pub async fn update_item_status(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    path: web::Path<(OrderId, OrderItemId)>,
    payload: web::Json<ItemStatusBody>,
) -> ApiResult<web::Json<Order>> {
    let (order_id, item_id) = path.into_inner();
    let status: ItemStatus = payload.status.parse()?;
    Ok(web::Json(
        state
            .orders
            .update_item_status(order_id, item_id, status)
            .await?,
    ))
}

#[cfg(test)]
#[path = "orders_tests.rs"]
mod tests;
