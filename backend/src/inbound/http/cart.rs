//! Shopping cart handlers.
//!
//! ```text
//! GET    /api/v1/user/cart
//! DELETE /api/v1/user/cart
//! POST   /api/v1/user/cart/items
//! PUT    /api/v1/user/cart/items/{itemId}
//! DELETE /api/v1/user/cart/items/{itemId}
//! ```

use actix_web::{delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::cart::CartView;
use crate::domain::{CartItemId, Error, ProductId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CurrentUser;
use crate::inbound::http::schemas::MessageResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::present;

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AddToCartBody {
    pub product_id: Option<ProductId>,
    #[schema(example = "UK 8")]
    pub size: String,
    #[schema(example = 1)]
    pub quantity: Option<i32>,
}

/// At least one field must be present.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct UpdateCartItemBody {
    pub quantity: Option<i32>,
    pub size: Option<String>,
}

/// Lines the stock can no longer cover drop to one unit; `stockAdjusted`
/// reports it.
#[utoipa::path(
    get,
    path = "/api/v1/user/cart",
    responses(
        (status = 200, description = "Cart with totals", body = CartView),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No cart yet", body = Error)
    ),
    tags = ["cart"],
    operation_id = "getCart"
)]
#[get("/cart")]
pub async fn get_cart(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<web::Json<CartView>> {
    Ok(web::Json(state.shopping.cart(user.id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/user/cart/items",
    request_body = AddToCartBody,
    responses(
        (status = 200, description = "Updated cart", body = CartView),
        (status = 400, description = "Unknown size or not enough stock", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Product not available", body = Error)
    ),
    tags = ["cart"],
    operation_id = "addToCart"
)]
#[post("/cart/items")]
pub async fn add_to_cart(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    payload: web::Json<AddToCartBody>,
) -> ApiResult<web::Json<CartView>> {
    let product_id = present("productId", payload.product_id)?;
    let quantity = present("quantity", payload.quantity)?;
    Ok(web::Json(
        state
            .shopping
            .add_to_cart(user.id, product_id, &payload.size, quantity)
            .await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/user/cart/items/{itemId}",
    params(("itemId" = CartItemId, Path, description = "Cart line id")),
    request_body = UpdateCartItemBody,
    responses(
        (status = 200, description = "Updated cart", body = CartView),
        (status = 400, description = "Nothing to change or unknown size", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown cart or line", body = Error)
    ),
    tags = ["cart"],
    operation_id = "updateCartItem"
)]
#[put("/cart/items/{item_id}")]
pub async fn update_cart_item(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    item_id: web::Path<CartItemId>,
    payload: web::Json<UpdateCartItemBody>,
) -> ApiResult<web::Json<CartView>> {
    Ok(web::Json(
        state
            .shopping
            .update_cart_item(
                user.id,
                item_id.into_inner(),
                payload.quantity,
                payload.size.as_deref(),
            )
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/user/cart/items/{itemId}",
    params(("itemId" = CartItemId, Path, description = "Cart line id")),
    responses(
        (status = 200, description = "Updated cart", body = CartView),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown cart or line", body = Error)
    ),
    tags = ["cart"],
    operation_id = "removeCartItem"
)]
#[delete("/cart/items/{item_id}")]
pub async fn remove_cart_item(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    item_id: web::Path<CartItemId>,
) -> ApiResult<web::Json<CartView>> {
    Ok(web::Json(
        state
            .shopping
            .remove_cart_item(user.id, item_id.into_inner())
            .await?,
    ))
}

/// Empties the cart and drops its coupon.
#[utoipa::path(
    delete,
    path = "/api/v1/user/cart",
    responses(
        (status = 200, description = "Cart emptied", body = MessageResponse),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No cart yet", body = Error)
    ),
    tags = ["cart"],
    operation_id = "clearCart"
)]
#[delete("/cart")]
pub async fn clear_cart(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<web::Json<MessageResponse>> {
    state.shopping.clear_cart(user.id).await?;
    Ok(web::Json(MessageResponse::new("cart cleared")))
}

#[cfg(test)]
#[path = "cart_tests.rs"]
mod tests;
