//! Wishlist handlers.
//!
//! ```text
//! GET    /api/v1/user/wishlist
//! POST   /api/v1/user/wishlist
//! DELETE /api/v1/user/wishlist/{productId}
//! POST   /api/v1/user/wishlist/move-to-bag
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::cart::{CartView, WishlistItemView};
use crate::domain::{Error, ProductId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CurrentUser;
use crate::inbound::http::schemas::MessageResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::present;

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct WishlistBody {
    pub product_id: Option<ProductId>,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct MoveToBagBody {
    pub product_id: Option<ProductId>,
    pub size: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/user/wishlist",
    responses(
        (status = 200, description = "Newest first", body = [WishlistItemView]),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["wishlist"],
    operation_id = "getWishlist"
)]
#[get("/wishlist")]
pub async fn get_wishlist(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<web::Json<Vec<WishlistItemView>>> {
    Ok(web::Json(state.shopping.wishlist(user.id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/user/wishlist",
    request_body = WishlistBody,
    responses(
        (status = 201, description = "Added", body = MessageResponse),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Product not found", body = Error),
        (status = 409, description = "Already wishlisted", body = Error)
    ),
    tags = ["wishlist"],
    operation_id = "addToWishlist"
)]
#[post("/wishlist")]
pub async fn add_to_wishlist(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    payload: web::Json<WishlistBody>,
) -> ApiResult<HttpResponse> {
    let product_id = present("productId", payload.product_id)?;
    state.shopping.add_to_wishlist(user.id, product_id).await?;
    Ok(HttpResponse::Created().json(MessageResponse::new("added to wishlist")))
}

#[utoipa::path(
    delete,
    path = "/api/v1/user/wishlist/{productId}",
    params(("productId" = ProductId, Path, description = "Product id")),
    responses(
        (status = 200, description = "Removed", body = MessageResponse),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not wishlisted", body = Error)
    ),
    tags = ["wishlist"],
    operation_id = "removeFromWishlist"
)]
#[delete("/wishlist/{product_id}")]
pub async fn remove_from_wishlist(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    product_id: web::Path<ProductId>,
) -> ApiResult<web::Json<MessageResponse>> {
    state
        .shopping
        .remove_from_wishlist(user.id, product_id.into_inner())
        .await?;
    Ok(web::Json(MessageResponse::new("removed from wishlist")))
}

/// One unit goes into the cart under the usual cart rules, then the product
/// leaves the wishlist.
#[utoipa::path(
    post,
    path = "/api/v1/user/wishlist/move-to-bag",
    request_body = MoveToBagBody,
    responses(
        (status = 200, description = "Updated cart", body = CartView),
        (status = 400, description = "Unknown size or not enough stock", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Product not available", body = Error)
    ),
    tags = ["wishlist"],
    operation_id = "moveToBag"
)]
#[post("/wishlist/move-to-bag")]
pub async fn move_to_bag(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    payload: web::Json<MoveToBagBody>,
) -> ApiResult<web::Json<CartView>> {
    let product_id = present("productId", payload.product_id)?;
    Ok(web::Json(
        state
            .shopping
            .move_to_bag(user.id, product_id, &payload.size)
            .await?,
    ))
}
