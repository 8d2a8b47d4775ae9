//! Coupon handlers for administrators and customers.
//!
//! ```text
//! GET    /api/v1/admin/coupons?page&limit
//! POST   /api/v1/admin/coupons
//! PATCH  /api/v1/admin/coupons/{id}/status
//! DELETE /api/v1/admin/coupons/{id}
//! GET    /api/v1/user/coupons
//! POST   /api/v1/user/coupons/apply
//! DELETE /api/v1/user/coupons/applied
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use pagination::Page;
use serde::{Deserialize, Serialize};

use crate::domain::cart::CartView;
use crate::domain::promotion::{Coupon, CouponInput, CouponStatus, CouponWithUsage};
use crate::domain::{CouponId, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{CurrentAdmin, CurrentUser};
use crate::inbound::http::schemas::{MessageResponse, PageSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{PageParams, date};

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CouponBody {
    /// Stored upper-case.
    #[schema(example = "MONSOON20")]
    pub code: String,
    pub description: Option<String>,
    /// Percentage, 1 to 100.
    pub discount: i64,
    pub max_discount_amount: i64,
    pub min_purchase_amount: i64,
    /// `YYYY-MM-DD`, after today.
    pub expiration_date: String,
    /// Defaults to one redemption.
    pub usage_limit_per_user: Option<i64>,
}

impl TryFrom<CouponBody> for CouponInput {
    type Error = Error;

    fn try_from(body: CouponBody) -> Result<Self, Self::Error> {
        Ok(Self {
            expiration_date: date("expirationDate", &body.expiration_date)?,
            code: body.code,
            description: body.description,
            discount: body.discount,
            max_discount_amount: body.max_discount_amount,
            min_purchase_amount: body.min_purchase_amount,
            usage_limit_per_user: body.usage_limit_per_user,
        })
    }
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct CouponStatusBody {
    /// `active` or `blocked`.
    pub status: String,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct ApplyCouponBody {
    pub code: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/coupons",
    params(PageParams),
    responses(
        (status = 200, description = "Newest first with usage counts", body = PageSchema<CouponWithUsage>),
        (status = 400, description = "Invalid paging", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "listCoupons"
)]
#[get("/coupons")]
pub async fn list_coupons(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    query: web::Query<PageParams>,
) -> ApiResult<web::Json<Page<CouponWithUsage>>> {
    Ok(web::Json(state.promotions.coupons(query.to_request()?).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/coupons",
    request_body = CouponBody,
    responses(
        (status = 201, description = "Coupon created", body = Coupon),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Code taken", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "createCoupon"
)]
#[post("/coupons")]
pub async fn create_coupon(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    payload: web::Json<CouponBody>,
) -> ApiResult<HttpResponse> {
    let input = CouponInput::try_from(payload.into_inner())?;
    let coupon = state.promotions.create_coupon(input).await?;
    Ok(HttpResponse::Created().json(coupon))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/coupons/{id}/status",
    params(("id" = CouponId, Path, description = "Coupon id")),
    request_body = CouponStatusBody,
    responses(
        (status = 200, description = "Status changed", body = Coupon),
        (status = 400, description = "Unknown status", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "setCouponStatus"
)]
#[patch("/coupons/{id}/status")]
pub async fn set_coupon_status(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    id: web::Path<CouponId>,
    payload: web::Json<CouponStatusBody>,
) -> ApiResult<web::Json<Coupon>> {
    let status: CouponStatus = payload.status.parse()?;
    Ok(web::Json(
        state
            .promotions
            .set_coupon_status(id.into_inner(), status)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/coupons/{id}",
    params(("id" = CouponId, Path, description = "Coupon id")),
    responses(
        (status = 200, description = "Coupon deleted", body = MessageResponse),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "deleteCoupon"
)]
#[delete("/coupons/{id}")]
pub async fn delete_coupon(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    id: web::Path<CouponId>,
) -> ApiResult<web::Json<MessageResponse>> {
    state.promotions.delete_coupon(id.into_inner()).await?;
    Ok(web::Json(MessageResponse::new("coupon deleted")))
}

/// Active, unexpired coupons the customer can still redeem.
#[utoipa::path(
    get,
    path = "/api/v1/user/coupons",
    responses(
        (status = 200, description = "Redeemable coupons", body = [Coupon]),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "availableCoupons"
)]
#[get("/coupons")]
pub async fn available_coupons(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<web::Json<Vec<Coupon>>> {
    Ok(web::Json(state.promotions.available_coupons(user.id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/user/coupons/apply",
    request_body = ApplyCouponBody,
    responses(
        (status = 200, description = "Cart with the coupon applied", body = CartView),
        (status = 400, description = "Coupon not usable on this cart", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown coupon", body = Error),
        (status = 409, description = "A coupon is already applied", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "applyCoupon"
)]
#[post("/coupons/apply")]
pub async fn apply_coupon(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    payload: web::Json<ApplyCouponBody>,
) -> ApiResult<web::Json<CartView>> {
    Ok(web::Json(
        state.shopping.apply_coupon(user.id, &payload.code).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/user/coupons/applied",
    responses(
        (status = 200, description = "Cart without a coupon", body = CartView),
        (status = 400, description = "No coupon applied", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "removeAppliedCoupon"
)]
#[delete("/coupons/applied")]
pub async fn remove_applied_coupon(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<web::Json<CartView>> {
    Ok(web::Json(state.shopping.remove_coupon(user.id).await?))
}

#[cfg(test)]
#[path = "coupons_tests.rs"]
mod tests;
