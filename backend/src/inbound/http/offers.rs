//! Offer administration handlers.
//!
//! ```text
//! POST   /api/v1/admin/offers
//! GET    /api/v1/admin/offers?type&page&limit
//! DELETE /api/v1/admin/offers/{id}
//! POST   /api/v1/admin/offers/apply-to-product
//! POST   /api/v1/admin/offers/apply-to-category
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::domain::catalog::ProductView;
use crate::domain::promotion::{Offer, OfferInput, OfferKind};
use crate::domain::{CategoryId, CategoryOfferOutcome, Error, OfferId, ProductId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CurrentAdmin;
use crate::inbound::http::schemas::{MessageResponse, PageSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{date, page_request, present};

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct OfferBody {
    pub title: String,
    pub description: String,
    /// Percentage, 0 to 100.
    #[schema(example = 20)]
    pub discount: i64,
    /// `product` or `category`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `YYYY-MM-DD`, today or later.
    pub start_date: String,
    /// `YYYY-MM-DD`, on or after `startDate`.
    pub end_date: String,
}

impl TryFrom<OfferBody> for OfferInput {
    type Error = Error;

    fn try_from(body: OfferBody) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: body.kind.parse()?,
            start_date: date("startDate", &body.start_date)?,
            end_date: date("endDate", &body.end_date)?,
            title: body.title,
            description: body.description,
            discount: body.discount,
        })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OfferListParams {
    /// Only unexpired offers of this kind.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplyToProductBody {
    pub offer_id: Option<OfferId>,
    pub product_id: Option<ProductId>,
}

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplyToCategoryBody {
    pub offer_id: Option<OfferId>,
    pub category_id: Option<CategoryId>,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/offers",
    request_body = OfferBody,
    responses(
        (status = 201, description = "Offer created", body = Offer),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["offers"],
    operation_id = "createOffer"
)]
#[post("/offers")]
pub async fn create_offer(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    payload: web::Json<OfferBody>,
) -> ApiResult<HttpResponse> {
    let input = OfferInput::try_from(payload.into_inner())?;
    let offer = state.promotions.create_offer(input).await?;
    Ok(HttpResponse::Created().json(offer))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/offers",
    params(OfferListParams),
    responses(
        (status = 200, description = "Newest first", body = PageSchema<Offer>),
        (status = 400, description = "Invalid type or paging", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["offers"],
    operation_id = "listOffers"
)]
#[get("/offers")]
pub async fn list_offers(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    query: web::Query<OfferListParams>,
) -> ApiResult<web::Json<Page<Offer>>> {
    let kind = query
        .kind
        .as_deref()
        .map(str::parse::<OfferKind>)
        .transpose()?;
    let page = page_request(query.page, query.limit)?;
    Ok(web::Json(state.promotions.offers(kind, page).await?))
}

/// Detaches the offer from every product and category first.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/offers/{id}",
    params(("id" = OfferId, Path, description = "Offer id")),
    responses(
        (status = 200, description = "Offer deleted", body = MessageResponse),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["offers"],
    operation_id = "deleteOffer"
)]
#[delete("/offers/{id}")]
pub async fn delete_offer(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    id: web::Path<OfferId>,
) -> ApiResult<web::Json<MessageResponse>> {
    state.promotions.delete_offer(id.into_inner()).await?;
    Ok(web::Json(MessageResponse::new("offer deleted")))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/offers/apply-to-product",
    request_body = ApplyToProductBody,
    responses(
        (status = 200, description = "Product now carries the offer", body = ProductView),
        (status = 400, description = "Wrong kind or expired offer", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Offer or product not found", body = Error),
        (status = 409, description = "Product already has an equal or better offer", body = Error)
    ),
    tags = ["offers"],
    operation_id = "applyOfferToProduct"
)]
#[post("/offers/apply-to-product")]
pub async fn apply_to_product(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    payload: web::Json<ApplyToProductBody>,
) -> ApiResult<web::Json<ProductView>> {
    let offer_id = present("offerId", payload.offer_id)?;
    let product_id = present("productId", payload.product_id)?;
    Ok(web::Json(
        state
            .promotions
            .apply_offer_to_product(offer_id, product_id)
            .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/offers/apply-to-category",
    request_body = ApplyToCategoryBody,
    responses(
        (status = 200, description = "Updated and skipped product counts", body = CategoryOfferOutcome),
        (status = 400, description = "Wrong kind or expired offer", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Offer or category not found", body = Error),
        (status = 409, description = "Category already has an equal or better offer", body = Error)
    ),
    tags = ["offers"],
    operation_id = "applyOfferToCategory"
)]
#[post("/offers/apply-to-category")]
pub async fn apply_to_category(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    payload: web::Json<ApplyToCategoryBody>,
) -> ApiResult<web::Json<CategoryOfferOutcome>> {
    let offer_id = present("offerId", payload.offer_id)?;
    let category_id = present("categoryId", payload.category_id)?;
    Ok(web::Json(
        state
            .promotions
            .apply_offer_to_category(offer_id, category_id)
            .await?,
    ))
}

#[cfg(test)]
#[path = "offers_tests.rs"]
mod tests;
