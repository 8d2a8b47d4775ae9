//! Customer wallet handlers.
//!
//! ```text
//! GET  /api/v1/user/wallet?page&limit
//! POST /api/v1/user/wallet
//! POST /api/v1/user/wallet/add-money
//! POST /api/v1/user/wallet/verify-payment
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::GatewayOrder;
use crate::domain::wallet::Wallet;
use crate::domain::{Error, TopUpOutcome, WalletStatement};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CurrentUser;
use crate::inbound::http::checkout::GatewayCallbackBody;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{PageParams, present};

#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct AddMoneyBody {
    /// Whole rupees.
    #[schema(example = 500)]
    pub amount: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/user/wallet",
    params(PageParams),
    responses(
        (status = 200, description = "Balance and settled transactions", body = WalletStatement),
        (status = 400, description = "Invalid paging", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No wallet yet", body = Error)
    ),
    tags = ["wallet"],
    operation_id = "getWallet"
)]
#[get("/wallet")]
pub async fn get_wallet(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    query: web::Query<PageParams>,
) -> ApiResult<web::Json<WalletStatement>> {
    Ok(web::Json(
        state.wallet.statement(user.id, query.to_request()?).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/user/wallet",
    responses(
        (status = 201, description = "Empty wallet opened", body = Wallet),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Wallet already exists", body = Error)
    ),
    tags = ["wallet"],
    operation_id = "createWallet"
)]
#[post("/wallet")]
pub async fn create_wallet(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<HttpResponse> {
    let wallet = state.wallet.create(user.id).await?;
    Ok(HttpResponse::Created().json(wallet))
}

/// Start a top-up. The client completes the returned checkout and posts the
/// result to `verify-payment`.
#[utoipa::path(
    post,
    path = "/api/v1/user/wallet/add-money",
    request_body = AddMoneyBody,
    responses(
        (status = 200, description = "Gateway checkout", body = GatewayOrder),
        (status = 400, description = "Amount missing or below one", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No wallet yet", body = Error),
        (status = 503, description = "Payment gateway unavailable", body = Error)
    ),
    tags = ["wallet"],
    operation_id = "addMoney"
)]
#[post("/wallet/add-money")]
pub async fn add_money(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    payload: web::Json<AddMoneyBody>,
) -> ApiResult<web::Json<GatewayOrder>> {
    let amount = present("amount", payload.amount)?;
    Ok(web::Json(state.wallet.add_money(user.id, amount).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/user/wallet/verify-payment",
    request_body = GatewayCallbackBody,
    responses(
        (status = 200, description = "Top-up settled or failed", body = TopUpOutcome),
        (status = 400, description = "Signature mismatch", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Top-up not found", body = Error)
    ),
    tags = ["wallet"],
    operation_id = "verifyTopUp"
)]
#[post("/wallet/verify-payment")]
pub async fn verify_top_up(
    state: web::Data<HttpState>,
    CurrentUser(user): CurrentUser,
    payload: web::Json<GatewayCallbackBody>,
) -> ApiResult<web::Json<TopUpOutcome>> {
    let gateway_order_id = payload.gateway_order_id()?;
    let outcome = payload.outcome()?;
    Ok(web::Json(
        state
            .wallet
            .verify_top_up(user.id, &gateway_order_id, outcome)
            .await?,
    ))
}
