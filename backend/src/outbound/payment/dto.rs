//! Wire shapes for the gateway's order API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct CreateOrderDto<'a> {
    pub(super) amount: i64,
    pub(super) currency: &'a str,
    pub(super) receipt: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct GatewayOrderDto {
    pub(super) id: String,
    pub(super) amount: i64,
    pub(super) currency: String,
}
