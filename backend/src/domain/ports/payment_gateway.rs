//! Port for the online payment gateway.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Error;

use super::define_port_error;

define_port_error! {
    /// Failures talking to the payment gateway.
    pub enum GatewayError {
        /// No credentials were configured.
        NotConfigured => "payment gateway is not configured",
        /// The request never produced a response.
        Transport { message: String } => "payment gateway unreachable: {message}",
        /// The gateway answered with a non-success status.
        Rejected { status: u16, message: String } =>
            "payment gateway rejected the request ({status}): {message}",
        /// The response body could not be understood.
        Decode { message: String } => "payment gateway response unreadable: {message}",
    }
}

impl From<GatewayError> for Error {
    fn from(error: GatewayError) -> Self {
        match error {
            GatewayError::NotConfigured => {
                Self::service_unavailable("online payments are not available")
            }
            GatewayError::Transport { .. } | GatewayError::Rejected { .. } => {
                tracing::error!(%error, "payment gateway call failed");
                Self::service_unavailable("payment gateway is unavailable")
            }
            GatewayError::Decode { .. } => Self::internal(error.to_string()),
        }
    }
}

/// Gateway-side order the client completes checkout against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GatewayOrder {
    pub gateway_order_id: String,
    /// Minor units (paise).
    pub amount: i64,
    pub currency: String,
    /// Public key the client checkout widget needs.
    pub key_id: String,
}

/// What the client reports after a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentProof {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a gateway order for `amount_paise`.
    async fn create_order(
        &self,
        amount_paise: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError>;

    /// Check the checkout signature in constant time.
    fn verify_signature(&self, proof: &PaymentProof) -> Result<bool, GatewayError>;
}
