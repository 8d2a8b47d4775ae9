//! Reqwest-backed Razorpay adapter.
//!
//! Owns transport details only: basic-auth order creation with a request
//! timeout, HTTP status mapping, and HMAC-SHA256 checkout signature checks.

use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::{Client, StatusCode, Url};
use sha2::Sha256;
use tracing::warn;
use zeroize::Zeroizing;

use super::dto::{CreateOrderDto, GatewayOrderDto};
use crate::domain::ports::{GatewayError, GatewayOrder, PaymentGateway, PaymentProof};

type HmacSha256 = Hmac<Sha256>;

/// Default production endpoint.
pub const DEFAULT_RAZORPAY_BASE_URL: &str = "https://api.razorpay.com/";

/// API key pair issued by the gateway.
pub struct RazorpayCredentials {
    pub key_id: String,
    pub key_secret: Zeroizing<String>,
}

/// Gateway adapter creating orders over REST and checking signatures locally.
pub struct RazorpayGateway {
    client: Client,
    orders_url: Url,
    key_id: String,
    key_secret: Zeroizing<String>,
}

impl RazorpayGateway {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] when the base URL cannot be joined
    /// or the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        credentials: RazorpayCredentials,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let orders_url = base_url
            .join("v1/orders")
            .map_err(|err| GatewayError::transport(format!("invalid base URL: {err}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| GatewayError::transport(err.to_string()))?;
        Ok(Self {
            client,
            orders_url,
            key_id: credentials.key_id,
            key_secret: credentials.key_secret,
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(
        &self,
        amount_paise: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        let response = self
            .client
            .post(self.orders_url.clone())
            .basic_auth(&self.key_id, Some(self.key_secret.as_str()))
            .json(&CreateOrderDto {
                amount: amount_paise,
                currency,
                receipt,
            })
            .send()
            .await
            .map_err(|err| GatewayError::transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| GatewayError::transport(err.to_string()))?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        let order = parse_order(body.as_ref())?;
        Ok(GatewayOrder {
            gateway_order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            key_id: self.key_id.clone(),
        })
    }

    fn verify_signature(&self, proof: &PaymentProof) -> Result<bool, GatewayError> {
        Ok(signature_matches(self.key_secret.as_bytes(), proof))
    }
}

/// Compare `proof.signature` with HMAC-SHA256 over `order_id|payment_id`.
fn signature_matches(secret: &[u8], proof: &PaymentProof) -> bool {
    let Ok(expected) = hex::decode(proof.signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(proof.order_id.as_bytes());
    mac.update(b"|");
    mac.update(proof.payment_id.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

fn parse_order(body: &[u8]) -> Result<GatewayOrderDto, GatewayError> {
    serde_json::from_slice(body)
        .map_err(|err| GatewayError::decode(format!("invalid order payload: {err}")))
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GatewayError {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let preview: String = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(PREVIEW_CHAR_LIMIT)
        .collect();
    warn!(status = status.as_u16(), "payment gateway rejected order creation");
    GatewayError::rejected(status.as_u16(), preview)
}

/// Gateway used when no credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredGateway;

#[async_trait]
impl PaymentGateway for UnconfiguredGateway {
    async fn create_order(
        &self,
        _amount_paise: i64,
        _currency: &str,
        _receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        Err(GatewayError::not_configured())
    }

    fn verify_signature(&self, _proof: &PaymentProof) -> Result<bool, GatewayError> {
        Err(GatewayError::not_configured())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn signed(secret: &[u8], order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret).expect("any key length");
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn proof(signature: String) -> PaymentProof {
        PaymentProof {
            order_id: "order_9A33XWu170gUtm".to_owned(),
            payment_id: "pay_29QQoUBi66xm2f".to_owned(),
            signature,
        }
    }

    #[rstest]
    fn accepts_signature_over_order_and_payment() {
        let signature = signed(b"s3cret", "order_9A33XWu170gUtm", "pay_29QQoUBi66xm2f");
        assert!(signature_matches(b"s3cret", &proof(signature)));
    }

    #[rstest]
    #[case::wrong_secret(signed(b"other", "order_9A33XWu170gUtm", "pay_29QQoUBi66xm2f"))]
    #[case::swapped_ids(signed(b"s3cret", "pay_29QQoUBi66xm2f", "order_9A33XWu170gUtm"))]
    #[case::not_hex("zz-not-hex".to_owned())]
    #[case::empty(String::new())]
    fn rejects_bad_signatures(#[case] signature: String) {
        assert!(!signature_matches(b"s3cret", &proof(signature)));
    }

    #[rstest]
    #[case(StatusCode::UNAUTHORIZED)]
    #[case(StatusCode::BAD_GATEWAY)]
    fn non_success_statuses_are_rejections(#[case] status: StatusCode) {
        let error = map_status_error(status, b"{\"error\": {\"code\": \"BAD_REQUEST_ERROR\"}}");
        assert!(matches!(
            error,
            GatewayError::Rejected { status: code, .. } if code == status.as_u16()
        ));
    }

    #[rstest]
    fn parses_order_payload() {
        let body = br#"{"id":"order_EKwxwAgItmmXdp","entity":"order","amount":50000,"currency":"INR","receipt":"ORD-1A2B3C4D","status":"created"}"#;
        let order = parse_order(body).expect("payload decodes");
        assert_eq!(order.id, "order_EKwxwAgItmmXdp");
        assert_eq!(order.amount, 50_000);
    }

    #[rstest]
    fn garbage_payload_is_a_decode_error() {
        assert!(matches!(
            parse_order(b"<html>"),
            Err(GatewayError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn unconfigured_gateway_refuses_orders() {
        let result = UnconfiguredGateway.create_order(100, "INR", "r").await;
        assert!(matches!(result, Err(GatewayError::NotConfigured)));
    }
}
