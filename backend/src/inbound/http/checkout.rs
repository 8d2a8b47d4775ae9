//! Gateway checkout callbacks shared by order and wallet payments.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ports::PaymentProof;
use crate::domain::{Error, PaymentOutcome};
use crate::inbound::http::validation::present;

/// What the checkout widget hands back: either the three signed ids or an
/// `error` object.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewayCallbackBody {
    #[schema(example = "order_EKwxwAgItmmXdp")]
    pub razorpay_order_id: Option<String>,
    #[schema(example = "pay_29QQoUBi66xm2f")]
    pub razorpay_payment_id: Option<String>,
    /// Hex HMAC-SHA256 of `order_id|payment_id`.
    pub razorpay_signature: Option<String>,
    /// Present when the checkout failed or was dismissed.
    #[schema(value_type = Option<Object>)]
    pub error: Option<Value>,
}

impl GatewayCallbackBody {
    /// Interpret the callback. A present `error` wins over any ids.
    pub fn outcome(&self) -> Result<PaymentOutcome, Error> {
        if self.error.is_some() {
            return Ok(PaymentOutcome::Failure);
        }
        Ok(PaymentOutcome::Success(PaymentProof {
            order_id: present("razorpayOrderId", self.razorpay_order_id.clone())?,
            payment_id: present("razorpayPaymentId", self.razorpay_payment_id.clone())?,
            signature: present("razorpaySignature", self.razorpay_signature.clone())?,
        }))
    }

    /// Gateway order the callback refers to: the signed id on success, the
    /// error metadata otherwise.
    pub fn gateway_order_id(&self) -> Result<String, Error> {
        let from_error = self
            .error
            .as_ref()
            .and_then(|error| error.get("metadata"))
            .and_then(|metadata| metadata.get("orderId").or_else(|| metadata.get("order_id")))
            .and_then(Value::as_str)
            .map(str::to_owned);
        present(
            "razorpayOrderId",
            self.razorpay_order_id.clone().or(from_error),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn parse(value: Value) -> GatewayCallbackBody {
        serde_json::from_value(value).expect("callback body")
    }

    #[test]
    fn signed_ids_become_a_proof() {
        let body = parse(json!({
            "razorpayOrderId": "order_1",
            "razorpayPaymentId": "pay_1",
            "razorpaySignature": "abc",
        }));
        assert_eq!(
            body.outcome().expect("outcome"),
            PaymentOutcome::Success(PaymentProof {
                order_id: "order_1".into(),
                payment_id: "pay_1".into(),
                signature: "abc".into(),
            })
        );
        assert_eq!(body.gateway_order_id().expect("id"), "order_1");
    }

    #[test]
    fn error_payload_is_a_failure() {
        let body = parse(json!({
            "error": { "code": "BAD_REQUEST_ERROR", "metadata": { "order_id": "order_2" } }
        }));
        assert_eq!(body.outcome().expect("outcome"), PaymentOutcome::Failure);
        assert_eq!(body.gateway_order_id().expect("id"), "order_2");
    }

    #[rstest]
    #[case(json!({ "razorpayOrderId": "order_1", "razorpayPaymentId": "pay_1" }), "razorpaySignature")]
    #[case(json!({ "razorpayPaymentId": "pay_1", "razorpaySignature": "abc" }), "razorpayOrderId")]
    fn incomplete_proof_names_the_missing_field(#[case] value: Value, #[case] field: &str) {
        let error = parse(value).outcome().expect_err("incomplete");
        assert_eq!(
            error.details().and_then(|details| details.get("field")),
            Some(&json!(field))
        );
    }

    #[test]
    fn failure_without_metadata_has_no_order_id() {
        let body = parse(json!({ "error": { "code": "X" } }));
        assert!(body.gateway_order_id().is_err());
    }
}
