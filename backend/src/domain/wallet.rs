//! Customer wallet and its ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{TransactionId, UserId};

/// Direction of a wallet movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
}

impl TransactionKind {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

/// Settlement state of a wallet movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Gateway order created, payment not yet verified.
    Initiated,
    Pending,
    Success,
    Failed,
}

impl TransactionStatus {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initiated => "initiated",
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    /// Whether the movement appears in the customer's statement.
    pub fn is_visible(self) -> bool {
        !matches!(self, Self::Initiated | Self::Failed)
    }
}

/// A customer's stored balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    #[serde(skip)]
    pub user_id: UserId,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub id: TransactionId,
    #[serde(skip)]
    pub user_id: UserId,
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WalletTransaction {
    /// A settled movement of `amount`.
    pub fn settled(
        user_id: UserId,
        kind: TransactionKind,
        amount: i64,
        description: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::random(),
            user_id,
            amount,
            kind,
            status: TransactionStatus::Success,
            description: description.into(),
            gateway_order_id: None,
            gateway_payment_id: None,
            created_at: at,
        }
    }

    /// A top-up waiting for gateway confirmation.
    pub fn top_up(user_id: UserId, amount: i64, gateway_order_id: String, at: DateTime<Utc>) -> Self {
        Self {
            status: TransactionStatus::Initiated,
            gateway_order_id: Some(gateway_order_id),
            ..Self::settled(user_id, TransactionKind::Credit, amount, "Wallet top-up", at)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::now;
    use rstest::rstest;

    #[rstest]
    #[case(TransactionStatus::Initiated, false)]
    #[case(TransactionStatus::Failed, false)]
    #[case(TransactionStatus::Pending, true)]
    #[case(TransactionStatus::Success, true)]
    fn statement_visibility(#[case] status: TransactionStatus, #[case] visible: bool) {
        assert_eq!(status.is_visible(), visible);
    }

    #[test]
    fn top_up_starts_initiated() {
        let tx = WalletTransaction::top_up(UserId::random(), 500, "order_1".into(), now());
        assert_eq!(tx.status, TransactionStatus::Initiated);
        assert_eq!(tx.kind, TransactionKind::Credit);
        assert_eq!(tx.gateway_order_id.as_deref(), Some("order_1"));
        let json = serde_json::to_value(&tx).expect("json");
        assert_eq!(json["type"], "credit");
    }
}
