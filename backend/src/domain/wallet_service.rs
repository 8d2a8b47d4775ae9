//! Customer wallets and gateway-funded top-ups.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use pagination::{Page, PageRequest};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::order_service::{CURRENCY, PaymentOutcome};
use super::ports::{GatewayOrder, PaymentGateway, WalletRepository};
use super::pricing::to_paise;
use super::validation::at_least;
use super::wallet::{TransactionStatus, Wallet, WalletTransaction};
use super::{Error, UserId};

/// Balance with one page of settled transactions.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletStatement {
    pub balance: i64,
    #[schema(value_type = Object)]
    pub transactions: Page<WalletTransaction>,
}

/// Result of reconciling a top-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopUpOutcome {
    pub status: TransactionStatus,
    pub balance: i64,
}

/// Wallet reads, creation and top-ups.
#[derive(Clone)]
pub struct WalletService {
    wallets: Arc<dyn WalletRepository>,
    gateway: Arc<dyn PaymentGateway>,
    clock: Arc<dyn Clock>,
}

impl WalletService {
    pub fn new(
        wallets: Arc<dyn WalletRepository>,
        gateway: Arc<dyn PaymentGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            wallets,
            gateway,
            clock,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    async fn existing(&self, user_id: UserId) -> Result<Wallet, Error> {
        self.wallets
            .find(&user_id)
            .await?
            .ok_or_else(|| Error::not_found("wallet not found"))
    }

    pub async fn statement(&self, user_id: UserId, page: PageRequest) -> Result<WalletStatement, Error> {
        let wallet = self.existing(user_id).await?;
        let transactions = self.wallets.statement(&user_id, page).await?;
        Ok(WalletStatement {
            balance: wallet.balance,
            transactions,
        })
    }

    /// Open an empty wallet.
    pub async fn create(&self, user_id: UserId) -> Result<Wallet, Error> {
        if self.wallets.find(&user_id).await?.is_some() {
            return Err(Error::conflict("wallet already exists"));
        }
        let now = self.now();
        let wallet = Wallet {
            user_id,
            balance: 0,
            created_at: now,
            updated_at: now,
        };
        self.wallets.create(&wallet).await?;
        info!(%user_id, "wallet created");
        Ok(wallet)
    }

    /// Start a top-up: raise a gateway order and record the pending credit.
    pub async fn add_money(&self, user_id: UserId, amount: i64) -> Result<GatewayOrder, Error> {
        let amount = at_least("amount", amount, 1)?;
        self.existing(user_id).await?;
        let receipt = format!("WAL-{}", user_id.as_uuid().simple());
        let checkout = self
            .gateway
            .create_order(to_paise(amount), CURRENCY, &receipt)
            .await?;
        let pending = WalletTransaction::top_up(
            user_id,
            amount,
            checkout.gateway_order_id.clone(),
            self.now(),
        );
        self.wallets.record(&pending).await?;
        info!(%user_id, amount, gateway_order_id = %checkout.gateway_order_id, "top-up started");
        Ok(checkout)
    }

    /// Reconcile a top-up checkout for `gateway_order_id`.
    pub async fn verify_top_up(
        &self,
        user_id: UserId,
        gateway_order_id: &str,
        outcome: PaymentOutcome,
    ) -> Result<TopUpOutcome, Error> {
        let pending = self
            .wallets
            .find_initiated(&user_id, gateway_order_id)
            .await?
            .ok_or_else(|| Error::not_found("top-up not found"))?;
        let proof = match outcome {
            PaymentOutcome::Failure => {
                self.wallets.fail_top_up(&pending.id).await?;
                warn!(%user_id, %gateway_order_id, "top-up failed");
                let wallet = self.existing(user_id).await?;
                return Ok(TopUpOutcome {
                    status: TransactionStatus::Failed,
                    balance: wallet.balance,
                });
            }
            PaymentOutcome::Success(proof) => proof,
        };
        if proof.order_id != gateway_order_id || !self.gateway.verify_signature(&proof)? {
            warn!(%user_id, %gateway_order_id, "top-up signature mismatch");
            return Err(Error::invalid_request("payment signature is invalid")
                .with_details(json!({ "code": "signature_mismatch" })));
        }
        let wallet = self
            .wallets
            .complete_top_up(&pending.id, &proof.payment_id, self.now())
            .await?;
        info!(%user_id, amount = pending.amount, "top-up credited");
        Ok(TopUpOutcome {
            status: TransactionStatus::Success,
            balance: wallet.balance,
        })
    }
}

#[cfg(test)]
#[path = "wallet_service_tests.rs"]
mod tests;
