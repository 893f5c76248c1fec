//! # Wallet Service
//!
//! RDM token balance, transaction history and reward redemption.
//!
//! Balance and history are shown on the dashboard's first paint, so both
//! reads race the server against [`READ_TIMEOUT`] and fall back to demo
//! data. Redemption moves tokens and never falls back.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::request::{with_fallback, RequestError, RequestService, Sourced};
use crate::client::services::demo;
use crate::procedure;

/// Timeout for fallback-enabled reads
pub const READ_TIMEOUT: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    /// Spendable RDM tokens
    pub balance: f64,
    /// Earned but not yet settled
    pub pending: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Earned,
    Redeemed,
    Transferred,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    pub reward_id: Uuid,
    pub amount: f64,
}

procedure!(GetBalance, "wallet", "getBalance", () => WalletBalance);
procedure!(GetTransactions, "wallet", "getTransactions", TransactionQuery => Vec<WalletTransaction>);
procedure!(Redeem, "wallet", "redeem", RedeemRequest => WalletTransaction);

#[derive(Debug, Clone)]
pub struct WalletService {
    base: RequestService,
}

impl WalletService {
    pub fn new(base: RequestService) -> Self {
        Self { base }
    }

    pub async fn balance(&self) -> Sourced<WalletBalance> {
        let base = self.base.clone();
        with_fallback(
            async move { base.call::<GetBalance>(&()).await },
            READ_TIMEOUT,
            demo::wallet_balance,
        )
        .await
    }

    /// Most recent transactions, newest first
    pub async fn transactions(&self, limit: u32) -> Sourced<Vec<WalletTransaction>> {
        let base = self.base.clone();
        let query = TransactionQuery { limit };
        with_fallback(
            async move { base.call::<GetTransactions>(&query).await },
            READ_TIMEOUT,
            || {
                let mut transactions = demo::wallet_transactions();
                transactions.truncate(limit as usize);
                transactions
            },
        )
        .await
    }

    pub async fn redeem(&self, reward_id: Uuid, amount: f64) -> Result<WalletTransaction, RequestError> {
        if amount.is_nan() || amount <= 0.0 {
            return Err(RequestError::Api {
                status: 400,
                message: "Redemption amount must be positive".to_string(),
            });
        }
        let request = RedeemRequest { reward_id, amount };
        let transaction = self.base.call::<Redeem>(&request).await?;
        tracing::info!(%reward_id, amount, "reward redeemed");
        Ok(transaction)
    }
}
