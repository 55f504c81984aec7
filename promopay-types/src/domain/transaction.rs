//! Transaction domain model.

use chrono::{DateTime, Utc};
use currency_rates::CurrencyCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::method::MethodKind;
use super::profile::{CampaignId, UserId};

/// Unique identifier for a Transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Creates a new random TransactionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a TransactionId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns the UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TransactionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Lifecycle status of a transaction.
///
/// `pending` is the only mutable state; the other three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Refunded => "refunded",
        }
    }

    /// Terminal statuses are immutable once written.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            "failed" => Ok(TransactionStatus::Failed),
            "refunded" => Ok(TransactionStatus::Refunded),
            _ => Err(format!("Unknown transaction status: {}", s)),
        }
    }
}

/// A recorded promotion payment.
///
/// `amount`/`currency` always hold the normalized (USD or gateway-required)
/// value; `original_amount`/`original_currency` preserve what the user saw.
/// Rows are created `pending` or `completed`, mutated only through status
/// updates, and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,
    /// Paying user
    pub user_id: UserId,
    /// Promoted campaign being paid for, when known
    pub campaign_id: Option<CampaignId>,
    /// Normalized amount in minor units
    pub amount: i64,
    /// Currency of `amount`
    pub currency: CurrencyCode,
    /// Pre-conversion amount in minor units
    pub original_amount: i64,
    /// Currency of `original_amount`
    pub original_currency: CurrencyCode,
    /// Processor family that handled (or will handle) the charge
    pub method: MethodKind,
    pub status: TransactionStatus,
    /// Reference assigned by the external gateway, once known
    pub gateway_transaction_id: Option<String>,
    /// Free-form record: points used, conversion rate, error text
    pub metadata: serde_json::Value,
    /// When the transaction was created
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Creates a new transaction awaiting gateway settlement.
    pub fn pending(
        user_id: UserId,
        campaign_id: Option<CampaignId>,
        amount: i64,
        currency: CurrencyCode,
        original_amount: i64,
        original_currency: CurrencyCode,
        method: MethodKind,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            user_id,
            campaign_id,
            amount,
            currency,
            original_amount,
            original_currency,
            method,
            status: TransactionStatus::Pending,
            gateway_transaction_id: None,
            metadata: serde_json::json!({}),
            created_at: Utc::now(),
        }
    }

    /// Creates a transaction that settled at creation time (wallet charges).
    #[allow(clippy::too_many_arguments)]
    pub fn completed(
        user_id: UserId,
        campaign_id: Option<CampaignId>,
        amount: i64,
        currency: CurrencyCode,
        original_amount: i64,
        original_currency: CurrencyCode,
        method: MethodKind,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            user_id,
            campaign_id,
            amount,
            currency,
            original_amount,
            original_currency,
            method,
            status: TransactionStatus::Completed,
            gateway_transaction_id: None,
            metadata,
            created_at: Utc::now(),
        }
    }

    /// Reconstructs a transaction from database fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: TransactionId,
        user_id: UserId,
        campaign_id: Option<CampaignId>,
        amount: i64,
        currency: CurrencyCode,
        original_amount: i64,
        original_currency: CurrencyCode,
        method: MethodKind,
        status: TransactionStatus,
        gateway_transaction_id: Option<String>,
        metadata: serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            campaign_id,
            amount,
            currency,
            original_amount,
            original_currency,
            method,
            status,
            gateway_transaction_id,
            metadata,
            created_at,
        }
    }
}
