//! Data Transfer Objects (DTOs) for requests and responses.

use currency_rates::CurrencyCode;
use serde::{Deserialize, Serialize};

use crate::domain::{CampaignId, MethodKind, TransactionId, TransactionStatus, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// Service operation DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to pay for a promotion from the wallet points balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletChargeRequest {
    pub user_id: UserId,
    /// Campaign being promoted, when the charge is tied to one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<CampaignId>,
    /// Amount in minor units of `currency`
    pub amount: i64,
    pub currency: CurrencyCode,
}

/// Request to record a transaction row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<CampaignId>,
    /// Amount in minor units of `currency`
    pub amount: i64,
    pub currency: CurrencyCode,
    pub method: MethodKind,
    /// Initial status; defaults to `pending`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    /// Pre-conversion figures, when the caller already normalized the amount.
    /// When absent, the request amount/currency are taken as what the user saw.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_currency: Option<CurrencyCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Request to initiate an external gateway charge for a promotion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiatePaymentRequest {
    pub user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<CampaignId>,
    /// Amount in minor units of `currency`, as the user saw it
    pub amount: i64,
    pub currency: CurrencyCode,
}

/// The handle a successful initiation hands back to the UI.
///
/// The variant determines what the UI does next: render an embedded payment
/// form, redirect to a hosted checkout page, or nothing at all because the
/// charge already settled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InitiatedPayment {
    /// Charge settled immediately (wallet)
    #[serde(rename_all = "camelCase")]
    Completed { transaction_id: TransactionId },
    /// Card processor client secret for an embedded form
    #[serde(rename_all = "camelCase")]
    EmbeddedForm {
        client_secret: String,
        transaction_id: TransactionId,
    },
    /// Hosted checkout URL to redirect the user to
    #[serde(rename_all = "camelCase")]
    Redirect {
        authorization_url: String,
        transaction_id: TransactionId,
    },
}

impl InitiatedPayment {
    pub fn transaction_id(&self) -> TransactionId {
        match self {
            InitiatedPayment::Completed { transaction_id }
            | InitiatedPayment::EmbeddedForm { transaction_id, .. }
            | InitiatedPayment::Redirect { transaction_id, .. } => *transaction_id,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Gateway wire DTOs (camelCase to match the serverless functions)
// ─────────────────────────────────────────────────────────────────────────────

/// Body for the `create-payment-intent` function.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    /// Amount in minor units of `currency`
    pub amount: i64,
    pub currency: CurrencyCode,
    /// Our transaction id, echoed into the processor metadata
    pub transaction_id: TransactionId,
}

/// Response from the `create-payment-intent` function.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub client_secret: String,
    pub payment_intent_id: String,
}

/// Body for the `paystack-initiate-payment` function.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Amount in minor units of `currency`
    pub amount: i64,
    pub currency: CurrencyCode,
    pub transaction_id: TransactionId,
}

/// Response from the `paystack-initiate-payment` function.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub authorization_url: String,
    pub reference: String,
}
