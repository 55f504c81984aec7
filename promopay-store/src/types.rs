//! Shared database types with feature-gated fields for SQLite and PostgreSQL.

use sqlx::FromRow;

use promopay_types::{
    CampaignId, CurrencyCode, MethodConfig, MethodId, MethodKind, PaymentMethod, Profile,
    StoreError, Transaction, TransactionId, TransactionStatus, UserId,
};

// ─────────────────────────────────────────────────────────────────────────────
// Feature-gated imports
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(not(feature = "sqlite"))]
use chrono::{DateTime, Utc};
#[cfg(not(feature = "sqlite"))]
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// Payment method row from database.
#[derive(FromRow)]
pub struct DbPaymentMethod {
    #[cfg(not(feature = "sqlite"))]
    pub id: Uuid,
    #[cfg(feature = "sqlite")]
    pub id: String,

    pub name: String,
    pub kind: String,

    #[cfg(not(feature = "sqlite"))]
    pub is_active: bool,
    #[cfg(feature = "sqlite")]
    pub is_active: i64,

    #[cfg(not(feature = "sqlite"))]
    pub config: Option<serde_json::Value>,
    #[cfg(feature = "sqlite")]
    pub config: Option<String>,

    #[cfg(not(feature = "sqlite"))]
    pub created_at: DateTime<Utc>,
    #[cfg(feature = "sqlite")]
    pub created_at: String,
}

/// Transaction row from database.
#[derive(FromRow)]
pub struct DbTransaction {
    #[cfg(not(feature = "sqlite"))]
    pub id: Uuid,
    #[cfg(feature = "sqlite")]
    pub id: String,

    #[cfg(not(feature = "sqlite"))]
    pub user_id: Uuid,
    #[cfg(feature = "sqlite")]
    pub user_id: String,

    #[cfg(not(feature = "sqlite"))]
    pub campaign_id: Option<Uuid>,
    #[cfg(feature = "sqlite")]
    pub campaign_id: Option<String>,

    pub amount: i64,
    pub currency: String,
    pub original_amount: i64,
    pub original_currency: String,
    pub method: String,
    pub status: String,
    pub gateway_transaction_id: Option<String>,

    #[cfg(not(feature = "sqlite"))]
    pub metadata: serde_json::Value,
    #[cfg(feature = "sqlite")]
    pub metadata: String,

    #[cfg(not(feature = "sqlite"))]
    pub created_at: DateTime<Utc>,
    #[cfg(feature = "sqlite")]
    pub created_at: String,
}

/// Profile row from database.
#[derive(FromRow)]
pub struct DbProfile {
    #[cfg(not(feature = "sqlite"))]
    pub user_id: Uuid,
    #[cfg(feature = "sqlite")]
    pub user_id: String,

    pub points: i64,
    pub preferred_currency: String,
    pub country: Option<String>,
}

/// Points-only row for the wallet charge transaction.
#[derive(FromRow)]
pub struct DbPoints {
    pub points: i64,
}

/// Settings value row.
#[derive(FromRow)]
pub struct DbSettingValue {
    #[cfg(not(feature = "sqlite"))]
    pub value: serde_json::Value,
    #[cfg(feature = "sqlite")]
    pub value: String,
}

/// Rate-only row for pair lookups.
#[derive(FromRow)]
pub struct DbRate {
    pub rate: f64,
}

/// Full rate pair row for session snapshots.
#[derive(FromRow)]
pub struct DbRatePair {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

pub fn parse_currency(s: &str) -> Result<CurrencyCode, StoreError> {
    s.parse()
        .map_err(|e: String| StoreError::Database(e))
}

pub fn parse_kind(s: &str) -> Result<MethodKind, StoreError> {
    s.parse()
        .map_err(|e: String| StoreError::Database(e))
}

pub fn parse_status(s: &str) -> Result<TransactionStatus, StoreError> {
    s.parse()
        .map_err(|e: String| StoreError::Database(e))
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion (feature-gated implementations)
// ─────────────────────────────────────────────────────────────────────────────

impl DbPaymentMethod {
    /// Convert database row to domain PaymentMethod.
    pub fn into_domain(self) -> Result<PaymentMethod, StoreError> {
        let kind = parse_kind(&self.kind)?;

        #[cfg(not(feature = "sqlite"))]
        let (id, is_active, config, created_at) = {
            let config: Option<MethodConfig> = self
                .config
                .map(serde_json::from_value)
                .transpose()
                .map_err(|e| StoreError::Database(e.to_string()))?;
            (
                MethodId::from_uuid(self.id),
                self.is_active,
                config,
                self.created_at,
            )
        };

        #[cfg(feature = "sqlite")]
        let (id, is_active, config, created_at) = {
            let uuid =
                uuid::Uuid::parse_str(&self.id).map_err(|e| StoreError::Database(e.to_string()))?;

            let config: Option<MethodConfig> = self
                .config
                .map(|raw| serde_json::from_str(&raw))
                .transpose()
                .map_err(|e| StoreError::Database(e.to_string()))?;

            let created_at = chrono::DateTime::parse_from_rfc3339(&self.created_at)
                .map_err(|e| StoreError::Database(e.to_string()))?
                .with_timezone(&chrono::Utc);

            (
                MethodId::from_uuid(uuid),
                self.is_active != 0,
                config,
                created_at,
            )
        };

        Ok(PaymentMethod::from_parts(
            id, self.name, kind, is_active, config, created_at,
        ))
    }
}

impl DbTransaction {
    /// Convert database row to domain Transaction.
    pub fn into_domain(self) -> Result<Transaction, StoreError> {
        let currency = parse_currency(&self.currency)?;
        let original_currency = parse_currency(&self.original_currency)?;
        let method = parse_kind(&self.method)?;
        let status = parse_status(&self.status)?;

        #[cfg(not(feature = "sqlite"))]
        let (id, user_id, campaign_id, metadata, created_at) = (
            TransactionId::from_uuid(self.id),
            UserId::from_uuid(self.user_id),
            self.campaign_id.map(CampaignId::from_uuid),
            self.metadata,
            self.created_at,
        );

        #[cfg(feature = "sqlite")]
        let (id, user_id, campaign_id, metadata, created_at) = {
            let id =
                uuid::Uuid::parse_str(&self.id).map_err(|e| StoreError::Database(e.to_string()))?;

            let user_id = uuid::Uuid::parse_str(&self.user_id)
                .map_err(|e| StoreError::Database(e.to_string()))?;

            let campaign_id = self
                .campaign_id
                .map(|s| uuid::Uuid::parse_str(&s))
                .transpose()
                .map_err(|e| StoreError::Database(e.to_string()))?
                .map(CampaignId::from_uuid);

            let metadata: serde_json::Value = serde_json::from_str(&self.metadata)
                .map_err(|e| StoreError::Database(e.to_string()))?;

            let created_at = chrono::DateTime::parse_from_rfc3339(&self.created_at)
                .map_err(|e| StoreError::Database(e.to_string()))?
                .with_timezone(&chrono::Utc);

            (
                TransactionId::from_uuid(id),
                UserId::from_uuid(user_id),
                campaign_id,
                metadata,
                created_at,
            )
        };

        Ok(Transaction::from_parts(
            id,
            user_id,
            campaign_id,
            self.amount,
            currency,
            self.original_amount,
            original_currency,
            method,
            status,
            self.gateway_transaction_id,
            metadata,
            created_at,
        ))
    }
}

impl DbProfile {
    /// Convert database row to domain Profile.
    pub fn into_domain(self) -> Result<Profile, StoreError> {
        let preferred_currency = parse_currency(&self.preferred_currency)?;

        #[cfg(not(feature = "sqlite"))]
        let user_id = UserId::from_uuid(self.user_id);

        #[cfg(feature = "sqlite")]
        let user_id = {
            let uuid = uuid::Uuid::parse_str(&self.user_id)
                .map_err(|e| StoreError::Database(e.to_string()))?;
            UserId::from_uuid(uuid)
        };

        Ok(Profile::from_parts(
            user_id,
            self.points,
            preferred_currency,
            self.country,
        ))
    }
}

impl DbSettingValue {
    /// Convert database row to a JSON value.
    pub fn into_value(self) -> Result<serde_json::Value, StoreError> {
        #[cfg(not(feature = "sqlite"))]
        {
            Ok(self.value)
        }

        #[cfg(feature = "sqlite")]
        {
            serde_json::from_str(&self.value).map_err(|e| StoreError::Database(e.to_string()))
        }
    }
}
