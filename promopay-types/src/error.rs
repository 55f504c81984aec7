//! Error types for the promotion payments service.

use currency_rates::CurrencyCode;

use crate::domain::{TransactionId, UserId};

/// Domain-level errors (business logic violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Amount cannot be negative")]
    NegativeAmount,

    #[error("Insufficient points: {needed} needed, {available} available")]
    InsufficientPoints { needed: i64, available: i64 },

    #[error("Profile not found for user {0}")]
    ProfileNotFound(UserId),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Store-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Entity not found")]
    NotFound,
}

/// Gateway-level errors (failures initiating an external charge).
///
/// Deliberately free of HTTP-client types so the port trait stays IO-free;
/// the adapter maps its transport errors into `Transport`.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Gateway returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Gateway request failed: {0}")]
    Transport(String),

    #[error("Gateway response malformed: {0}")]
    Decode(String),
}

/// Application-level errors: the uniform failure side of every public
/// service operation. Nothing panics or throws past this boundary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient points: {needed} needed, {available} available")]
    InsufficientPoints { needed: i64, available: i64 },

    #[error("No exchange rate for {0} -> {1}")]
    RateNotAvailable(CurrencyCode, CurrencyCode),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Standard error for a status update against an unknown transaction.
    pub fn transaction_not_found(id: TransactionId) -> Self {
        AppError::NotFound(format!("Transaction not found: {}", id))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Domain(DomainError::InsufficientPoints { needed, available }) => {
                AppError::InsufficientPoints { needed, available }
            }
            StoreError::Domain(DomainError::ProfileNotFound(id)) => {
                AppError::NotFound(format!("Profile not found for user {}", id))
            }
            StoreError::Domain(DomainError::ValidationError(msg)) => AppError::BadRequest(msg),
            StoreError::Domain(e) => AppError::BadRequest(e.to_string()),
            StoreError::NotFound => AppError::NotFound("Resource not found".into()),
            StoreError::Database(e) => AppError::Internal(e),
            StoreError::Transaction(e) => AppError::Internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_points_maps_through() {
        let err: AppError = StoreError::Domain(DomainError::InsufficientPoints {
            needed: 5500,
            available: 100,
        })
        .into();
        assert!(matches!(
            err,
            AppError::InsufficientPoints {
                needed: 5500,
                available: 100
            }
        ));
    }

    #[test]
    fn test_error_messages_carry_counts() {
        let err = AppError::InsufficientPoints {
            needed: 5500,
            available: 100,
        };
        let msg = err.to_string();
        assert!(msg.contains("5500"));
        assert!(msg.contains("100"));
    }
}
