//! Payment store port trait.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (Postgres, SQLite, InMemory) will implement this trait.

use currency_rates::{CurrencyCode, RateTable};

use crate::domain::{PaymentMethod, Profile, Transaction, TransactionId, TransactionStatus, UserId};
use crate::error::StoreError;

/// The main store port over payment methods, transactions, profiles,
/// settings, and exchange rates.
#[async_trait::async_trait]
pub trait PaymentStore: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────────
    // Reference Data
    // ─────────────────────────────────────────────────────────────────────────────

    /// Lists all active payment methods, ordered by name.
    async fn list_active_methods(&self) -> Result<Vec<PaymentMethod>, StoreError>;

    /// Reads a settings value by key.
    async fn get_setting(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Reads the point-in-time rate for one unit of `from` expressed in `to`.
    async fn get_rate(
        &self,
        from: CurrencyCode,
        to: CurrencyCode,
    ) -> Result<Option<f64>, StoreError>;

    /// Snapshots every stored rate pair into a session table.
    async fn load_rates(&self) -> Result<RateTable, StoreError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Profiles
    // ─────────────────────────────────────────────────────────────────────────────

    /// Gets a user profile by user id.
    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Transactions
    // ─────────────────────────────────────────────────────────────────────────────

    /// Inserts a transaction row.
    async fn insert_transaction(&self, tx: Transaction) -> Result<Transaction, StoreError>;

    /// Gets a transaction by ID.
    async fn get_transaction(&self, id: TransactionId)
    -> Result<Option<Transaction>, StoreError>;

    /// Lists transactions for a user, newest first.
    async fn list_transactions_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Transaction>, StoreError>;

    /// Updates a pending transaction's status, optionally recording the
    /// gateway reference and an error message under `metadata.error`.
    ///
    /// Returns the number of rows changed. Terminal rows are never touched:
    /// callers decide how to interpret a zero-row result.
    async fn update_transaction_status(
        &self,
        id: TransactionId,
        status: TransactionStatus,
        gateway_transaction_id: Option<String>,
        error: Option<String>,
    ) -> Result<u64, StoreError>;

    /// Atomically debits `points` from the user's wallet and inserts the
    /// transaction row. Either both happen or neither does.
    ///
    /// Fails with `DomainError::InsufficientPoints` when the balance no
    /// longer covers the debit at execution time.
    async fn record_wallet_charge(
        &self,
        user_id: UserId,
        points: i64,
        tx: Transaction,
    ) -> Result<Transaction, StoreError>;
}
