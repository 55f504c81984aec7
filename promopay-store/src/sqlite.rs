//! SQLite store adapter.

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use std::str::FromStr;

use currency_rates::{CurrencyCode, RateTable};
use promopay_types::{
    DomainError, PaymentMethod, PaymentStore, Profile, StoreError, Transaction, TransactionId,
    TransactionStatus, UserId,
};

use crate::types::{
    DbPaymentMethod, DbPoints, DbProfile, DbRate, DbRatePair, DbSettingValue, DbTransaction,
    parse_currency,
};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Store
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite store implementation.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates a new SQLite store with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        // Run migration from migration file
        let ddl = include_str!("../migrations/0001_create_tables.sql");
        sqlx::query(ddl).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), StoreError> {
        let ddl = include_str!("../migrations/0001_create_tables.sql");
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentStore for SqliteStore {
    async fn list_active_methods(&self) -> Result<Vec<PaymentMethod>, StoreError> {
        let rows: Vec<DbPaymentMethod> = sqlx::query_as(
            r#"SELECT id, name, kind, is_active, config, created_at
               FROM payment_methods WHERE is_active = 1 ORDER BY name ASC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(DbPaymentMethod::into_domain).collect()
    }

    async fn get_setting(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let row: Option<DbSettingValue> =
            sqlx::query_as(r#"SELECT value FROM settings WHERE key = ?"#)
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;

        row.map(DbSettingValue::into_value).transpose()
    }

    async fn get_rate(
        &self,
        from: CurrencyCode,
        to: CurrencyCode,
    ) -> Result<Option<f64>, StoreError> {
        let row: Option<DbRate> = sqlx::query_as(
            r#"SELECT rate FROM exchange_rates WHERE from_currency = ? AND to_currency = ?"#,
        )
        .bind(from.code())
        .bind(to.code())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(row.map(|r| r.rate))
    }

    async fn load_rates(&self) -> Result<RateTable, StoreError> {
        let rows: Vec<DbRatePair> =
            sqlx::query_as(r#"SELECT from_currency, to_currency, rate FROM exchange_rates"#)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut table = RateTable::new();
        for row in rows {
            let from = parse_currency(&row.from_currency)?;
            let to = parse_currency(&row.to_currency)?;
            table.insert(from, to, row.rate);
        }
        Ok(table)
    }

    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError> {
        let user_id_str = user_id.to_string();

        let row: Option<DbProfile> = sqlx::query_as(
            r#"SELECT user_id, points, preferred_currency, country FROM profiles WHERE user_id = ?"#,
        )
        .bind(&user_id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        row.map(DbProfile::into_domain).transpose()
    }

    async fn insert_transaction(&self, tx: Transaction) -> Result<Transaction, StoreError> {
        sqlx::query(
            r#"INSERT INTO transactions
               (id, user_id, campaign_id, amount, currency, original_amount, original_currency,
                method, status, gateway_transaction_id, metadata, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(tx.id.to_string())
        .bind(tx.user_id.to_string())
        .bind(tx.campaign_id.map(|id| id.to_string()))
        .bind(tx.amount)
        .bind(tx.currency.code())
        .bind(tx.original_amount)
        .bind(tx.original_currency.code())
        .bind(tx.method.as_str())
        .bind(tx.status.as_str())
        .bind(&tx.gateway_transaction_id)
        .bind(tx.metadata.to_string())
        .bind(tx.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(tx)
    }

    async fn get_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, StoreError> {
        let id_str = id.to_string();

        let row: Option<DbTransaction> = sqlx::query_as(
            r#"SELECT id, user_id, campaign_id, amount, currency, original_amount,
                      original_currency, method, status, gateway_transaction_id, metadata, created_at
               FROM transactions WHERE id = ?"#,
        )
        .bind(&id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        row.map(DbTransaction::into_domain).transpose()
    }

    async fn list_transactions_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Transaction>, StoreError> {
        let user_id_str = user_id.to_string();

        let rows: Vec<DbTransaction> = sqlx::query_as(
            r#"SELECT id, user_id, campaign_id, amount, currency, original_amount,
                      original_currency, method, status, gateway_transaction_id, metadata, created_at
               FROM transactions WHERE user_id = ?
               ORDER BY created_at DESC"#,
        )
        .bind(&user_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(DbTransaction::into_domain).collect()
    }

    async fn update_transaction_status(
        &self,
        id: TransactionId,
        status: TransactionStatus,
        gateway_transaction_id: Option<String>,
        error: Option<String>,
    ) -> Result<u64, StoreError> {
        let id_str = id.to_string();

        // Only pending rows are mutable; callers interpret a zero-row result.
        let result = sqlx::query(
            r#"UPDATE transactions
               SET status = ?,
                   gateway_transaction_id = COALESCE(?, gateway_transaction_id),
                   metadata = CASE WHEN ? IS NULL THEN metadata
                                   ELSE json_set(metadata, '$.error', ?) END
               WHERE id = ? AND status = 'pending'"#,
        )
        .bind(status.as_str())
        .bind(&gateway_transaction_id)
        .bind(&error)
        .bind(&error)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn record_wallet_charge(
        &self,
        user_id: UserId,
        points: i64,
        tx: Transaction,
    ) -> Result<Transaction, StoreError> {
        let user_id_str = user_id.to_string();

        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))?;

        let row: Option<DbPoints> =
            sqlx::query_as(r#"SELECT points FROM profiles WHERE user_id = ?"#)
                .bind(&user_id_str)
                .fetch_optional(&mut *db_tx)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;

        let profile = row.ok_or(StoreError::NotFound)?;

        if profile.points < points {
            return Err(StoreError::Domain(DomainError::InsufficientPoints {
                needed: points,
                available: profile.points,
            }));
        }

        sqlx::query(r#"UPDATE profiles SET points = points - ? WHERE user_id = ?"#)
            .bind(points)
            .bind(&user_id_str)
            .execute(&mut *db_tx)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO transactions
               (id, user_id, campaign_id, amount, currency, original_amount, original_currency,
                method, status, gateway_transaction_id, metadata, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(tx.id.to_string())
        .bind(tx.user_id.to_string())
        .bind(tx.campaign_id.map(|id| id.to_string()))
        .bind(tx.amount)
        .bind(tx.currency.code())
        .bind(tx.original_amount)
        .bind(tx.original_currency.code())
        .bind(tx.method.as_str())
        .bind(tx.status.as_str())
        .bind(&tx.gateway_transaction_id)
        .bind(tx.metadata.to_string())
        .bind(tx.created_at.to_rfc3339())
        .execute(&mut *db_tx)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        db_tx
            .commit()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))?;

        Ok(tx)
    }
}
