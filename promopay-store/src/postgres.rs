//! PostgreSQL store adapter.

use async_trait::async_trait;
use sqlx::PgPool;

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
// PostgreSQL Store
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL store implementation.
pub struct PostgresStore {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_tables_pg.sql"),
        "0001",
    )
    .await?;

    Ok(())
}

impl PostgresStore {
    /// Creates a new PostgreSQL store with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), StoreError> {
        run_migrations(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentStore for PostgresStore {
    async fn list_active_methods(&self) -> Result<Vec<PaymentMethod>, StoreError> {
        let rows: Vec<DbPaymentMethod> = sqlx::query_as(
            r#"SELECT id, name, kind, is_active, config, created_at
               FROM payment_methods WHERE is_active = TRUE ORDER BY name ASC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(DbPaymentMethod::into_domain).collect()
    }

    async fn get_setting(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let row: Option<DbSettingValue> =
            sqlx::query_as(r#"SELECT value FROM settings WHERE key = $1"#)
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
            r#"SELECT rate FROM exchange_rates WHERE from_currency = $1 AND to_currency = $2"#,
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
        let row: Option<DbProfile> = sqlx::query_as(
            r#"SELECT user_id, points, preferred_currency, country FROM profiles WHERE user_id = $1"#,
        )
        .bind(user_id.into_uuid())
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
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"#,
        )
        .bind(tx.id.into_uuid())
        .bind(tx.user_id.into_uuid())
        .bind(tx.campaign_id.map(|id| id.into_uuid()))
        .bind(tx.amount)
        .bind(tx.currency.code())
        .bind(tx.original_amount)
        .bind(tx.original_currency.code())
        .bind(tx.method.as_str())
        .bind(tx.status.as_str())
        .bind(&tx.gateway_transaction_id)
        .bind(&tx.metadata)
        .bind(tx.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(tx)
    }

    async fn get_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, StoreError> {
        let row: Option<DbTransaction> = sqlx::query_as(
            r#"SELECT id, user_id, campaign_id, amount, currency, original_amount,
                      original_currency, method, status, gateway_transaction_id, metadata, created_at
               FROM transactions WHERE id = $1"#,
        )
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        row.map(DbTransaction::into_domain).transpose()
    }

    async fn list_transactions_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Transaction>, StoreError> {
        let rows: Vec<DbTransaction> = sqlx::query_as(
            r#"SELECT id, user_id, campaign_id, amount, currency, original_amount,
                      original_currency, method, status, gateway_transaction_id, metadata, created_at
               FROM transactions WHERE user_id = $1
               ORDER BY created_at DESC"#,
        )
        .bind(user_id.into_uuid())
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
        // Only pending rows are mutable; callers interpret a zero-row result.
        let result = sqlx::query(
            r#"UPDATE transactions
               SET status = $1,
                   gateway_transaction_id = COALESCE($2, gateway_transaction_id),
                   metadata = CASE WHEN $3::text IS NULL THEN metadata
                                   ELSE jsonb_set(metadata, '{error}', to_jsonb($3::text)) END
               WHERE id = $4 AND status = 'pending'"#,
        )
        .bind(status.as_str())
        .bind(&gateway_transaction_id)
        .bind(&error)
        .bind(id.into_uuid())
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
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))?;

        let row: Option<DbPoints> =
            sqlx::query_as(r#"SELECT points FROM profiles WHERE user_id = $1 FOR UPDATE"#)
                .bind(user_id.into_uuid())
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

        sqlx::query(r#"UPDATE profiles SET points = points - $1 WHERE user_id = $2"#)
            .bind(points)
            .bind(user_id.into_uuid())
            .execute(&mut *db_tx)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO transactions
               (id, user_id, campaign_id, amount, currency, original_amount, original_currency,
                method, status, gateway_transaction_id, metadata, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"#,
        )
        .bind(tx.id.into_uuid())
        .bind(tx.user_id.into_uuid())
        .bind(tx.campaign_id.map(|id| id.into_uuid()))
        .bind(tx.amount)
        .bind(tx.currency.code())
        .bind(tx.original_amount)
        .bind(tx.original_currency.code())
        .bind(tx.method.as_str())
        .bind(tx.status.as_str())
        .bind(&tx.gateway_transaction_id)
        .bind(&tx.metadata)
        .bind(tx.created_at)
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
