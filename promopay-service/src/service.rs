//! Promotion Payment Application Service
//!
//! Orchestrates domain operations through the store and gateway ports.
//! Contains NO infrastructure logic - pure business orchestration.

use currency_rates::{CurrencyCode, RateTable, apply_rate};
use promopay_types::{
    AppError, CheckoutRequest, CreateTransactionRequest, GatewayError, InitiatePaymentRequest,
    InitiatedPayment, MethodKind, PaymentGateway, PaymentIntentRequest, PaymentMethod,
    PaymentStore, Profile, Transaction, TransactionId, TransactionStatus, UserId,
    WalletChargeRequest,
};

/// Settings key holding the per-country method allow-list.
pub const METHODS_BY_COUNTRY_KEY: &str = "payments.methods_by_country";

/// Settings key for the wallet conversion rate.
pub const POINTS_PER_USD_KEY: &str = "wallet.points_per_usd";

/// Wallet points per USD when no setting overrides it.
pub const DEFAULT_POINTS_PER_USD: f64 = 100.0;

/// Points equivalent of a USD amount in minor units.
pub(crate) fn wallet_points(amount_usd: i64, points_per_usd: f64) -> i64 {
    let major = amount_usd as f64 / CurrencyCode::USD.minor_per_major() as f64;
    (major * points_per_usd).round() as i64
}

/// Application service for promotion payments.
///
/// Generic over `S: PaymentStore` and `G: PaymentGateway` - the adapters are
/// injected at compile time. This enables:
/// - Swapping adapters without code changes
/// - Testing with in-memory store and canned gateway
/// - Compile-time checks for port implementation
pub struct PaymentService<S: PaymentStore, G: PaymentGateway> {
    store: S,
    gateway: G,
}

impl<S: PaymentStore, G: PaymentGateway> PaymentService<S, G> {
    /// Creates a new payment service with the given adapters.
    pub fn new(store: S, gateway: G) -> Self {
        Self { store, gateway }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a reference to the underlying gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Whether the embedded card form can be mounted at all.
    pub fn stripe_enabled(&self) -> bool {
        self.gateway.stripe_publishable_key().is_some()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Payment Method Lookup
    // ─────────────────────────────────────────────────────────────────────────────

    /// All active payment methods, ordered by name.
    #[tracing::instrument(skip(self))]
    pub async fn get_payment_methods(&self) -> Result<Vec<PaymentMethod>, AppError> {
        self.store.list_active_methods().await.map_err(Into::into)
    }

    /// Active methods narrowed to a country's allow-list and a currency.
    ///
    /// A country with no configured entry keeps the full active list, and a
    /// method with no currency config passes any currency filter.
    #[tracing::instrument(skip(self))]
    pub async fn get_available_payment_methods(
        &self,
        country: Option<&str>,
        currency: Option<CurrencyCode>,
    ) -> Result<Vec<PaymentMethod>, AppError> {
        let methods = self.store.list_active_methods().await?;

        let allowed_kinds: Option<Vec<String>> = match country {
            Some(code) => self
                .store
                .get_setting(METHODS_BY_COUNTRY_KEY)
                .await?
                .and_then(|map| map.get(code).cloned())
                .map(|entry| {
                    entry
                        .as_array()
                        .map(|kinds| {
                            kinds
                                .iter()
                                .filter_map(|v| v.as_str().map(str::to_string))
                                .collect()
                        })
                        .unwrap_or_default()
                }),
            None => None,
        };

        Ok(methods
            .into_iter()
            .filter(|m| {
                allowed_kinds
                    .as_ref()
                    .map_or(true, |kinds| kinds.iter().any(|k| k == m.kind.as_str()))
            })
            .filter(|m| currency.map_or(true, |c| m.supports_currency(c)))
            .collect())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Currency Conversion
    // ─────────────────────────────────────────────────────────────────────────────

    /// Converts an amount in minor units between currencies at the stored
    /// point-in-time rate. Identity when the currencies match.
    #[tracing::instrument(skip(self))]
    pub async fn convert_amount(
        &self,
        amount: i64,
        from: CurrencyCode,
        to: CurrencyCode,
    ) -> Result<i64, AppError> {
        if from == to {
            return Ok(amount);
        }

        let rate = self
            .store
            .get_rate(from, to)
            .await?
            .ok_or(AppError::RateNotAvailable(from, to))?;

        Ok(apply_rate(amount, rate))
    }

    /// Snapshots the stored rates for one UI session.
    pub async fn load_rates(&self) -> Result<RateTable, AppError> {
        self.store.load_rates().await.map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Wallet Payment Processing
    // ─────────────────────────────────────────────────────────────────────────────

    /// Pays for a promotion from the user's wallet points balance.
    ///
    /// The points debit and the transaction row are written in one store
    /// transaction: a failure anywhere rolls both back, so the balance is
    /// never reduced without a persisted record.
    #[tracing::instrument(skip(self), fields(user_id = %req.user_id, amount = req.amount))]
    pub async fn process_wallet_payment(
        &self,
        req: WalletChargeRequest,
    ) -> Result<Transaction, AppError> {
        if req.amount <= 0 {
            return Err(AppError::BadRequest("Amount must be positive".into()));
        }

        let points_per_usd = self.points_per_usd().await?;

        let rate = if req.currency == CurrencyCode::USD {
            1.0
        } else {
            self.store
                .get_rate(req.currency, CurrencyCode::USD)
                .await?
                .ok_or(AppError::RateNotAvailable(req.currency, CurrencyCode::USD))?
        };
        let amount_usd = apply_rate(req.amount, rate);
        let points_needed = wallet_points(amount_usd, points_per_usd);

        let profile = self.get_profile(req.user_id).await?;
        if !profile.has_points(points_needed) {
            return Err(AppError::InsufficientPoints {
                needed: points_needed,
                available: profile.points,
            });
        }

        let metadata = serde_json::json!({
            "points_used": points_needed,
            "points_per_usd": points_per_usd,
            "exchange_rate": rate,
        });

        let tx = Transaction::completed(
            req.user_id,
            req.campaign_id,
            amount_usd,
            CurrencyCode::USD,
            req.amount,
            req.currency,
            MethodKind::Wallet,
            metadata,
        );

        let tx = self
            .store
            .record_wallet_charge(req.user_id, points_needed, tx)
            .await?;

        tracing::info!(transaction_id = %tx.id, points = points_needed, "wallet charge recorded");
        Ok(tx)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Transaction Creation & Status Update
    // ─────────────────────────────────────────────────────────────────────────────

    /// Records a transaction row.
    ///
    /// When the caller did not pre-normalize (no original figures given),
    /// the amount is converted into the user's preferred currency and the
    /// request figures become the originals.
    #[tracing::instrument(skip(self), fields(user_id = %req.user_id))]
    pub async fn create_transaction(
        &self,
        req: CreateTransactionRequest,
    ) -> Result<Transaction, AppError> {
        if req.amount <= 0 {
            return Err(AppError::BadRequest("Amount must be positive".into()));
        }

        let (amount, currency, original_amount, original_currency) =
            match (req.original_amount, req.original_currency) {
                (Some(original_amount), Some(original_currency)) => {
                    (req.amount, req.currency, original_amount, original_currency)
                }
                _ => {
                    let profile = self.get_profile(req.user_id).await?;
                    let amount = self
                        .convert_amount(req.amount, req.currency, profile.preferred_currency)
                        .await?;
                    (amount, profile.preferred_currency, req.amount, req.currency)
                }
            };

        let mut tx = Transaction::pending(
            req.user_id,
            req.campaign_id,
            amount,
            currency,
            original_amount,
            original_currency,
            req.method,
        );
        if let Some(status) = req.status {
            tx.status = status;
        }
        if let Some(metadata) = req.metadata {
            tx.metadata = metadata;
        }

        self.store.insert_transaction(tx).await.map_err(Into::into)
    }

    /// Gets a transaction by ID.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, AppError> {
        self.store
            .get_transaction(id)
            .await
            .map_err(Into::into)
            .and_then(|opt| opt.ok_or_else(|| AppError::transaction_not_found(id)))
    }

    /// Lists a user's transactions, newest first.
    pub async fn list_transactions(&self, user_id: UserId) -> Result<Vec<Transaction>, AppError> {
        self.store
            .list_transactions_for_user(user_id)
            .await
            .map_err(Into::into)
    }

    /// Moves a transaction to a new status, optionally recording the
    /// gateway reference.
    ///
    /// A zero-row update is re-read: when the row already sits in a
    /// terminal status a concurrent webhook won the race and the call
    /// succeeds anyway, otherwise the transaction does not exist.
    #[tracing::instrument(skip(self), fields(transaction_id = %id))]
    pub async fn update_transaction_status(
        &self,
        id: TransactionId,
        status: TransactionStatus,
        gateway_transaction_id: Option<String>,
    ) -> Result<(), AppError> {
        let rows = self
            .store
            .update_transaction_status(id, status, gateway_transaction_id, None)
            .await?;
        if rows > 0 {
            return Ok(());
        }

        match self.store.get_transaction(id).await? {
            Some(tx) if tx.status.is_terminal() => {
                tracing::debug!(status = %tx.status, "transaction already settled, treating update as success");
                Ok(())
            }
            _ => Err(AppError::transaction_not_found(id)),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Gateway Initiation
    // ─────────────────────────────────────────────────────────────────────────────

    /// Initiates a card-processor charge: normalizes the amount to USD,
    /// records a pending transaction, and obtains the client secret for an
    /// embedded payment form.
    #[tracing::instrument(skip(self), fields(user_id = %req.user_id, amount = req.amount))]
    pub async fn initialize_stripe_payment(
        &self,
        req: InitiatePaymentRequest,
    ) -> Result<InitiatedPayment, AppError> {
        let amount_usd = self
            .convert_amount(req.amount, req.currency, CurrencyCode::USD)
            .await?;

        let tx = self
            .create_transaction(CreateTransactionRequest {
                user_id: req.user_id,
                campaign_id: req.campaign_id,
                amount: amount_usd,
                currency: CurrencyCode::USD,
                method: MethodKind::Stripe,
                status: None,
                original_amount: Some(req.amount),
                original_currency: Some(req.currency),
                metadata: None,
            })
            .await?;

        let intent = match self
            .gateway
            .create_payment_intent(PaymentIntentRequest {
                amount: amount_usd,
                currency: CurrencyCode::USD,
                transaction_id: tx.id,
            })
            .await
        {
            Ok(intent) => intent,
            Err(err) => {
                self.mark_failed(tx.id, &err).await;
                return Err(err.into());
            }
        };

        // Status stays pending until the webhook settles it; only the
        // gateway reference is attached here.
        self.store
            .update_transaction_status(
                tx.id,
                TransactionStatus::Pending,
                Some(intent.payment_intent_id),
                None,
            )
            .await?;

        Ok(InitiatedPayment::EmbeddedForm {
            client_secret: intent.client_secret,
            transaction_id: tx.id,
        })
    }

    /// Initiates a regional-aggregator charge: normalizes the amount to NGN,
    /// records a pending transaction, and obtains a hosted checkout URL.
    #[tracing::instrument(skip(self), fields(user_id = %req.user_id, amount = req.amount))]
    pub async fn initialize_paystack_payment(
        &self,
        req: InitiatePaymentRequest,
    ) -> Result<InitiatedPayment, AppError> {
        let amount_ngn = self
            .convert_amount(req.amount, req.currency, CurrencyCode::NGN)
            .await?;

        let tx = self
            .create_transaction(CreateTransactionRequest {
                user_id: req.user_id,
                campaign_id: req.campaign_id,
                amount: amount_ngn,
                currency: CurrencyCode::NGN,
                method: MethodKind::Paystack,
                status: None,
                original_amount: Some(req.amount),
                original_currency: Some(req.currency),
                metadata: None,
            })
            .await?;

        let session = match self
            .gateway
            .initiate_checkout(CheckoutRequest {
                amount: amount_ngn,
                currency: CurrencyCode::NGN,
                transaction_id: tx.id,
            })
            .await
        {
            Ok(session) => session,
            Err(err) => {
                self.mark_failed(tx.id, &err).await;
                return Err(err.into());
            }
        };

        self.store
            .update_transaction_status(
                tx.id,
                TransactionStatus::Pending,
                Some(session.reference),
                None,
            )
            .await?;

        Ok(InitiatedPayment::Redirect {
            authorization_url: session.authorization_url,
            transaction_id: tx.id,
        })
    }

    /// Re-attempts a promotion payment with the chosen method.
    ///
    /// Dispatches on the method kind: wallet charges settle immediately,
    /// gateway methods hand back an embedded-form or redirect handle.
    #[tracing::instrument(skip(self), fields(user_id = %req.user_id, method = %kind))]
    pub async fn retry_campaign_payment(
        &self,
        kind: MethodKind,
        req: InitiatePaymentRequest,
    ) -> Result<InitiatedPayment, AppError> {
        match kind {
            MethodKind::Wallet => {
                let tx = self
                    .process_wallet_payment(WalletChargeRequest {
                        user_id: req.user_id,
                        campaign_id: req.campaign_id,
                        amount: req.amount,
                        currency: req.currency,
                    })
                    .await?;
                Ok(InitiatedPayment::Completed {
                    transaction_id: tx.id,
                })
            }
            MethodKind::Stripe => self.initialize_stripe_payment(req).await,
            MethodKind::Paystack => self.initialize_paystack_payment(req).await,
            MethodKind::Paypal => Err(AppError::BadRequest(
                "PayPal payments cannot be initiated from this flow".into(),
            )),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────────

    async fn get_profile(&self, user_id: UserId) -> Result<Profile, AppError> {
        self.store
            .get_profile(user_id)
            .await
            .map_err(Into::into)
            .and_then(|opt| {
                opt.ok_or_else(|| AppError::NotFound(format!("Profile not found for user {}", user_id)))
            })
    }

    async fn points_per_usd(&self) -> Result<f64, AppError> {
        let setting = self.store.get_setting(POINTS_PER_USD_KEY).await?;
        Ok(setting
            .and_then(|v| v.as_f64())
            .unwrap_or(DEFAULT_POINTS_PER_USD))
    }

    /// Marks a transaction failed after a gateway error, recording the
    /// error text in its metadata. Best effort: an unreachable store at
    /// this point must not mask the gateway error the caller gets.
    async fn mark_failed(&self, id: TransactionId, error: &GatewayError) {
        if let Err(store_err) = self
            .store
            .update_transaction_status(
                id,
                TransactionStatus::Failed,
                None,
                Some(error.to_string()),
            )
            .await
        {
            tracing::error!(transaction_id = %id, %store_err, "could not mark transaction failed after gateway error");
        }
    }
}
