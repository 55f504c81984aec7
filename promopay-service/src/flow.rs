//! Retry payment flow.
//!
//! Models the "retry a failed promotion payment" modal as a state machine
//! driving the application service. The embedding UI renders whatever state
//! the flow is in; this is the only layer that turns operation errors into
//! user-facing text.

use currency_rates::{CurrencyCode, RateTable};
use promopay_types::{
    AppError, InitiatePaymentRequest, InitiatedPayment, MethodId, MethodKind, PaymentGateway,
    PaymentMethod, PaymentStore, TransactionId,
};

use crate::PaymentService;
use crate::service::wallet_points;

/// What the modal is showing.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    /// Methods and rates are being fetched
    LoadingMethods,
    /// Methods are listed and selectable
    MethodsReady,
    /// A submission is in flight
    Submitting,
    /// The charge settled immediately (wallet)
    Completed { transaction_id: TransactionId },
    /// Render the embedded card form with this client secret
    EmbeddedForm {
        client_secret: String,
        transaction_id: TransactionId,
    },
    /// Send the user to the hosted checkout page
    Redirect {
        authorization_url: String,
        transaction_id: TransactionId,
    },
    /// Something went wrong; the message is ready for a toast
    Failed { message: String },
}

/// Controller for retrying a failed promotion payment.
///
/// Holds the per-session data the modal needs: the selectable methods, a
/// rate snapshot for rendering point costs, and the user's selection.
pub struct RetryPaymentFlow<'a, S: PaymentStore, G: PaymentGateway> {
    service: &'a PaymentService<S, G>,
    request: InitiatePaymentRequest,
    country: Option<String>,
    methods: Vec<PaymentMethod>,
    rates: RateTable,
    selected: Option<MethodId>,
    state: FlowState,
}

impl<'a, S: PaymentStore, G: PaymentGateway> RetryPaymentFlow<'a, S, G> {
    /// Creates a flow for re-attempting the given payment.
    pub fn new(
        service: &'a PaymentService<S, G>,
        request: InitiatePaymentRequest,
        country: Option<String>,
    ) -> Self {
        Self {
            service,
            request,
            country,
            methods: Vec::new(),
            rates: RateTable::new(),
            selected: None,
            state: FlowState::LoadingMethods,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Methods the user can currently pick from.
    pub fn methods(&self) -> &[PaymentMethod] {
        &self.methods
    }

    pub fn selected_method(&self) -> Option<&PaymentMethod> {
        self.selected
            .and_then(|id| self.methods.iter().find(|m| m.id == id))
    }

    /// Loads the selectable methods and a session rate snapshot.
    pub async fn open(&mut self) -> &FlowState {
        self.state = match self.load().await {
            Ok(()) => FlowState::MethodsReady,
            Err(err) => FlowState::Failed {
                message: err.to_string(),
            },
        };
        &self.state
    }

    async fn load(&mut self) -> Result<(), AppError> {
        let mut methods = self
            .service
            .get_available_payment_methods(self.country.as_deref(), Some(self.request.currency))
            .await?;

        // Without a publishable key the embedded form can never mount, so
        // card methods are not offered at all.
        if !self.service.stripe_enabled() {
            methods.retain(|m| m.kind != MethodKind::Stripe);
        }

        self.methods = methods;
        self.rates = self.service.load_rates().await?;
        Ok(())
    }

    /// Picks a method from the loaded list.
    pub fn select_method(&mut self, id: MethodId) -> Result<(), AppError> {
        if self.state != FlowState::MethodsReady {
            return Err(AppError::BadRequest(
                "No payment method can be selected right now".into(),
            ));
        }
        if !self.methods.iter().any(|m| m.id == id) {
            return Err(AppError::BadRequest("Unknown payment method".into()));
        }
        self.selected = Some(id);
        Ok(())
    }

    /// Submits the retry with the selected method and branches on the shape
    /// of the returned handle: a checkout URL means redirect, a client
    /// secret means embedded form, neither means the charge already settled.
    pub async fn submit(&mut self) -> &FlowState {
        if self.state != FlowState::MethodsReady {
            self.state = FlowState::Failed {
                message: "Nothing to submit in this state".into(),
            };
            return &self.state;
        }

        let Some(method) = self.selected_method().cloned() else {
            self.state = FlowState::Failed {
                message: "Select a payment method first".into(),
            };
            return &self.state;
        };

        self.state = FlowState::Submitting;

        self.state = match self
            .service
            .retry_campaign_payment(method.kind, self.request.clone())
            .await
        {
            Ok(InitiatedPayment::Redirect {
                authorization_url,
                transaction_id,
            }) => FlowState::Redirect {
                authorization_url,
                transaction_id,
            },
            Ok(InitiatedPayment::EmbeddedForm {
                client_secret,
                transaction_id,
            }) => FlowState::EmbeddedForm {
                client_secret,
                transaction_id,
            },
            Ok(InitiatedPayment::Completed { transaction_id }) => {
                FlowState::Completed { transaction_id }
            }
            Err(err) => FlowState::Failed {
                message: err.to_string(),
            },
        };

        &self.state
    }

    /// Returns a failed flow to the method list. Retrying is always a user
    /// action; nothing here backs off or re-submits on its own.
    pub fn retry(&mut self) {
        if matches!(self.state, FlowState::Failed { .. }) {
            self.state = if self.methods.is_empty() {
                FlowState::LoadingMethods
            } else {
                FlowState::MethodsReady
            };
        }
    }

    /// Approximate point cost of this payment, for display before any
    /// authoritative round trip. Uses the session rate snapshot with its
    /// two-hop fallback, so the figure may diverge from the amount the
    /// wallet charge ultimately settles at.
    pub fn display_points_cost(&self, points_per_usd: f64) -> i64 {
        let amount_usd =
            self.rates
                .display_convert(self.request.amount, self.request.currency, CurrencyCode::USD);
        wallet_points(amount_usd, points_per_usd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promopay_types::{TransactionStatus, UserId};

    use crate::service_tests::tests::{MockGateway, MockStore, method, profile};

    fn request(amount: i64, currency: CurrencyCode) -> InitiatePaymentRequest {
        InitiatePaymentRequest {
            user_id: UserId::new(),
            campaign_id: None,
            amount,
            currency,
        }
    }

    fn seeded_store(user_id: UserId) -> MockStore {
        let store = MockStore::new();
        store.add_method(method("Wallet", MethodKind::Wallet, None));
        store.add_method(method("Card", MethodKind::Stripe, None));
        store.add_method(method("Bank Transfer", MethodKind::Paystack, None));
        store.add_profile(profile(user_id, 1_000_000, CurrencyCode::USD));
        store.add_rate(CurrencyCode::EUR, CurrencyCode::USD, 1.1);
        store.add_rate(CurrencyCode::USD, CurrencyCode::NGN, 1500.0);
        store
    }

    #[tokio::test]
    async fn test_open_lists_methods() {
        let req = request(5000, CurrencyCode::EUR);
        let store = seeded_store(req.user_id);
        let service = PaymentService::new(store, MockGateway::new());

        let mut flow = RetryPaymentFlow::new(&service, req, None);
        assert_eq!(*flow.state(), FlowState::LoadingMethods);

        flow.open().await;

        assert_eq!(*flow.state(), FlowState::MethodsReady);
        assert_eq!(flow.methods().len(), 3);
    }

    #[tokio::test]
    async fn test_open_excludes_stripe_without_publishable_key() {
        let req = request(5000, CurrencyCode::EUR);
        let store = seeded_store(req.user_id);
        let service = PaymentService::new(store, MockGateway::without_publishable_key());

        let mut flow = RetryPaymentFlow::new(&service, req, None);
        flow.open().await;

        assert_eq!(*flow.state(), FlowState::MethodsReady);
        assert!(flow.methods().iter().all(|m| m.kind != MethodKind::Stripe));
        assert_eq!(flow.methods().len(), 2);
    }

    #[tokio::test]
    async fn test_wallet_submit_completes_immediately() {
        let req = request(5000, CurrencyCode::EUR);
        let user_id = req.user_id;
        let store = seeded_store(user_id);
        let service = PaymentService::new(store, MockGateway::new());

        let mut flow = RetryPaymentFlow::new(&service, req, None);
        flow.open().await;

        let wallet_id = flow
            .methods()
            .iter()
            .find(|m| m.kind == MethodKind::Wallet)
            .unwrap()
            .id;
        flow.select_method(wallet_id).unwrap();

        let state = flow.submit().await.clone();
        let FlowState::Completed { transaction_id } = state else {
            panic!("expected Completed, got {:?}", state);
        };

        let tx = service.get_transaction(transaction_id).await.unwrap();
        assert_eq!(tx.status, TransactionStatus::Completed);
    }

    #[tokio::test]
    async fn test_stripe_submit_yields_embedded_form() {
        let req = request(5000, CurrencyCode::EUR);
        let store = seeded_store(req.user_id);
        let service = PaymentService::new(store, MockGateway::new());

        let mut flow = RetryPaymentFlow::new(&service, req, None);
        flow.open().await;

        let card_id = flow
            .methods()
            .iter()
            .find(|m| m.kind == MethodKind::Stripe)
            .unwrap()
            .id;
        flow.select_method(card_id).unwrap();

        match flow.submit().await {
            FlowState::EmbeddedForm { client_secret, .. } => {
                assert!(!client_secret.is_empty());
            }
            other => panic!("expected EmbeddedForm, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_gateway_failure_surfaces_as_failed_then_retry() {
        let req = request(5000, CurrencyCode::EUR);
        let store = seeded_store(req.user_id);
        let gateway = MockGateway::failing(502, "bad gateway");
        let service = PaymentService::new(store, gateway);

        let mut flow = RetryPaymentFlow::new(&service, req, None);
        flow.open().await;

        let card_id = flow
            .methods()
            .iter()
            .find(|m| m.kind == MethodKind::Stripe)
            .unwrap()
            .id;
        flow.select_method(card_id).unwrap();

        match flow.submit().await {
            FlowState::Failed { message } => assert!(message.contains("bad gateway")),
            other => panic!("expected Failed, got {:?}", other),
        }

        flow.retry();
        assert_eq!(*flow.state(), FlowState::MethodsReady);
    }

    #[tokio::test]
    async fn test_submit_without_selection_fails() {
        let req = request(5000, CurrencyCode::EUR);
        let store = seeded_store(req.user_id);
        let service = PaymentService::new(store, MockGateway::new());

        let mut flow = RetryPaymentFlow::new(&service, req, None);
        flow.open().await;

        match flow.submit().await {
            FlowState::Failed { message } => assert!(message.contains("Select")),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_select_before_open_is_rejected() {
        let req = request(5000, CurrencyCode::EUR);
        let store = seeded_store(req.user_id);
        let service = PaymentService::new(store, MockGateway::new());

        let mut flow = RetryPaymentFlow::new(&service, req, None);

        let result = flow.select_method(MethodId::new());
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_display_points_cost_uses_session_rates() {
        let req = request(5000, CurrencyCode::EUR);
        let store = seeded_store(req.user_id);
        let service = PaymentService::new(store, MockGateway::new());

        let mut flow = RetryPaymentFlow::new(&service, req, None);
        flow.open().await;

        // 50.00 EUR at 1.1 -> 55.00 USD -> 5500 points at 100/USD
        assert_eq!(flow.display_points_cost(100.0), 5500);
    }

    #[tokio::test]
    async fn test_display_points_cost_falls_back_without_rates() {
        let req = request(7500, CurrencyCode::GBP);
        let store = MockStore::new();
        store.add_profile(profile(req.user_id, 0, CurrencyCode::GBP));
        let service = PaymentService::new(store, MockGateway::new());

        let mut flow = RetryPaymentFlow::new(&service, req, None);
        flow.open().await;

        // No GBP rate anywhere: the display path renders at 1:1.
        assert_eq!(flow.display_points_cost(100.0), 7500);
    }
}
