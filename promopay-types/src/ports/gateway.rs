//! Payment gateway port.
//!
//! One trait covers both hosted gateway functions so the service layer can
//! be tested against a single mock. Implementations are HTTP clients.

use crate::dto::{CheckoutRequest, CheckoutSession, PaymentIntent, PaymentIntentRequest};
use crate::error::GatewayError;

/// Port trait for external charge initiation.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// Requests a card-processor payment intent for an embedded form.
    async fn create_payment_intent(
        &self,
        req: PaymentIntentRequest,
    ) -> Result<PaymentIntent, GatewayError>;

    /// Requests a hosted checkout session from the regional aggregator.
    async fn initiate_checkout(
        &self,
        req: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    /// The publishable key the UI needs to mount the embedded form, when
    /// one is configured. Card methods are not offered without it.
    fn stripe_publishable_key(&self) -> Option<&str>;
}
