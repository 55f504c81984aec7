//! # PromoPay Gateway Client
//!
//! Typed client for the two hosted gateway functions this subsystem calls:
//! `create-payment-intent` (card processor) and `paystack-initiate-payment`
//! (regional aggregator). Both are plain `POST` + JSON with a bearer
//! credential taken from the injected [`GatewayConfig`].

mod config;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use promopay_types::{
    CheckoutRequest, CheckoutSession, GatewayError, PaymentGateway, PaymentIntent,
    PaymentIntentRequest,
};

pub use config::GatewayConfig;

/// HTTP client for the hosted gateway functions.
pub struct GatewayClient {
    config: GatewayConfig,
    http: Client,
}

impl GatewayClient {
    /// Creates a new client from an injected configuration.
    pub fn new(mut config: GatewayConfig) -> Self {
        config.project_url = config.project_url.trim_end_matches('/').to_string();
        Self {
            config,
            http: Client::new(),
        }
    }

    fn function_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{}", self.config.project_url, name)
    }

    async fn post_function<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        name: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        let resp = self
            .http
            .post(self.function_url(name))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp
                .text()
                .await
                .map_err(|e| GatewayError::Transport(e.to_string()))?;
            serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl PaymentGateway for GatewayClient {
    #[tracing::instrument(skip(self), fields(transaction_id = %req.transaction_id))]
    async fn create_payment_intent(
        &self,
        req: PaymentIntentRequest,
    ) -> Result<PaymentIntent, GatewayError> {
        self.post_function("create-payment-intent", &req).await
    }

    #[tracing::instrument(skip(self), fields(transaction_id = %req.transaction_id))]
    async fn initiate_checkout(
        &self,
        req: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        self.post_function("paystack-initiate-payment", &req).await
    }

    fn stripe_publishable_key(&self) -> Option<&str> {
        self.config.stripe_publishable_key.as_deref()
    }
}
