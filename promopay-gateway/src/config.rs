//! Gateway configuration.
//!
//! Configuration is an explicit value the embedding application constructs
//! and injects; nothing in this crate reads the process environment behind
//! the caller's back.

use std::env;

/// Connection settings for the hosted gateway functions.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the hosting project, e.g. `https://xyz.example.co`
    pub project_url: String,
    /// Bearer credential sent with every function call
    pub api_key: String,
    /// Publishable key for the embedded card form, when card payments
    /// are configured at all
    pub stripe_publishable_key: Option<String>,
}

impl GatewayConfig {
    /// Loads configuration from environment variables, reading a `.env`
    /// file first when one is present. Convenience constructor for
    /// embedders; library code never calls this.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let project_url = env::var("PROMOPAY_PROJECT_URL")
            .map_err(|_| anyhow::anyhow!("PROMOPAY_PROJECT_URL environment variable is required"))?;

        let api_key = env::var("PROMOPAY_API_KEY")
            .map_err(|_| anyhow::anyhow!("PROMOPAY_API_KEY environment variable is required"))?;

        let stripe_publishable_key = env::var("STRIPE_PUBLISHABLE_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        Ok(Self {
            project_url,
            api_key,
            stripe_publishable_key,
        })
    }
}
