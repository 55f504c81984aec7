//! Payment method domain model.
//!
//! Payment methods are immutable reference data: administrators create and
//! edit them outside this subsystem, the service layer only reads them.

use chrono::{DateTime, Utc};
use currency_rates::CurrencyCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a PaymentMethod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodId(Uuid);

impl MethodId {
    /// Creates a new random MethodId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a MethodId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns the UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for MethodId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MethodId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The processor family a payment method routes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    /// Internal wallet points
    Wallet,
    /// Card processor (embedded payment form)
    Stripe,
    /// PayPal
    Paypal,
    /// Regional payment aggregator (hosted checkout redirect)
    Paystack,
}

impl MethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodKind::Wallet => "wallet",
            MethodKind::Stripe => "stripe",
            MethodKind::Paypal => "paypal",
            MethodKind::Paystack => "paystack",
        }
    }
}

impl std::fmt::Display for MethodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MethodKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wallet" => Ok(MethodKind::Wallet),
            "stripe" => Ok(MethodKind::Stripe),
            "paypal" => Ok(MethodKind::Paypal),
            "paystack" => Ok(MethodKind::Paystack),
            _ => Err(format!("Unknown payment method kind: {}", s)),
        }
    }
}

/// Per-method currency configuration, stored as a JSON column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodConfig {
    /// Currencies this method accepts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_currencies: Vec<CurrencyCode>,
    /// Currency the method settles in when none is requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_currency: Option<CurrencyCode>,
}

impl MethodConfig {
    /// Whether this configuration admits the given currency.
    ///
    /// A config that declares no currency data at all is universally
    /// supported. This is the explicit fallback policy, not an oversight.
    pub fn supports(&self, currency: CurrencyCode) -> bool {
        if self.supported_currencies.is_empty() && self.default_currency.is_none() {
            return true;
        }
        self.supported_currencies.contains(&currency) || self.default_currency == Some(currency)
    }
}

/// A payment method available to users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Unique identifier
    pub id: MethodId,
    /// Display name, also the ordering key for listings
    pub name: String,
    /// Processor family
    pub kind: MethodKind,
    /// Inactive methods are never offered
    pub is_active: bool,
    /// Optional currency configuration
    pub config: Option<MethodConfig>,
    /// When the method was created
    pub created_at: DateTime<Utc>,
}

impl PaymentMethod {
    /// Reconstructs a payment method from database fields.
    pub fn from_parts(
        id: MethodId,
        name: String,
        kind: MethodKind,
        is_active: bool,
        config: Option<MethodConfig>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            is_active,
            config,
            created_at,
        }
    }

    /// Whether this method can charge in the given currency.
    ///
    /// Methods with no currency config are treated as universally supported.
    pub fn supports_currency(&self, currency: CurrencyCode) -> bool {
        match &self.config {
            Some(config) => config.supports(currency),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(config: Option<MethodConfig>) -> PaymentMethod {
        PaymentMethod::from_parts(
            MethodId::new(),
            "Card".to_string(),
            MethodKind::Stripe,
            true,
            config,
            Utc::now(),
        )
    }

    #[test]
    fn test_no_config_supports_everything() {
        let m = method(None);
        assert!(m.supports_currency(CurrencyCode::EUR));
        assert!(m.supports_currency(CurrencyCode::NGN));
    }

    #[test]
    fn test_empty_config_supports_everything() {
        let m = method(Some(MethodConfig::default()));
        assert!(m.supports_currency(CurrencyCode::GBP));
    }

    #[test]
    fn test_supported_currencies_filter() {
        let m = method(Some(MethodConfig {
            supported_currencies: vec![CurrencyCode::USD, CurrencyCode::NGN],
            default_currency: None,
        }));
        assert!(m.supports_currency(CurrencyCode::USD));
        assert!(!m.supports_currency(CurrencyCode::EUR));
    }

    #[test]
    fn test_default_currency_counts_as_supported() {
        let m = method(Some(MethodConfig {
            supported_currencies: vec![],
            default_currency: Some(CurrencyCode::NGN),
        }));
        assert!(m.supports_currency(CurrencyCode::NGN));
        assert!(!m.supports_currency(CurrencyCode::USD));
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            MethodKind::Wallet,
            MethodKind::Stripe,
            MethodKind::Paypal,
            MethodKind::Paystack,
        ] {
            assert_eq!(kind.as_str().parse::<MethodKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_config_json_shape() {
        let config: MethodConfig =
            serde_json::from_str(r#"{"supported_currencies":["USD","NGN"]}"#).unwrap();
        assert_eq!(config.supported_currencies.len(), 2);
        assert!(config.default_currency.is_none());
    }
}
