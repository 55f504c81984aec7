//! Currency Metadata and Session Rate Tables
//!
//! Currencies are defined declaratively using a macro that auto-generates
//! the `CurrencyCode` enum together with its metadata accessors and parsing.
//! Exchange rates are NOT baked in: they are sourced externally, loaded into
//! a [`RateTable`] snapshot for the lifetime of a single user session, and
//! discarded with it.
//!
//! # Adding a New Currency
//! Add a line to the `define_currencies!` macro invocation:
//! ```ignore
//! define_currencies! {
//!     // ... existing currencies ...
//!     KES => ("KES", "KSh", "cent", 100),
//! }
//! ```
//!
//! # Example
//! ```
//! use currency_rates::{CurrencyCode, RateTable};
//!
//! let mut rates = RateTable::new();
//! rates.insert(CurrencyCode::EUR, CurrencyCode::USD, 1.1);
//!
//! // 50.00 EUR in minor units -> 55.00 USD in minor units
//! assert_eq!(rates.convert(5000, CurrencyCode::EUR, CurrencyCode::USD), Some(5500));
//! ```

use std::collections::HashMap;
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Minor-unit arithmetic
// ─────────────────────────────────────────────────────────────────────────────

/// Applies a multiplicative rate to an amount in minor units, rounding to the
/// nearest minor unit of the target currency.
pub fn apply_rate(amount: i64, rate: f64) -> i64 {
    (amount as f64 * rate).round() as i64
}

// ─────────────────────────────────────────────────────────────────────────────
// THE MACRO: defines the CurrencyCode enum and its metadata
// ─────────────────────────────────────────────────────────────────────────────

/// Macro to define currencies with auto-generated metadata and parsing.
///
/// # Syntax
/// ```ignore
/// define_currencies! {
///     CurrencyName => ("CODE", "SYMBOL", "minor_unit", minor_per_major),
/// }
/// ```
#[macro_export]
macro_rules! define_currencies {
    (
        $(
            $name:ident => ($code:literal, $symbol:literal, $minor:literal, $minor_per_major:expr)
        ),* $(,)?
    ) => {
        /// Runtime currency identifier.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "UPPERCASE")]
        pub enum CurrencyCode {
            $($name),*
        }

        impl CurrencyCode {
            pub fn code(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $code),*
                }
            }

            pub fn symbol(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $symbol),*
                }
            }

            pub fn minor_unit(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $minor),*
                }
            }

            pub fn minor_per_major(&self) -> i64 {
                match self {
                    $(CurrencyCode::$name => $minor_per_major),*
                }
            }

            pub fn all() -> &'static [CurrencyCode] {
                &[$(CurrencyCode::$name),*]
            }
        }

        impl std::fmt::Display for CurrencyCode {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.code())
            }
        }

        impl std::str::FromStr for CurrencyCode {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_uppercase().as_str() {
                    $($code => Ok(CurrencyCode::$name),)*
                    _ => Err(format!("Unknown currency: {}", s)),
                }
            }
        }
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// CURRENCY DEFINITIONS - Add new currencies here!
// ─────────────────────────────────────────────────────────────────────────────

define_currencies! {
    USD => ("USD", "$", "cent", 100),
    EUR => ("EUR", "€", "cent", 100),
    GBP => ("GBP", "£", "penny", 100),
    NGN => ("NGN", "₦", "kobo", 100),
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Rate Table
// ─────────────────────────────────────────────────────────────────────────────

/// A point-in-time snapshot of pairwise exchange rates.
///
/// Holds whatever `(from, to)` pairs the external source provided when the
/// session opened. `rate`/`convert` answer only from that data; the
/// `display_*` variants additionally try a two-hop route through USD and fall
/// back to 1:1 with a warning. The display path exists so a UI can render
/// approximate figures before any authoritative round trip and MUST NOT be
/// used for persisted amounts.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: HashMap<(CurrencyCode, CurrencyCode), f64>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the rate for one unit of `from` expressed in `to`.
    pub fn insert(&mut self, from: CurrencyCode, to: CurrencyCode, rate: f64) {
        self.rates.insert((from, to), rate);
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Direct rate lookup. Identity pairs are always 1.0.
    pub fn rate(&self, from: CurrencyCode, to: CurrencyCode) -> Option<f64> {
        if from == to {
            return Some(1.0);
        }
        self.rates.get(&(from, to)).copied()
    }

    /// Converts an amount in minor units using a direct rate only.
    pub fn convert(&self, amount: i64, from: CurrencyCode, to: CurrencyCode) -> Option<i64> {
        self.rate(from, to).map(|r| apply_rate(amount, r))
    }

    /// Display-only rate: direct, else two-hop via USD, else 1:1.
    ///
    /// The fallback tiers are logged because the result can diverge from the
    /// authoritative conversion when rate data is partial or asymmetric.
    pub fn display_rate(&self, from: CurrencyCode, to: CurrencyCode) -> f64 {
        if let Some(rate) = self.rate(from, to) {
            return rate;
        }
        if let (Some(leg_in), Some(leg_out)) = (
            self.rate(from, CurrencyCode::USD),
            self.rate(CurrencyCode::USD, to),
        ) {
            return leg_in * leg_out;
        }
        tracing::warn!(%from, %to, "no exchange rate available, rendering at 1:1");
        1.0
    }

    /// Display-only conversion of an amount in minor units.
    pub fn display_convert(&self, amount: i64, from: CurrencyCode, to: CurrencyCode) -> i64 {
        apply_rate(amount, self.display_rate(from, to))
    }
}

impl FromIterator<(CurrencyCode, CurrencyCode, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (CurrencyCode, CurrencyCode, f64)>>(iter: I) -> Self {
        let mut table = RateTable::new();
        for (from, to, rate) in iter {
            table.insert(from, to, rate);
        }
        table
    }
}

impl fmt::Display for RateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RateTable({} pairs)", self.rates.len())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RateTable {
        let mut t = RateTable::new();
        t.insert(CurrencyCode::EUR, CurrencyCode::USD, 1.1);
        t.insert(CurrencyCode::USD, CurrencyCode::NGN, 1500.0);
        t
    }

    #[test]
    fn test_identity_rate() {
        let t = RateTable::new();
        assert_eq!(t.rate(CurrencyCode::USD, CurrencyCode::USD), Some(1.0));
        assert_eq!(t.convert(1234, CurrencyCode::EUR, CurrencyCode::EUR), Some(1234));
    }

    #[test]
    fn test_direct_conversion() {
        let t = table();
        assert_eq!(t.convert(5000, CurrencyCode::EUR, CurrencyCode::USD), Some(5500));
    }

    #[test]
    fn test_missing_rate_is_none() {
        let t = table();
        assert_eq!(t.rate(CurrencyCode::GBP, CurrencyCode::NGN), None);
        assert_eq!(t.convert(100, CurrencyCode::GBP, CurrencyCode::NGN), None);
    }

    #[test]
    fn test_display_rate_prefers_direct() {
        let mut t = table();
        t.insert(CurrencyCode::EUR, CurrencyCode::NGN, 1600.0);
        assert_eq!(t.display_rate(CurrencyCode::EUR, CurrencyCode::NGN), 1600.0);
    }

    #[test]
    fn test_display_rate_two_hop_via_usd() {
        let t = table();
        // EUR -> USD -> NGN = 1.1 * 1500
        let rate = t.display_rate(CurrencyCode::EUR, CurrencyCode::NGN);
        assert!((rate - 1650.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_display_rate_fallback_is_one() {
        let t = RateTable::new();
        assert_eq!(t.display_rate(CurrencyCode::GBP, CurrencyCode::NGN), 1.0);
        assert_eq!(t.display_convert(750, CurrencyCode::GBP, CurrencyCode::NGN), 750);
    }

    #[test]
    fn test_apply_rate_rounds_to_nearest() {
        assert_eq!(apply_rate(333, 0.5), 167);
        assert_eq!(apply_rate(100, 1.005), 101);
    }

    #[test]
    fn test_currency_code_parse() {
        assert_eq!("USD".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert_eq!("ngn".parse::<CurrencyCode>().unwrap(), CurrencyCode::NGN);
        assert!("XXX".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_currency_code_display() {
        assert_eq!(CurrencyCode::EUR.to_string(), "EUR");
    }

    #[test]
    fn test_currency_code_all() {
        let all = CurrencyCode::all();
        assert_eq!(all.len(), 4);
        assert!(all.contains(&CurrencyCode::NGN));
    }

    #[test]
    fn test_from_iterator() {
        let t: RateTable = [(CurrencyCode::EUR, CurrencyCode::USD, 1.1)]
            .into_iter()
            .collect();
        assert_eq!(t.len(), 1);
    }
}
