//! Monetary amounts as returned by the Shopify Storefront API.
//!
//! Amounts are kept as decimal strings to preserve precision; the provider
//! is authoritative for all pricing, so the storefront never does money
//! arithmetic beyond display formatting.

use serde::{Deserialize, Serialize};

/// Monetary amount with currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Decimal amount as string (preserves precision).
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

impl Money {
    /// Zero in the given currency.
    #[must_use]
    pub fn zero(currency_code: &str) -> Self {
        Self {
            amount: "0.0".to_string(),
            currency_code: currency_code.to_string(),
        }
    }

    /// Format for display (e.g., "$19.99").
    ///
    /// Falls back to the raw amount string when it does not parse as a
    /// number (the provider occasionally returns amounts like "19.9").
    #[must_use]
    pub fn display(&self) -> String {
        self.amount
            .parse::<f64>()
            .map_or_else(|_| format!("${}", self.amount), |amount| {
                format!("${amount:.2}")
            })
    }
}
