//! Monetary types for the card2card ledger.
//!
//! Amounts and balances are plain `i64` minor currency units throughout;
//! the ledger accepts a single currency.

use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// The single currency the ledger accepts.
    pub fn rub() -> Self {
        Self::new("RUB")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
