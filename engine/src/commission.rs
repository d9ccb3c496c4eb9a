//! Commission calculation over an injected rate table.

use std::collections::HashMap;

use tracing::error;

use card2card_common::{Result, TransferError};

/// Card-to-card transfer kind, the only kind configured today.
pub const KIND_C2C: &str = "C2C";

/// Pure commission calculator. The rate table is immutable after
/// construction; rates are integer percentages of the transfer amount.
#[derive(Debug, Clone)]
pub struct CommissionCalculator {
    rates: HashMap<String, i64>,
}

impl CommissionCalculator {
    /// Create a calculator from a rate table keyed by transfer kind.
    pub fn new(rates: HashMap<String, i64>) -> Self {
        Self { rates }
    }

    /// Compute the commission for an amount: `floor(amount * rate / 100)`.
    ///
    /// A kind missing from the table is a configuration gap, surfaced as
    /// `UnknownTransferKind` rather than a client error.
    pub fn compute(&self, amount: i64, kind: &str) -> Result<i64> {
        let rate = self.rates.get(kind).copied().ok_or_else(|| {
            error!(kind, "transfer kind missing from the commission table");
            TransferError::UnknownTransferKind(kind.to_string())
        })?;
        // 128-bit intermediate: amount * rate must not wrap for any i64
        // amount. The quotient never exceeds the amount for rates <= 100.
        Ok((amount as i128 * rate as i128 / 100) as i64)
    }
}
