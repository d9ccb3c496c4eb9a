//! Transaction record and status state machine.

use crate::{Currency, OperationId, Pan, Timestamp};
use serde::{Deserialize, Serialize};

/// Transaction status representing the two-phase lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Registered but not yet confirmed; the amount plus commission is an
    /// encumbrance against the source account, not applied to balances.
    Pending,
    /// Confirmed; balances reflect the movement.
    Committed,
    /// Cancelled, either explicitly or by the commit-time re-check.
    RolledBack,
}

impl TransactionStatus {
    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Committed | TransactionStatus::RolledBack
        )
    }

    /// Get valid next states from current state.
    pub fn valid_transitions(&self) -> &[TransactionStatus] {
        match self {
            TransactionStatus::Pending => {
                &[TransactionStatus::Committed, TransactionStatus::RolledBack]
            }
            TransactionStatus::Committed => &[],
            TransactionStatus::RolledBack => &[],
        }
    }

    /// Check if transition to given state is valid.
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        self.valid_transitions().contains(&next)
    }
}

/// Action requested for a pending transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfirmAction {
    Commit,
    Rollback,
}

impl ConfirmAction {
    /// Parse an action string, case-insensitively. Returns `None` for
    /// anything outside COMMIT/ROLLBACK.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "COMMIT" => Some(ConfirmAction::Commit),
            "ROLLBACK" => Some(ConfirmAction::Rollback),
            _ => None,
        }
    }
}

/// A registered transfer. Transfer fields are captured at creation and
/// never change; only `status` and `processed_at` are mutated, and only
/// by the ledger store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier assigned at creation.
    pub operation_id: OperationId,
    /// Debit side: the account the amount and commission leave.
    pub source: Pan,
    /// Credit side: the account the amount arrives at.
    pub destination: Pan,
    /// Transfer amount in minor currency units.
    pub amount: i64,
    /// Commission in minor currency units, derived once at creation.
    pub commission: i64,
    /// Transfer currency.
    pub currency: Currency,
    /// Current status.
    pub status: TransactionStatus,
    /// When the transaction was registered.
    pub created_at: Timestamp,
    /// When the transaction reached a terminal state.
    pub processed_at: Option<Timestamp>,
}

impl Transaction {
    /// Create a new pending transaction with a fresh operation ID.
    pub fn new(
        source: Pan,
        destination: Pan,
        amount: i64,
        commission: i64,
        currency: Currency,
    ) -> Self {
        Self {
            operation_id: OperationId::new(),
            source,
            destination,
            amount,
            commission,
            currency,
            status: TransactionStatus::Pending,
            created_at: crate::now(),
            processed_at: None,
        }
    }

    /// The full debit this transaction applies (or encumbers) against the
    /// source account. Saturates instead of wrapping for amounts near
    /// `i64::MAX`.
    pub fn total_debit(&self) -> i64 {
        self.amount.saturating_add(self.commission)
    }
}
