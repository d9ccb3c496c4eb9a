//! Error taxonomy for the card2card transfer ledger.

use crate::{OperationId, Pan};
use std::fmt;
use thiserror::Error;

/// Which side of a transfer an account sits on. Kept on the error so
/// diagnostics can tell a bad source from a bad destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRole {
    Source,
    Destination,
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountRole::Source => write!(f, "source"),
            AccountRole::Destination => write!(f, "destination"),
        }
    }
}

/// Where in the two-phase lifecycle a rejection happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStage {
    /// CreateTransfer: the prospective balance check at registration.
    Registration,
    /// ConfirmTransfer: the re-check before applying balances.
    Confirmation,
}

/// Main error type for transfer operations.
#[derive(Error, Debug)]
pub enum TransferError {
    /// Referenced PAN absent from the balance table.
    #[error("{role} account {pan} does not exist in the balance table")]
    AccountNotFound { pan: Pan, role: AccountRole },

    /// The prospective balance would be driven to zero or below.
    #[error("account {pan} balance can become negative, transfer rejected")]
    InsufficientFunds { pan: Pan, stage: TransferStage },

    /// Operation ID unknown to the transaction table.
    #[error("transaction {0} does not exist in the transaction table")]
    OperationNotFound(String),

    /// Confirm attempted on an already committed transaction.
    #[error("transaction {0} is already committed")]
    AlreadyCommitted(OperationId),

    /// Confirm attempted on an already rolled back transaction.
    #[error("transaction {0} was already rolled back")]
    AlreadyRolledBack(OperationId),

    /// Confirm action outside COMMIT/ROLLBACK.
    #[error("unknown action {0:?} for transaction processing")]
    UnknownAction(String),

    /// Configuration gap in the commission rate table. A server-side
    /// fault, not a client error.
    #[error("transfer kind {0:?} is missing from the commission table")]
    UnknownTransferKind(String),
}

impl TransferError {
    /// Numeric code carried on wire-facing error bodies.
    pub fn wire_code(&self) -> u16 {
        match self {
            TransferError::AccountNotFound {
                role: AccountRole::Source,
                ..
            } => 99,
            TransferError::AccountNotFound {
                role: AccountRole::Destination,
                ..
            } => 100,
            TransferError::InsufficientFunds {
                stage: TransferStage::Registration,
                ..
            } => 101,
            TransferError::InsufficientFunds {
                stage: TransferStage::Confirmation,
                ..
            } => 102,
            TransferError::OperationNotFound(_) => 103,
            TransferError::AlreadyCommitted(_) => 104,
            TransferError::AlreadyRolledBack(_) => 105,
            TransferError::UnknownAction(_) => 106,
            TransferError::UnknownTransferKind(_) => 503,
        }
    }

    /// Stable error kind name for logs and protocol surfaces.
    pub fn kind(&self) -> &'static str {
        match self {
            TransferError::AccountNotFound { .. } => "ACCOUNT_NOT_FOUND",
            TransferError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            TransferError::OperationNotFound(_) => "OPERATION_NOT_FOUND",
            TransferError::AlreadyCommitted(_) => "ALREADY_COMMITTED",
            TransferError::AlreadyRolledBack(_) => "ALREADY_ROLLED_BACK",
            TransferError::UnknownAction(_) => "UNKNOWN_ACTION",
            TransferError::UnknownTransferKind(_) => "UNKNOWN_TRANSFER_KIND",
        }
    }
}

/// Result type alias for transfer operations.
pub type Result<T> = std::result::Result<T, TransferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_codes_distinguish_sides() {
        let source = TransferError::AccountNotFound {
            pan: Pan::new("4548987854653322"),
            role: AccountRole::Source,
        };
        let destination = TransferError::AccountNotFound {
            pan: Pan::new("4548987854653311"),
            role: AccountRole::Destination,
        };
        assert_eq!(source.wire_code(), 99);
        assert_eq!(destination.wire_code(), 100);
    }

    #[test]
    fn test_wire_codes_distinguish_stages() {
        let at_create = TransferError::InsufficientFunds {
            pan: Pan::new("4548987854653322"),
            stage: TransferStage::Registration,
        };
        let at_confirm = TransferError::InsufficientFunds {
            pan: Pan::new("4548987854653322"),
            stage: TransferStage::Confirmation,
        };
        assert_eq!(at_create.wire_code(), 101);
        assert_eq!(at_confirm.wire_code(), 102);
    }

    #[test]
    fn test_kind_names_are_stable() {
        let err = TransferError::InsufficientFunds {
            pan: Pan::new("4548987854653322"),
            stage: TransferStage::Registration,
        };
        assert_eq!(err.kind(), "INSUFFICIENT_FUNDS");
        assert_eq!(
            TransferError::UnknownAction("PURGE".to_string()).kind(),
            "UNKNOWN_ACTION"
        );
    }

    #[test]
    fn test_messages_name_the_account_side() {
        let err = TransferError::AccountNotFound {
            pan: Pan::new("1111222233334444"),
            role: AccountRole::Destination,
        };
        let msg = err.to_string();
        assert!(msg.contains("destination"));
        assert!(msg.contains("1111222233334444"));
    }
}
