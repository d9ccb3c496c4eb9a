//! The two shared tables (balances, transactions) and their mutation
//! primitives.

use std::collections::HashMap;

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, error};

use card2card_common::{
    AccountRole, OperationId, Pan, Result, Timestamp, Transaction, TransactionStatus,
    TransferError,
};

/// Combined ledger state. Both tables sit behind one lock so a
/// check-and-mutate sequence observes and changes them atomically.
#[derive(Debug, Default)]
struct LedgerState {
    /// Account balances in minor currency units, keyed by PAN.
    balances: HashMap<Pan, i64>,
    /// Transaction records keyed by operation ID.
    transactions: HashMap<OperationId, Transaction>,
}

/// The ledger store. Accounts are never created implicitly; they are
/// seeded once at startup and operations referencing unknown PANs fail.
#[derive(Debug, Default)]
pub struct Ledger {
    inner: Mutex<LedgerState>,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger seeded with initial account balances.
    pub fn seeded(accounts: impl IntoIterator<Item = (Pan, i64)>) -> Self {
        let ledger = Self::new();
        {
            let mut state = ledger.inner.lock();
            for (pan, balance) in accounts {
                state.balances.insert(pan, balance);
            }
        }
        ledger
    }

    /// Enter the critical section. The returned guard exposes every read
    /// and mutation primitive; holding it serializes the caller against
    /// all other create/confirm sequences.
    pub fn begin(&self) -> LedgerTxn<'_> {
        LedgerTxn {
            state: self.inner.lock(),
        }
    }

    /// Read a balance outside any check-and-mutate sequence. Snapshot
    /// only; do not base mutations on it.
    pub fn balance_snapshot(&self, pan: &Pan) -> Option<i64> {
        self.inner.lock().balances.get(pan).copied()
    }
}

/// Guard over the ledger state for the duration of one atomic sequence.
pub struct LedgerTxn<'a> {
    state: MutexGuard<'a, LedgerState>,
}

impl LedgerTxn<'_> {
    /// Get an account balance, or `None` if the PAN is unknown.
    pub fn balance(&self, pan: &Pan) -> Option<i64> {
        self.state.balances.get(pan).copied()
    }

    /// Get an account balance, failing with `AccountNotFound` carrying
    /// the given transfer side for diagnostics.
    pub fn require_account(&self, pan: &Pan, role: AccountRole) -> Result<i64> {
        self.balance(pan).ok_or_else(|| {
            error!(pan = %pan, %role, "account does not exist in the balance table");
            TransferError::AccountNotFound {
                pan: pan.clone(),
                role,
            }
        })
    }

    /// Subtract from an account balance. Unconditional: sufficiency and
    /// existence are validated by the caller under this same guard.
    pub fn debit(&mut self, pan: &Pan, amount: i64) {
        match self.state.balances.get_mut(pan) {
            Some(balance) => {
                *balance -= amount;
                debug!(pan = %pan, amount, balance = *balance, "account debited");
            }
            None => {
                debug_assert!(false, "debit on unknown account {pan}");
                error!(pan = %pan, amount, "debit on unknown account ignored");
            }
        }
    }

    /// Add to an account balance. Unconditional, like [`LedgerTxn::debit`].
    pub fn credit(&mut self, pan: &Pan, amount: i64) {
        match self.state.balances.get_mut(pan) {
            Some(balance) => {
                *balance += amount;
                debug!(pan = %pan, amount, balance = *balance, "account credited");
            }
            None => {
                debug_assert!(false, "credit on unknown account {pan}");
                error!(pan = %pan, amount, "credit on unknown account ignored");
            }
        }
    }

    /// Store a transaction record, keyed by its operation ID.
    pub fn put_transaction(&mut self, transaction: Transaction) -> OperationId {
        let operation_id = transaction.operation_id;
        debug!(operation_id = %operation_id, "transaction stored");
        self.state.transactions.insert(operation_id, transaction);
        operation_id
    }

    /// Look up a transaction by operation ID.
    pub fn transaction(&self, operation_id: &OperationId) -> Option<&Transaction> {
        self.state.transactions.get(operation_id)
    }

    /// All PENDING transactions debiting the given account. Order is not
    /// significant.
    pub fn pending_by_debit_account(&self, pan: &Pan) -> Vec<Transaction> {
        self.state
            .transactions
            .values()
            .filter(|tx| tx.status == TransactionStatus::Pending)
            .filter(|tx| &tx.source == pan)
            .cloned()
            .collect()
    }

    /// Move a transaction to a new status and stamp its processing time.
    /// Returns `false` if the operation ID is unknown or the transition
    /// leaves a terminal state.
    pub fn set_status(
        &mut self,
        operation_id: &OperationId,
        status: TransactionStatus,
        processed_at: Timestamp,
    ) -> bool {
        match self.state.transactions.get_mut(operation_id) {
            Some(transaction) => {
                if !transaction.status.can_transition_to(status) {
                    error!(
                        operation_id = %operation_id,
                        from = ?transaction.status,
                        to = ?status,
                        "status transition not permitted, ignored"
                    );
                    return false;
                }
                transaction.status = status;
                transaction.processed_at = Some(processed_at);
                debug!(operation_id = %operation_id, ?status, "transaction status updated");
                true
            }
            None => false,
        }
    }
}
