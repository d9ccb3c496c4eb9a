//! Two-phase transfer lifecycle: create, then commit or roll back.

use std::sync::Arc;

use tracing::{debug, error, info};

use card2card_common::{
    now, AccountRole, ConfirmAction, Currency, OperationId, Pan, Result, Transaction,
    TransactionStatus, TransferError, TransferStage,
};
use card2card_ledger::Ledger;

use crate::commission::{CommissionCalculator, KIND_C2C};
use crate::config::EngineConfig;

/// A validated transfer request. Field syntax (PAN format, CVV, expiry,
/// currency) is the boundary adapter's responsibility; the engine only
/// enforces account existence and the balance invariant.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub source: Pan,
    pub destination: Pan,
    /// Transfer amount in minor currency units, non-negative.
    pub amount: i64,
    pub currency: Currency,
}

/// The transaction lifecycle manager.
///
/// Every check-and-mutate sequence runs under a single ledger guard, so
/// two concurrent transfers can never both pass the sufficiency check
/// against a stale balance.
pub struct TransferEngine {
    ledger: Arc<Ledger>,
    commission: CommissionCalculator,
    commission_account: Pan,
}

impl TransferEngine {
    /// Create an engine over an existing ledger.
    pub fn new(ledger: Arc<Ledger>, config: &EngineConfig) -> Self {
        Self {
            ledger,
            commission: CommissionCalculator::new(config.commission_rates.clone()),
            commission_account: config.commission_account.clone(),
        }
    }

    /// Create an engine together with a ledger seeded from the config.
    pub fn from_config(config: &EngineConfig) -> Self {
        let ledger = Arc::new(Ledger::seeded(config.seed_accounts.iter().cloned()));
        Self::new(ledger, config)
    }

    /// The ledger this engine operates on.
    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Register a pending transfer.
    ///
    /// Both accounts must exist. The prospective source balance after
    /// this transfer and every already pending transfer debiting the
    /// same account must stay strictly positive; otherwise the request
    /// is rejected and nothing is stored.
    pub fn create_transfer(&self, request: TransferRequest) -> Result<OperationId> {
        let mut txn = self.ledger.begin();

        let balance = txn.require_account(&request.source, AccountRole::Source)?;
        txn.require_account(&request.destination, AccountRole::Destination)?;

        let commission = self.commission.compute(request.amount, KIND_C2C)?;

        let encumbered = txn
            .pending_by_debit_account(&request.source)
            .iter()
            .map(Transaction::total_debit)
            .fold(0i64, i64::saturating_add);
        // A prospective total too large to represent cannot be covered by
        // any balance, so overflow rejects the same way a shortfall does.
        let total = encumbered
            .checked_add(request.amount)
            .and_then(|sum| sum.checked_add(commission));
        debug!(
            source = %request.source,
            encumbered,
            amount = request.amount,
            commission,
            total,
            "prospective debit computed"
        );

        if total.map_or(true, |total| total >= balance) {
            error!(
                source = %request.source,
                balance,
                total,
                "account balance can become negative, transfer not registered"
            );
            return Err(TransferError::InsufficientFunds {
                pan: request.source,
                stage: TransferStage::Registration,
            });
        }

        let transaction = Transaction::new(
            request.source,
            request.destination,
            request.amount,
            commission,
            request.currency,
        );
        let operation_id = txn.put_transaction(transaction);
        info!(operation_id = %operation_id, "transfer registered");

        Ok(operation_id)
    }

    /// Commit or roll back a pending transfer.
    ///
    /// A terminal transaction can never be re-confirmed. On commit the
    /// source balance is re-checked; if it no longer covers the amount
    /// plus commission the transaction is rolled back automatically and
    /// the call fails.
    pub fn confirm_transfer(&self, operation_id: &str, action: &str) -> Result<OperationId> {
        let mut txn = self.ledger.begin();

        let id = OperationId::parse(operation_id)
            .map_err(|_| TransferError::OperationNotFound(operation_id.to_string()))?;
        let transaction = txn
            .transaction(&id)
            .ok_or_else(|| {
                error!(operation_id, "transaction does not exist in the transaction table");
                TransferError::OperationNotFound(operation_id.to_string())
            })?
            .clone();

        match transaction.status {
            TransactionStatus::Committed => {
                error!(operation_id = %id, "transaction is already committed");
                return Err(TransferError::AlreadyCommitted(id));
            }
            TransactionStatus::RolledBack => {
                error!(operation_id = %id, "transaction was already rolled back");
                return Err(TransferError::AlreadyRolledBack(id));
            }
            TransactionStatus::Pending => {}
        }

        let action = ConfirmAction::parse(action).ok_or_else(|| {
            error!(action, "unknown action for transaction processing");
            TransferError::UnknownAction(action.to_string())
        })?;

        match action {
            ConfirmAction::Rollback => {
                txn.set_status(&id, TransactionStatus::RolledBack, now());
                info!(operation_id = %id, "transfer rolled back");
                Ok(id)
            }
            ConfirmAction::Commit => {
                // Balances may have shifted since registration.
                let balance = txn.require_account(&transaction.source, AccountRole::Source)?;
                if balance <= transaction.total_debit() {
                    txn.set_status(&id, TransactionStatus::RolledBack, now());
                    error!(
                        operation_id = %id,
                        source = %transaction.source,
                        balance,
                        total = transaction.total_debit(),
                        "account balance can become negative, transfer rolled back"
                    );
                    return Err(TransferError::InsufficientFunds {
                        pan: transaction.source.clone(),
                        stage: TransferStage::Confirmation,
                    });
                }

                if transaction.commission > 0 {
                    txn.debit(&transaction.source, transaction.commission);
                    txn.credit(&self.commission_account, transaction.commission);
                }
                txn.debit(&transaction.source, transaction.amount);
                txn.credit(&transaction.destination, transaction.amount);
                txn.set_status(&id, TransactionStatus::Committed, now());
                info!(
                    operation_id = %id,
                    source = %transaction.source,
                    destination = %transaction.destination,
                    amount = transaction.amount,
                    commission = transaction.commission,
                    "transfer committed"
                );
                Ok(id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SOURCE: &str = "4548987854653322";
    const DESTINATION: &str = "4548987854653311";
    const COMMISSION_ACCOUNT: &str = "7060100000000001";

    fn test_engine() -> TransferEngine {
        TransferEngine::from_config(&EngineConfig::default())
    }

    fn request(amount: i64) -> TransferRequest {
        TransferRequest {
            source: Pan::new(SOURCE),
            destination: Pan::new(DESTINATION),
            amount,
            currency: Currency::rub(),
        }
    }

    fn balance(engine: &TransferEngine, pan: &str) -> i64 {
        engine.ledger().balance_snapshot(&Pan::new(pan)).unwrap()
    }

    #[test]
    fn test_happy_path_commit() {
        let engine = test_engine();

        let operation_id = engine.create_transfer(request(100)).unwrap();
        // Registration leaves balances untouched.
        assert_eq!(balance(&engine, SOURCE), 10000);
        assert_eq!(balance(&engine, DESTINATION), 50);

        let confirmed = engine
            .confirm_transfer(&operation_id.to_string(), "COMMIT")
            .unwrap();
        assert_eq!(confirmed, operation_id);
        assert_eq!(balance(&engine, SOURCE), 9899);
        assert_eq!(balance(&engine, DESTINATION), 150);
        assert_eq!(balance(&engine, COMMISSION_ACCOUNT), 1);

        let txn = engine.ledger().begin();
        let stored = txn.transaction(&operation_id).unwrap();
        assert_eq!(stored.status, TransactionStatus::Committed);
        assert_eq!(stored.commission, 1);
        assert!(stored.processed_at.is_some());
    }

    #[test]
    fn test_insufficient_funds_at_creation_stores_nothing() {
        let engine = test_engine();

        // Destination account only holds 50; use it as the debit side.
        let err = engine
            .create_transfer(TransferRequest {
                source: Pan::new(DESTINATION),
                destination: Pan::new(SOURCE),
                amount: 100,
                currency: Currency::rub(),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            TransferError::InsufficientFunds {
                stage: TransferStage::Registration,
                ..
            }
        ));

        let txn = engine.ledger().begin();
        assert!(txn.pending_by_debit_account(&Pan::new(DESTINATION)).is_empty());
        drop(txn);
        assert_eq!(balance(&engine, DESTINATION), 50);
    }

    #[test]
    fn test_overlarge_amount_is_rejected_not_wrapped() {
        let engine = test_engine();

        // amount + commission does not fit in i64. The prospective total
        // must not wrap negative and sneak past the sufficiency check.
        let err = engine.create_transfer(request(i64::MAX)).unwrap_err();
        assert!(matches!(
            err,
            TransferError::InsufficientFunds {
                stage: TransferStage::Registration,
                ..
            }
        ));
        assert_eq!(err.wire_code(), 101);

        // Nothing stored, balances untouched.
        assert_eq!(balance(&engine, SOURCE), 10000);
        let txn = engine.ledger().begin();
        assert!(txn.pending_by_debit_account(&Pan::new(SOURCE)).is_empty());
    }

    #[test]
    fn test_rollback_then_commit_fails() {
        let engine = test_engine();
        let operation_id = engine.create_transfer(request(100)).unwrap().to_string();

        engine.confirm_transfer(&operation_id, "ROLLBACK").unwrap();
        assert_eq!(balance(&engine, SOURCE), 10000);
        assert_eq!(balance(&engine, DESTINATION), 50);

        let err = engine.confirm_transfer(&operation_id, "COMMIT").unwrap_err();
        assert!(matches!(err, TransferError::AlreadyRolledBack(_)));
        assert_eq!(err.wire_code(), 105);
    }

    #[test]
    fn test_commit_is_not_applied_twice() {
        let engine = test_engine();
        let operation_id = engine.create_transfer(request(100)).unwrap().to_string();

        engine.confirm_transfer(&operation_id, "COMMIT").unwrap();
        let err = engine.confirm_transfer(&operation_id, "COMMIT").unwrap_err();
        assert!(matches!(err, TransferError::AlreadyCommitted(_)));

        // Second confirm left balances exactly where the first put them.
        assert_eq!(balance(&engine, SOURCE), 9899);
        assert_eq!(balance(&engine, DESTINATION), 150);
        assert_eq!(balance(&engine, COMMISSION_ACCOUNT), 1);
    }

    #[test]
    fn test_unknown_source_account() {
        let engine = test_engine();
        let err = engine
            .create_transfer(TransferRequest {
                source: Pan::new("1111111111111111"),
                destination: Pan::new(DESTINATION),
                amount: 100,
                currency: Currency::rub(),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            TransferError::AccountNotFound {
                role: AccountRole::Source,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_destination_account() {
        let engine = test_engine();
        let err = engine
            .create_transfer(TransferRequest {
                source: Pan::new(SOURCE),
                destination: Pan::new("2222222222222222"),
                amount: 100,
                currency: Currency::rub(),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            TransferError::AccountNotFound {
                role: AccountRole::Destination,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_operation() {
        let engine = test_engine();
        let err = engine
            .confirm_transfer(&OperationId::new().to_string(), "COMMIT")
            .unwrap_err();
        assert!(matches!(err, TransferError::OperationNotFound(_)));

        // An id that could never have been assigned is just as unknown.
        let err = engine.confirm_transfer("not-a-uuid", "COMMIT").unwrap_err();
        assert!(matches!(err, TransferError::OperationNotFound(_)));
    }

    #[test]
    fn test_unknown_action() {
        let engine = test_engine();
        let operation_id = engine.create_transfer(request(100)).unwrap().to_string();

        let err = engine.confirm_transfer(&operation_id, "PURGE").unwrap_err();
        assert!(matches!(err, TransferError::UnknownAction(_)));

        // The transaction stays pending and confirmable.
        engine.confirm_transfer(&operation_id, "commit").unwrap();
        assert_eq!(balance(&engine, SOURCE), 9899);
    }

    #[test]
    fn test_pending_encumbrances_count_at_creation() {
        let engine = test_engine();

        // Each transfer encumbers 2020 (2000 + 1% commission) against a
        // 10000 balance; the fifth would push the prospective balance
        // negative.
        for _ in 0..4 {
            engine.create_transfer(request(2000)).unwrap();
        }
        let err = engine.create_transfer(request(2000)).unwrap_err();
        assert!(matches!(
            err,
            TransferError::InsufficientFunds {
                stage: TransferStage::Registration,
                ..
            }
        ));

        // Balances untouched until commit.
        assert_eq!(balance(&engine, SOURCE), 10000);
    }

    #[test]
    fn test_auto_rollback_on_insufficient_funds_at_commit() {
        let engine = test_engine();

        let operation_id = engine.create_transfer(request(6000)).unwrap().to_string();

        // Drain the source behind the pending transfer's back, the way
        // a confirmed movement from another channel would.
        engine.ledger().begin().debit(&Pan::new(SOURCE), 9000);
        assert_eq!(balance(&engine, SOURCE), 1000);

        let err = engine.confirm_transfer(&operation_id, "COMMIT").unwrap_err();
        assert!(matches!(
            err,
            TransferError::InsufficientFunds {
                stage: TransferStage::Confirmation,
                ..
            }
        ));
        assert_eq!(err.wire_code(), 102);

        // The failed commit rolled the transaction back without touching
        // balances, and the rollback is terminal.
        assert_eq!(balance(&engine, SOURCE), 1000);
        assert_eq!(balance(&engine, DESTINATION), 50);
        let err = engine.confirm_transfer(&operation_id, "COMMIT").unwrap_err();
        assert!(matches!(err, TransferError::AlreadyRolledBack(_)));
    }

    #[test]
    fn test_concurrent_creates_cannot_overdraw() {
        use std::sync::Arc;
        use std::thread;

        let engine = Arc::new(test_engine());

        // Ten threads each try to encumber 2020 against a 10000 balance.
        // Only four can be admitted in any interleaving.
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || engine.create_transfer(request(2000)))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let accepted: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
        let rejected = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(accepted.len(), 4);
        assert_eq!(rejected, 6);
        for result in &results {
            if let Err(err) = result {
                assert!(matches!(err, TransferError::InsufficientFunds { .. }));
            }
        }

        // Committing everything admitted keeps the balance positive.
        for result in results.into_iter().flatten() {
            engine.confirm_transfer(&result.to_string(), "COMMIT").unwrap();
        }
        assert_eq!(balance(&engine, SOURCE), 10000 - 4 * 2020);
    }

    proptest! {
        #[test]
        fn prop_commission_is_floored_percentage(amount in 0i64..1_000_000) {
            let config = EngineConfig::default();
            let calculator = CommissionCalculator::new(config.commission_rates.clone());
            let commission = calculator.compute(amount, KIND_C2C).unwrap();
            prop_assert_eq!(commission, amount / 100);
            prop_assert!(commission <= amount);
            prop_assert!(commission >= 0);
        }

        #[test]
        fn prop_accepted_encumbrances_never_exceed_balance(amounts in prop::collection::vec(1i64..4000, 1..12)) {
            let engine = test_engine();
            let mut admitted = Vec::new();
            for amount in amounts {
                if let Ok(id) = engine.create_transfer(request(amount)) {
                    admitted.push(id);
                }
            }

            // Every admitted transfer can be committed without driving
            // the source negative.
            for id in admitted {
                engine.confirm_transfer(&id.to_string(), "COMMIT").unwrap();
            }
            prop_assert!(balance(&engine, SOURCE) > 0);
        }
    }
}
