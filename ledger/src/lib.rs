//! card2card Ledger Store
//!
//! Volatile in-memory store for account balances and transaction records.
//! The store owns the critical-section boundary: all reads and mutations
//! go through a guard that serializes every check-and-mutate sequence.

pub mod store;

pub use store::{Ledger, LedgerTxn};
